//! Blog post filtering.
//!
//! Matching is case-insensitive substring matching: the term against title and
//! excerpt, the category and tag against the card's attribute strings. Empty
//! criteria match everything.

use serde::{Deserialize, Serialize};

/// The searchable parts of a rendered post card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostCard {
    pub title: String,
    #[serde(default)]
    pub excerpt: Option<String>,
    /// Space-separated category list, as rendered into the card.
    #[serde(default)]
    pub categories: String,
    /// Space-separated tag list, as rendered into the card.
    #[serde(default)]
    pub tags: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostFilter {
    term: String,
    category: String,
    tag: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterOutcome {
    /// Indices of the cards that stay visible.
    pub visible: Vec<usize>,
    /// Show the "No posts found" notice.
    pub show_no_results: bool,
}

pub const NO_RESULTS_TITLE: &str = "No posts found";
pub const NO_RESULTS_HINT: &str = "Try adjusting your search terms or filters.";

impl PostFilter {
    pub fn new(term: &str, category: &str, tag: &str) -> Self {
        Self {
            term: term.to_lowercase(),
            category: category.to_lowercase(),
            tag: tag.to_lowercase(),
        }
    }

    pub fn set_term(&mut self, term: &str) {
        self.term = term.to_lowercase();
    }

    /// Clear the search term, keeping category and tag selections.
    pub fn clear(&mut self) {
        self.term.clear();
    }

    pub fn matches(&self, card: &PostCard) -> bool {
        let matches_term = self.term.is_empty()
            || card.title.to_lowercase().contains(&self.term)
            || card
                .excerpt
                .as_deref()
                .is_some_and(|e| e.to_lowercase().contains(&self.term));

        let matches_category =
            self.category.is_empty() || card.categories.to_lowercase().contains(&self.category);

        let matches_tag = self.tag.is_empty() || card.tags.to_lowercase().contains(&self.tag);

        matches_term && matches_category && matches_tag
    }

    pub fn apply(&self, cards: &[PostCard]) -> FilterOutcome {
        let visible: Vec<usize> = cards
            .iter()
            .enumerate()
            .filter(|(_, card)| self.matches(card))
            .map(|(i, _)| i)
            .collect();

        FilterOutcome {
            show_no_results: visible.is_empty() && !cards.is_empty(),
            visible,
        }
    }
}
