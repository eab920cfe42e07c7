//! Estimated reading time.

use once_cell::sync::Lazy;
use regex::Regex;

/// Conservative reading speed.
pub const WORDS_PER_MINUTE: usize = 200;

static TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"</?[^>]*>").expect("tag pattern is valid"));

/// Whitespace-separated words after stripping HTML tags.
pub fn word_count(input: &str) -> usize {
    TAG.replace_all(input, "").split_whitespace().count()
}

/// Minutes needed to read `input`, never less than 1.
pub fn reading_time(input: &str) -> usize {
    word_count(input).div_ceil(WORDS_PER_MINUTE).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(n: usize) -> String {
        vec!["word"; n].join(" ")
    }

    #[test]
    fn test_empty_input_is_one_minute() {
        assert_eq!(reading_time(""), 1);
        assert_eq!(reading_time("   \n\t"), 1);
    }

    #[test]
    fn test_boundaries() {
        assert_eq!(reading_time(&words(200)), 1);
        assert_eq!(reading_time(&words(201)), 2);
        assert_eq!(reading_time(&words(400)), 2);
        assert_eq!(reading_time(&words(401)), 3);
    }

    #[test]
    fn test_tags_are_stripped() {
        assert_eq!(word_count("<p>one two</p>"), 2);
        assert_eq!(word_count("<h1 class=\"title\">Hello</h1>\n<p>big <em>wide</em> world</p>"), 4);
        assert_eq!(word_count("<img src=\"a.png\" alt=\"not counted\">"), 0);
    }

    #[test]
    fn test_tags_glued_to_words() {
        // Stripping a tag between two words joins them.
        assert_eq!(word_count("one<br>two"), 1);
    }
}
