//! Image fallbacks and critical resource retries.

use std::collections::HashSet;

use url::Url;

/// "Image unavailable" placeholder, 300x200 SVG.
pub const PLACEHOLDER_SRC: &str = "data:image/svg+xml;base64,PHN2ZyB3aWR0aD0iMzAwIiBoZWlnaHQ9IjIwMCIgeG1sbnM9Imh0dHA6Ly93d3cudzMub3JnLzIwMDAvc3ZnIj48cmVjdCB3aWR0aD0iMTAwJSIgaGVpZ2h0PSIxMDAlIiBmaWxsPSIjZjVmNWY1IiBzdHJva2U9IiNkZGQiLz48dGV4dCB4PSI1MCUiIHk9IjUwJSIgZm9udC1mYW1pbHk9IkFyaWFsIiBmb250LXNpemU9IjE0IiBmaWxsPSIjOTk5IiB0ZXh0LWFuY2hvcj0ibWlkZGxlIiBkeT0iLjNlbSI+SW1hZ2UgdW5hdmFpbGFibGU8L3RleHQ+PC9zdmc+";

pub const PLACEHOLDER_ALT: &str = "Image unavailable";

/// Where a broken image lives on the page. `Default` is used for images
/// reported without classification.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FallbackKind {
    #[default]
    Default,
    Avatar,
    Social,
    Project,
    Post,
}

impl FallbackKind {
    /// Pick a kind from the image's own classes and its ancestors' classes.
    pub fn classify(classes: &[&str], ancestor_classes: &[&str]) -> Self {
        let has = |name: &str| classes.contains(&name);
        let inside = |name: &str| has(name) || ancestor_classes.contains(&name);

        if has("avatar") || ancestor_classes.contains(&"author-info") {
            FallbackKind::Avatar
        } else if inside("social-share") {
            FallbackKind::Social
        } else if ancestor_classes.contains(&"project-card") {
            FallbackKind::Project
        } else {
            FallbackKind::Post
        }
    }
}

/// Replacement attributes for a broken image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placeholder {
    pub src: &'static str,
    pub alt: &'static str,
    pub kind: FallbackKind,
}

/// Tracks which images already fell back, so a placeholder that fails to
/// load does not trigger another round.
#[derive(Debug, Default)]
pub struct ImageFallbacks {
    handled: HashSet<String>,
}

impl ImageFallbacks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Placeholder for the image `id`, or `None` if it was already handled.
    pub fn handle(&mut self, id: &str, original_src: &str, kind: FallbackKind) -> Option<Placeholder> {
        if !self.handled.insert(id.to_string()) {
            return None;
        }

        tracing::warn!(image = id, src = original_src, kind = ?kind, "Image failed to load, replaced with placeholder");
        Some(Placeholder {
            src: PLACEHOLDER_SRC,
            alt: PLACEHOLDER_ALT,
            kind,
        })
    }

    pub fn is_handled(&self, id: &str) -> bool {
        self.handled.contains(id)
    }
}

/// Cache-busting reload of a critical resource (`retry=<n>` query parameter).
#[derive(Debug, Clone)]
pub struct ResourceRetry {
    url: Url,
    max_retries: u32,
    retries: u32,
}

impl ResourceRetry {
    pub const DEFAULT_MAX_RETRIES: u32 = 2;

    pub fn new(url: Url) -> Self {
        Self::with_max_retries(url, Self::DEFAULT_MAX_RETRIES)
    }

    pub fn with_max_retries(url: Url, max_retries: u32) -> Self {
        Self {
            url,
            max_retries,
            retries: 0,
        }
    }

    pub fn retries(&self) -> u32 {
        self.retries
    }

    /// The resource failed to load. Returns the URL to try next, or `None`
    /// once the retries are used up.
    pub fn on_error(&mut self) -> Option<Url> {
        if self.retries >= self.max_retries {
            tracing::warn!(url = %self.url, "Max retries reached for resource");
            return None;
        }

        self.retries += 1;

        let mut next = self.url.clone();
        let kept: Vec<(String, String)> = next
            .query_pairs()
            .filter(|(k, _)| k != "retry")
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        next.query_pairs_mut()
            .clear()
            .extend_pairs(kept)
            .append_pair("retry", &self.retries.to_string());

        self.url = next.clone();
        Some(next)
    }
}
