//! Content helpers for the site build and page scripts.
//!
//! - reading_time.rs: minutes-to-read filter applied at build time
//! - search.rs: blog post filtering by term, category and tag
//! - images.rs: image fallback placeholders and critical resource retries

pub mod images;
pub mod reading_time;
pub mod search;

pub use images::{FallbackKind, ImageFallbacks, ResourceRetry};
pub use reading_time::{reading_time, word_count, WORDS_PER_MINUTE};
pub use search::{FilterOutcome, PostCard, PostFilter};
