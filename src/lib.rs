//! Client-side resilience layer and build-time content filters for a static site.

pub mod config;
pub mod content;
pub mod errors;
pub mod fetch;
pub mod lifecycle;
pub mod network;
pub mod observability;
pub mod resilience;

pub use config::SiteConfig;
pub use fetch::{FetchError, FetchOptions, SiteClient};
pub use lifecycle::Shutdown;
pub use network::{Connectivity, NetworkMonitor};
pub use resilience::FailedOperationQueue;
