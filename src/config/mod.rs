//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → SiteConfig (validated, immutable)
//!     → copied into SiteClient / NetworkMonitor at startup
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::AlertConfig;
pub use schema::FetchConfig;
pub use schema::NetworkConfig;
pub use schema::ObservabilityConfig;
pub use schema::QueueConfig;
pub use schema::SiteConfig;
