//! Structured logging.
//!
//! Log level comes from config and can be overridden with `RUST_LOG`.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::ObservabilityConfig;

/// Build the default filter directive for a configured level.
pub fn default_directive(config: &ObservabilityConfig) -> String {
    format!("resilient_site={},reqwest=warn", config.log_level)
}

/// Initialize the global tracing subscriber.
///
/// Safe to call more than once; later calls are ignored.
pub fn init_logging(config: &ObservabilityConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_directive(config).into());

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init();
}
