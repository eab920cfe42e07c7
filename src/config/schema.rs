//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the site client.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Root configuration for the site client.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Default options applied to every resilient fetch.
    pub fetch: FetchConfig,

    /// Failed operation queue policy.
    pub queue: QueueConfig,

    /// Connectivity probing and status indicator timing.
    pub network: NetworkConfig,

    /// Alert banner settings.
    pub alerts: AlertConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// User agent reported in error info records and sent with requests.
    pub user_agent: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            fetch: FetchConfig::default(),
            queue: QueueConfig::default(),
            network: NetworkConfig::default(),
            alerts: AlertConfig::default(),
            observability: ObservabilityConfig::default(),
            user_agent: format!("resilient-site/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Defaults for resilient fetch.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Per-attempt timeout in milliseconds.
    pub timeout_ms: u64,

    /// Maximum number of attempts per call.
    pub max_attempts: u32,

    /// Base delay for linear backoff in milliseconds.
    pub retry_delay_ms: u64,

    /// Per-attempt timeout for form submissions in milliseconds.
    pub form_timeout_ms: u64,
}

impl FetchConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    pub fn form_timeout(&self) -> Duration {
        Duration::from_millis(self.form_timeout_ms)
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 10_000,
            max_attempts: 3,
            retry_delay_ms: 1_000,
            form_timeout_ms: 15_000,
        }
    }
}

/// Failed operation queue policy.
///
/// The defaults keep the queue unbounded and without deduplication.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct QueueConfig {
    /// Maximum number of pending entries. Oldest entries are evicted past this.
    pub max_entries: Option<usize>,

    /// Replace an existing entry that has the same context label.
    pub dedupe_by_context: bool,
}

/// Connectivity settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// Address probed to decide whether the host is online (e.g., "1.1.1.1:443").
    pub probe_address: String,

    /// Probe interval in seconds.
    pub probe_interval_secs: u64,

    /// Probe connect timeout in milliseconds.
    pub probe_timeout_ms: u64,

    /// How long the "back online" indicator stays visible, in milliseconds.
    pub online_indicator_ms: u64,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            probe_address: "1.1.1.1:443".to_string(),
            probe_interval_secs: 5,
            probe_timeout_ms: 2_000,
            online_indicator_ms: 3_000,
        }
    }
}

/// Alert banner configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AlertConfig {
    /// Banner lifetime in milliseconds before it expires.
    pub expiry_ms: u64,

    /// Path prefix of first-party source files. Uncaught errors raised
    /// elsewhere are logged but not shown to the user.
    pub origin: String,
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            expiry_ms: 5_000,
            origin: "src/".to_string(),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}
