//! Configuration validation.
//!
//! Serde handles syntax; this checks value ranges. All errors are collected
//! so a bad file is reported in one pass.

use std::fmt;
use std::net::SocketAddr;

use crate::config::schema::SiteConfig;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path of the offending field.
    pub field: String,
    /// What is wrong with it.
    pub reason: String,
}

impl ValidationError {
    fn new(field: &str, reason: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.reason)
    }
}

/// Validate a parsed configuration.
pub fn validate_config(config: &SiteConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.fetch.timeout_ms == 0 {
        errors.push(ValidationError::new("fetch.timeout_ms", "must be greater than 0"));
    }
    if config.fetch.max_attempts == 0 {
        errors.push(ValidationError::new("fetch.max_attempts", "must be at least 1"));
    }
    if config.fetch.form_timeout_ms == 0 {
        errors.push(ValidationError::new("fetch.form_timeout_ms", "must be greater than 0"));
    }
    if config.queue.max_entries == Some(0) {
        errors.push(ValidationError::new("queue.max_entries", "must be at least 1 when set"));
    }
    if config.network.probe_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "network.probe_address",
            format!("'{}' is not a socket address", config.network.probe_address),
        ));
    }
    if config.network.probe_interval_secs == 0 {
        errors.push(ValidationError::new("network.probe_interval_secs", "must be greater than 0"));
    }
    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            format!("'{}' is not a socket address", config.observability.metrics_address),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
