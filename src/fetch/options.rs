//! Per-call fetch options.

use std::time::Duration;

use reqwest::Method;

use crate::config::FetchConfig;
use crate::resilience::retries::RetryPolicy;

/// Used when a call passes `max_attempts(0)`.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
/// Used when a call passes a zero `retry_delay`.
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_millis(1_000);

/// Request payload.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    Text(String),
    Bytes(Vec<u8>),
    /// Sent as `application/x-www-form-urlencoded`.
    Form(Vec<(String, String)>),
    Json(serde_json::Value),
}

/// Options for one resilient fetch.
#[derive(Debug, Clone)]
pub struct FetchOptions {
    pub method: Method,
    pub headers: Vec<(String, String)>,
    pub body: Option<RequestBody>,
    /// Deadline for each attempt.
    pub timeout: Duration,
    /// Total attempts, including the first. 0 means the default of 3.
    pub max_attempts: u32,
    /// Base delay; attempt `n` is followed by a wait of `retry_delay * n`.
    /// Zero means the default of one second.
    pub retry_delay: Duration,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self::from_config(&FetchConfig::default())
    }
}

impl FetchOptions {
    pub fn from_config(config: &FetchConfig) -> Self {
        Self {
            method: Method::GET,
            headers: Vec::new(),
            body: None,
            timeout: config.timeout(),
            max_attempts: config.max_attempts,
            retry_delay: config.retry_delay(),
        }
    }

    pub fn method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn body(mut self, body: RequestBody) -> Self {
        self.body = Some(body);
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    pub fn retry_delay(mut self, retry_delay: Duration) -> Self {
        self.retry_delay = retry_delay;
        self
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        let max_attempts = match self.max_attempts {
            0 => DEFAULT_MAX_ATTEMPTS,
            n => n,
        };
        let retry_delay = if self.retry_delay.is_zero() {
            DEFAULT_RETRY_DELAY
        } else {
            self.retry_delay
        };
        RetryPolicy::linear(max_attempts, retry_delay)
    }
}
