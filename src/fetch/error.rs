//! Fetch error taxonomy.

use std::time::Duration;

use thiserror::Error;

/// Errors that can occur while fetching a resource.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// The attempt did not complete within its deadline and was cancelled.
    #[error("Request timed out after {}ms", .after.as_millis())]
    Timeout { after: Duration },

    /// The server answered with a non-success status.
    #[error("HTTP {status}: {reason}")]
    Status { status: u16, reason: String },

    /// Connection refused, DNS failure, reset, unreachable network.
    #[error("Network error: {0}")]
    Network(String),

    /// The request could not be built (bad URL, header, body).
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// The response body could not be read or decoded.
    #[error("Failed to read response body: {0}")]
    Body(String),
}

impl FetchError {
    pub fn status(&self) -> Option<u16> {
        match self {
            FetchError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, FetchError::Timeout { .. })
    }

    /// A request that could not be built fails the same way every time, so it
    /// is neither retried nor queued for replay.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, FetchError::InvalidRequest(_))
    }

    /// Metric label for this failure.
    pub fn outcome_label(&self) -> &'static str {
        match self {
            FetchError::Timeout { .. } => "timeout",
            FetchError::Status { .. } => "status",
            FetchError::Network(_) => "network",
            FetchError::InvalidRequest(_) => "invalid",
            FetchError::Body(_) => "body",
        }
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_builder() {
            FetchError::InvalidRequest(e.to_string())
        } else if e.is_decode() || e.is_body() {
            FetchError::Body(e.to_string())
        } else {
            FetchError::Network(e.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_display() {
        let err = FetchError::Status {
            status: 503,
            reason: "Service Unavailable".into(),
        };
        assert_eq!(err.to_string(), "HTTP 503: Service Unavailable");
        assert_eq!(err.status(), Some(503));
        assert_eq!(err.outcome_label(), "status");
    }

    #[test]
    fn test_timeout_display() {
        let err = FetchError::Timeout {
            after: Duration::from_millis(10_000),
        };
        assert_eq!(err.to_string(), "Request timed out after 10000ms");
        assert!(err.is_timeout());
        assert!(err.is_retryable());
        assert_eq!(err.status(), None);
    }

    #[test]
    fn test_invalid_request_is_not_retryable() {
        let err = FetchError::InvalidRequest("relative URL without a base".into());
        assert!(!err.is_retryable());
        assert_eq!(err.outcome_label(), "invalid");
    }
}
