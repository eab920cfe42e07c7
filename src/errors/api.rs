//! API error handling with user feedback.

use std::error::Error as StdError;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::reporter::{AlertKind, ErrorReporter};
use crate::fetch::FetchError;
use crate::network::connectivity::ConnectivityWatch;

/// Plain-language failure bucket shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureCategory {
    Offline,
    Timeout,
    NotFound,
    ServerError,
    Generic,
}

impl FailureCategory {
    /// Classify an error. Being offline wins over everything else.
    ///
    /// Errors that are not `FetchError`s fall back to looking for a status
    /// code in their message.
    pub fn classify(error: &(dyn StdError + 'static), online: bool) -> Self {
        if !online {
            return FailureCategory::Offline;
        }

        match error.downcast_ref::<FetchError>() {
            Some(FetchError::Timeout { .. }) => FailureCategory::Timeout,
            Some(FetchError::Status { status: 404, .. }) => FailureCategory::NotFound,
            Some(FetchError::Status { status, .. }) if (500..600).contains(status) => {
                FailureCategory::ServerError
            }
            Some(_) => FailureCategory::Generic,
            None => {
                let message = error.to_string();
                if message.contains("404") {
                    FailureCategory::NotFound
                } else if message.contains("500") {
                    FailureCategory::ServerError
                } else {
                    FailureCategory::Generic
                }
            }
        }
    }

    pub fn user_message(&self) -> &'static str {
        match self {
            FailureCategory::Offline => "You appear to be offline. Please check your connection.",
            FailureCategory::Timeout => "Request timed out. Please try again.",
            FailureCategory::NotFound => "The requested content was not found.",
            FailureCategory::ServerError => "Server error. Please try again later.",
            FailureCategory::Generic => "Something went wrong. Please try again.",
        }
    }
}

/// Structured record of a failed API call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorInfo {
    pub message: String,
    pub context: String,
    pub timestamp: DateTime<Utc>,
    pub online: bool,
    pub user_agent: String,
}

/// Turns API failures into `ErrorInfo` records and user-facing alerts.
#[derive(Clone)]
pub struct ApiErrorHandler {
    reporter: Arc<dyn ErrorReporter>,
    connectivity: ConnectivityWatch,
    user_agent: String,
}

impl ApiErrorHandler {
    pub fn new(
        reporter: Arc<dyn ErrorReporter>,
        connectivity: ConnectivityWatch,
        user_agent: impl Into<String>,
    ) -> Self {
        Self {
            reporter,
            connectivity,
            user_agent: user_agent.into(),
        }
    }

    pub fn reporter(&self) -> &Arc<dyn ErrorReporter> {
        &self.reporter
    }

    /// Log `error`, optionally show a plain-language alert, and return the record.
    pub fn handle(
        &self,
        error: &(dyn StdError + 'static),
        context: &str,
        show_to_user: bool,
    ) -> ErrorInfo {
        let online = self.connectivity.is_online();
        let message = error.to_string();
        let info = ErrorInfo {
            message: if message.is_empty() {
                "Unknown error".to_string()
            } else {
                message
            },
            context: context.to_string(),
            timestamp: Utc::now(),
            online,
            user_agent: self.user_agent.clone(),
        };

        tracing::error!(
            context = %info.context,
            error = %info.message,
            online = info.online,
            timestamp = %info.timestamp.to_rfc3339(),
            "API error"
        );

        if show_to_user {
            let category = FailureCategory::classify(error, online);
            self.reporter.show(category.user_message(), AlertKind::Error);
        }

        info
    }
}
