//! Process-level error hooks.
//!
//! Panics and failed background tasks are converted into the same generic
//! banner the rest of the crate uses. Only the binary installs these.

use std::fmt::Display;
use std::panic::PanicHookInfo;
use std::sync::Arc;

use crate::errors::reporter::{AlertKind, ErrorReporter};

const UNHANDLED_MESSAGE: &str =
    "An unexpected error occurred. Please refresh the page if problems persist.";
const TECHNICAL_MESSAGE: &str = "A technical error occurred. Please refresh the page.";

/// An error nobody handled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UncaughtError {
    pub message: String,
    /// Source file the error was raised from, when known.
    pub source_file: Option<String>,
    /// Whether a stack / location is attached. Errors without one are not shown.
    pub has_stack: bool,
}

pub struct GlobalErrorHooks {
    reporter: Arc<dyn ErrorReporter>,
    origin: String,
}

impl GlobalErrorHooks {
    /// `origin` is the path prefix of first-party source files.
    pub fn new(reporter: Arc<dyn ErrorReporter>, origin: impl Into<String>) -> Self {
        Self {
            reporter,
            origin: origin.into(),
        }
    }

    /// An async task failed and nothing awaited its error.
    pub fn on_unhandled_rejection(&self, reason: &dyn Display) {
        tracing::error!(reason = %reason, "Unhandled task failure");
        self.reporter.show(UNHANDLED_MESSAGE, AlertKind::Error);
    }

    /// An error escaped all handlers. Returns whether it was shown to the user.
    pub fn on_uncaught_error(&self, error: &UncaughtError) -> bool {
        tracing::error!(
            error = %error.message,
            source_file = error.source_file.as_deref().unwrap_or("<unknown>"),
            "Uncaught error"
        );

        if self.is_third_party(error) || !error.has_stack {
            return false;
        }

        self.reporter.show(TECHNICAL_MESSAGE, AlertKind::Error);
        true
    }

    /// Errors with a known source outside the origin come from third-party code.
    pub fn is_third_party(&self, error: &UncaughtError) -> bool {
        error
            .source_file
            .as_deref()
            .is_some_and(|file| !file.starts_with(&self.origin))
    }
}

fn panic_message(info: &PanicHookInfo<'_>) -> String {
    if let Some(s) = info.payload().downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = info.payload().downcast_ref::<String>() {
        s.clone()
    } else {
        "panic".to_string()
    }
}

/// Route panics through `hooks`, then run the previously installed hook.
pub fn install_panic_hook(hooks: Arc<GlobalErrorHooks>) {
    let previous = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let error = UncaughtError {
            message: panic_message(info),
            source_file: info.location().map(|l| l.file().to_string()),
            has_stack: true,
        };
        hooks.on_uncaught_error(&error);
        previous(info);
    }));
}
