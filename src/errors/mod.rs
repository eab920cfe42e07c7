//! Error reporting subsystem.
//!
//! # Data Flow
//! ```text
//! Call sites (fetch, forms):
//!     → api.rs ApiErrorHandler (classify, build ErrorInfo, log)
//!     → reporter.rs ErrorReporter (user-facing alert banner)
//!
//! Process boundary (main):
//!     panics, failed background tasks
//!     → hooks.rs GlobalErrorHooks
//!     → reporter.rs ErrorReporter
//! ```
//!
//! # Design Decisions
//! - The reporter is passed explicitly; there is no global error sink
//! - Host-level hooks are installed only by the binary
//! - Errors from third-party code are logged but never shown

pub mod api;
pub mod hooks;
pub mod reporter;

pub use api::{ApiErrorHandler, ErrorInfo, FailureCategory};
pub use hooks::{install_panic_hook, GlobalErrorHooks, UncaughtError};
pub use reporter::{Alert, AlertBanner, AlertKind, ErrorReporter};
