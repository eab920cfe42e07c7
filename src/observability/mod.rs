//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! fetch / queue / monitor produce:
//!     → logging.rs (structured log events via tracing)
//!     → metrics.rs (counters, gauges)
//!
//! Consumers:
//!     → stderr (tracing-subscriber fmt layer)
//!     → Metrics endpoint (Prometheus scrape, optional)
//! ```
//!
//! # Design Decisions
//! - Structured fields rather than interpolated messages
//! - Metric updates go through the `metrics` facade; without an installed
//!   recorder they are no-ops

pub mod logging;
pub mod metrics;
