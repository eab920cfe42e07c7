//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Network action:
//!     → timeouts.rs (per-attempt deadline, cancels the in-flight future)
//!     → On failure: retries.rs (wait per backoff.rs schedule, try again)
//!     → On exhaustion while offline: queue.rs (park for replay)
//!
//! Reconnect:
//!     → queue.rs drain_and_retry (replay everything at once, requeue failures)
//! ```
//!
//! # Design Decisions
//! - Every network attempt has a deadline
//! - Fetch retries back off linearly; the generic helper backs off exponentially
//! - The queue has no retry cap; capacity and dedup are opt-in policies

pub mod backoff;
pub mod queue;
pub mod retries;
pub mod timeouts;

pub use queue::{DrainReport, FailedOperationQueue, QueuePolicy, QueuedOperation};
pub use retries::{retry, retry_if, retry_with_backoff, RetryPolicy};
