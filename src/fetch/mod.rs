//! Resilient fetch subsystem.
//!
//! # Data Flow
//! ```text
//! SiteClient::fetch(resource, options)
//!     → attempt: build request, send under per-attempt deadline
//!     → non-2xx / timeout / network error → resilience::retries (linear backoff)
//!     → exhausted:
//!         offline → resilience::queue (replay of the same call) + return error
//!         online  → return error
//! ```
//!
//! # Design Decisions
//! - `SiteClient` is an explicit context object: HTTP client, queue,
//!   connectivity watch and error handler travel together, no globals
//! - Responses are never cached
//! - Replays go through `fetch` again, so they get the same retry budget

pub mod client;
pub mod error;
pub mod form;
pub mod options;

pub use client::SiteClient;
pub use error::FetchError;
pub use form::{FormOptions, FormOutcome};
pub use options::{FetchOptions, RequestBody};
