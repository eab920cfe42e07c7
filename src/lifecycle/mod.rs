//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Validated config → connectivity flag → queue → reporter → client → monitor
//!
//! Shutdown (shutdown.rs):
//!     Signal received → broadcast → probe and monitor loops exit
//!
//! Signals (signals.rs):
//!     Ctrl+C → trigger shutdown
//! ```
//!
//! # Design Decisions
//! - Ordered startup: the host-owned flag exists before anything reads it
//! - Long-running loops all subscribe to one shutdown broadcast

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::Shutdown;
pub use startup::{bootstrap, Services};
