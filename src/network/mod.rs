//! Connectivity subsystem.
//!
//! # Data Flow
//! ```text
//! Host signal (probe.rs, or an embedder calling Connectivity::set_online):
//!     → connectivity.rs (host-owned flag + ordered transition stream)
//!     → monitor.rs (ONLINE/OFFLINE state machine, one step per transition)
//!         → indicator.rs (status rendering)
//!         → resilience::queue drain_and_retry on reconnect
//!
//! Fetch layer:
//!     → ConnectivityWatch::is_online() at retry exhaustion
//! ```
//!
//! # Design Decisions
//! - Only the host writes the flag; monitor and fetch hold read-only watches
//! - The monitor reacts to change signals and never polls; transitions are
//!   queued per subscriber so rapid flaps are not coalesced
//! - Replay runs on its own task so the monitor keeps handling signals

pub mod connectivity;
pub mod indicator;
pub mod monitor;
pub mod probe;

pub use connectivity::{Connectivity, ConnectivityWatch, Transitions};
pub use indicator::{LogIndicator, MemoryIndicator, NetworkStatus, StatusIndicator};
pub use monitor::{MonitorState, NetworkMonitor};
pub use probe::ConnectivityProbe;
