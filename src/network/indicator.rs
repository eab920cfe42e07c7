//! Network status indicator.

use std::sync::Mutex;

/// What the indicator is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetworkStatus {
    Online,
    Offline,
}

impl NetworkStatus {
    pub fn from_online(online: bool) -> Self {
        if online {
            NetworkStatus::Online
        } else {
            NetworkStatus::Offline
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            NetworkStatus::Online => "Back online",
            NetworkStatus::Offline => "You're offline",
        }
    }
}

/// Rendering surface for connectivity status.
pub trait StatusIndicator: Send + Sync {
    fn show(&self, status: NetworkStatus);
    fn hide(&self);
}

/// Indicator that writes status changes to the log.
#[derive(Debug, Default)]
pub struct LogIndicator;

impl StatusIndicator for LogIndicator {
    fn show(&self, status: NetworkStatus) {
        match status {
            NetworkStatus::Online => tracing::info!(status = status.label(), "Network status"),
            NetworkStatus::Offline => tracing::warn!(status = status.label(), "Network status"),
        }
    }

    fn hide(&self) {
        tracing::debug!("Network status indicator hidden");
    }
}

/// Indicator that keeps the visible status in memory.
#[derive(Debug, Default)]
pub struct MemoryIndicator {
    visible: Mutex<Option<NetworkStatus>>,
}

impl MemoryIndicator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Currently visible status, `None` when hidden.
    pub fn visible(&self) -> Option<NetworkStatus> {
        *self.visible.lock().expect("indicator mutex poisoned")
    }
}

impl StatusIndicator for MemoryIndicator {
    fn show(&self, status: NetworkStatus) {
        *self.visible.lock().expect("indicator mutex poisoned") = Some(status);
    }

    fn hide(&self) {
        *self.visible.lock().expect("indicator mutex poisoned") = None;
    }
}
