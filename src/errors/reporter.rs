//! User-facing alert banners.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Banner flavor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertKind {
    Error,
    Warning,
    Success,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    pub id: u64,
    pub message: String,
    pub kind: AlertKind,
}

/// Sink for messages meant for the user.
pub trait ErrorReporter: Send + Sync {
    fn show(&self, message: &str, kind: AlertKind);
}

/// A single banner slot: showing a new alert replaces the current one.
///
/// Alerts are dismissible and expire on their own after `expiry`.
#[derive(Debug, Clone)]
pub struct AlertBanner {
    slot: Arc<Mutex<Option<Alert>>>,
    next_id: Arc<AtomicU64>,
    expiry: Duration,
}

impl AlertBanner {
    pub fn new(expiry: Duration) -> Self {
        Self {
            slot: Arc::new(Mutex::new(None)),
            next_id: Arc::new(AtomicU64::new(1)),
            expiry,
        }
    }

    /// Show an alert, replacing any existing one. Returns its id.
    ///
    /// Expiry is only scheduled when called inside a tokio runtime.
    pub fn show_alert(&self, message: &str, kind: AlertKind) -> u64 {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let alert = Alert {
            id,
            message: message.to_string(),
            kind,
        };

        match kind {
            AlertKind::Error => tracing::error!(alert_id = id, text = message, "Alert shown"),
            AlertKind::Warning => tracing::warn!(alert_id = id, text = message, "Alert shown"),
            AlertKind::Success => tracing::info!(alert_id = id, text = message, "Alert shown"),
        }

        *self.slot.lock().expect("alert banner mutex poisoned") = Some(alert);

        if let Ok(handle) = tokio::runtime::Handle::try_current() {
            let banner = self.clone();
            handle.spawn(async move {
                tokio::time::sleep(banner.expiry).await;
                banner.dismiss(id);
            });
        }

        id
    }

    /// Remove the alert with `id` if it is still the one showing.
    pub fn dismiss(&self, id: u64) -> bool {
        let mut slot = self.slot.lock().expect("alert banner mutex poisoned");
        if slot.as_ref().map(|a| a.id) == Some(id) {
            *slot = None;
            true
        } else {
            false
        }
    }

    pub fn current(&self) -> Option<Alert> {
        self.slot.lock().expect("alert banner mutex poisoned").clone()
    }
}

impl Default for AlertBanner {
    fn default() -> Self {
        Self::new(Duration::from_secs(5))
    }
}

impl ErrorReporter for AlertBanner {
    fn show(&self, message: &str, kind: AlertKind) {
        self.show_alert(message, kind);
    }
}
