//! Network status monitor.
//!
//! # States
//! - Online: indicator shows "Back online" briefly, then hides
//! - Offline: indicator shows "You're offline" until reconnect
//!
//! # State Transitions
//! ```text
//! Offline → Online: show indicator, schedule auto-hide, drain failed operation queue
//! Online → Offline: show indicator (no auto-hide)
//! ```
//!
//! # Design Decisions
//! - Initial state is read synchronously at construction and rendered like a
//!   transition into it (starting online shows "Back online", then hides)
//! - Every host transition is handled in order; none are coalesced
//! - A pending auto-hide is skipped if another transition happened first
//! - Replay is spawned so the next signal is never blocked on slow operations

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use crate::network::connectivity::{Connectivity, Transitions};
use crate::network::indicator::{NetworkStatus, StatusIndicator};
use crate::observability::metrics;
use crate::resilience::queue::{DrainReport, FailedOperationQueue};

/// Monitor state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorState {
    Online,
    Offline,
}

impl MonitorState {
    fn from_online(online: bool) -> Self {
        if online {
            MonitorState::Online
        } else {
            MonitorState::Offline
        }
    }
}

pub struct NetworkMonitor {
    transitions: Transitions,
    queue: Arc<FailedOperationQueue>,
    indicator: Arc<dyn StatusIndicator>,
    hide_after: Duration,
    state: MonitorState,
    /// Bumped on every transition; an auto-hide only fires if it still matches.
    generation: Arc<AtomicU64>,
}

impl NetworkMonitor {
    /// Create a monitor and render the initial state.
    ///
    /// Starting offline shows the offline indicator. Starting online shows
    /// "Back online" and hides it after `hide_after`; outside a tokio runtime
    /// the hide is not scheduled.
    pub fn new(
        connectivity: &Connectivity,
        queue: Arc<FailedOperationQueue>,
        indicator: Arc<dyn StatusIndicator>,
        hide_after: Duration,
    ) -> Self {
        let transitions = connectivity.transitions();
        let online = transitions.initial();
        let state = MonitorState::from_online(online);

        let monitor = Self {
            transitions,
            queue,
            indicator,
            hide_after,
            state,
            generation: Arc::new(AtomicU64::new(0)),
        };

        monitor.indicator.show(NetworkStatus::from_online(online));
        if online {
            monitor.schedule_hide(0);
        }
        metrics::record_connectivity(online);

        tracing::info!(state = ?state, "Network monitor initialized");
        monitor
    }

    pub fn state(&self) -> MonitorState {
        self.state
    }

    /// React to a connectivity signal.
    ///
    /// Returns the spawned replay task when the signal was a reconnect.
    /// Must be called within a tokio runtime.
    pub fn handle_transition(&mut self, online: bool) -> Option<JoinHandle<DrainReport>> {
        let next = MonitorState::from_online(online);
        if next == self.state {
            return None;
        }

        self.state = next;
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        metrics::record_connectivity(online);

        match next {
            MonitorState::Offline => {
                tracing::warn!("Connection lost");
                self.indicator.show(NetworkStatus::Offline);
                None
            }
            MonitorState::Online => {
                tracing::info!(pending = self.queue.len(), "Connection restored");
                self.indicator.show(NetworkStatus::Online);
                self.schedule_hide(generation);

                let queue = self.queue.clone();
                Some(tokio::spawn(async move { queue.drain_and_retry().await }))
            }
        }
    }

    fn schedule_hide(&self, generation: u64) {
        let indicator = self.indicator.clone();
        let current = self.generation.clone();
        let hide_after = self.hide_after;

        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            return;
        };

        handle.spawn(async move {
            tokio::time::sleep(hide_after).await;
            if current.load(Ordering::SeqCst) == generation {
                indicator.hide();
            }
        });
    }

    /// Process connectivity signals until shutdown or until the host side closes.
    pub async fn run(mut self, mut shutdown: broadcast::Receiver<()>) {
        loop {
            tokio::select! {
                changed = self.transitions.next() => {
                    match changed {
                        Some(online) => {
                            if let Some(replay) = self.handle_transition(online) {
                                tokio::spawn(async move {
                                    match replay.await {
                                        Ok(report) => tracing::info!(
                                            attempted = report.attempted,
                                            succeeded = report.succeeded,
                                            requeued = report.requeued,
                                            "Replay finished"
                                        ),
                                        Err(e) => tracing::error!(error = %e, "Replay task failed"),
                                    }
                                });
                            }
                        }
                        None => {
                            tracing::info!("Connectivity source closed, monitor exiting");
                            break;
                        }
                    }
                }
                _ = shutdown.recv() => {
                    tracing::info!("Network monitor received shutdown signal, exiting loop");
                    break;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::connectivity::Connectivity;
    use crate::network::indicator::MemoryIndicator;
    use crate::resilience::queue::BoxError;

    fn monitor_for(
        connectivity: &Connectivity,
        queue: &Arc<FailedOperationQueue>,
    ) -> (NetworkMonitor, Arc<MemoryIndicator>) {
        let indicator = Arc::new(MemoryIndicator::new());
        let monitor = NetworkMonitor::new(
            connectivity,
            queue.clone(),
            indicator.clone(),
            Duration::from_secs(3),
        );
        (monitor, indicator)
    }

    #[tokio::test(start_paused = true)]
    async fn test_initial_state_offline_shows_indicator() {
        let connectivity = Connectivity::new(false);
        let queue = Arc::new(FailedOperationQueue::default());
        let (monitor, indicator) = monitor_for(&connectivity, &queue);

        assert_eq!(monitor.state(), MonitorState::Offline);
        assert_eq!(indicator.visible(), Some(NetworkStatus::Offline));
    }

    #[tokio::test(start_paused = true)]
    async fn test_initial_state_online_shows_then_hides() {
        let connectivity = Connectivity::new(true);
        let queue = Arc::new(FailedOperationQueue::default());
        let (monitor, indicator) = monitor_for(&connectivity, &queue);

        assert_eq!(monitor.state(), MonitorState::Online);
        assert_eq!(indicator.visible(), Some(NetworkStatus::Online));

        tokio::time::sleep(Duration::from_millis(3_100)).await;
        assert_eq!(indicator.visible(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reconnect_shows_then_hides_after_three_seconds() {
        let connectivity = Connectivity::new(false);
        let queue = Arc::new(FailedOperationQueue::default());
        let (mut monitor, indicator) = monitor_for(&connectivity, &queue);

        let replay = monitor.handle_transition(true).expect("reconnect replays");
        assert_eq!(indicator.visible(), Some(NetworkStatus::Online));
        assert_eq!(replay.await.unwrap(), DrainReport::default());

        tokio::time::sleep(Duration::from_millis(2_900)).await;
        assert_eq!(indicator.visible(), Some(NetworkStatus::Online));

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(indicator.visible(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_offline_before_hide_keeps_offline_visible() {
        let connectivity = Connectivity::new(false);
        let queue = Arc::new(FailedOperationQueue::default());
        let (mut monitor, indicator) = monitor_for(&connectivity, &queue);

        monitor.handle_transition(true);
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert!(monitor.handle_transition(false).is_none());

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(indicator.visible(), Some(NetworkStatus::Offline));
    }

    #[tokio::test(start_paused = true)]
    async fn test_repeated_signal_is_ignored() {
        let connectivity = Connectivity::new(true);
        let queue = Arc::new(FailedOperationQueue::default());
        let (mut monitor, _indicator) = monitor_for(&connectivity, &queue);

        assert!(monitor.handle_transition(true).is_none());
        assert_eq!(monitor.state(), MonitorState::Online);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reconnect_drains_queue() {
        let connectivity = Connectivity::new(false);
        let queue = Arc::new(FailedOperationQueue::default());
        queue.enqueue_fn(|| async { Ok::<(), BoxError>(()) }, "Fetch: /ok");
        queue.enqueue_fn(|| async { Err::<(), BoxError>("down".into()) }, "Fetch: /down");
        let (mut monitor, _indicator) = monitor_for(&connectivity, &queue);

        let report = monitor.handle_transition(true).unwrap().await.unwrap();

        assert_eq!(report.attempted, 2);
        assert_eq!(report.requeued, 1);
        assert_eq!(queue.contexts(), vec!["Fetch: /down"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_loop_follows_host_signals() {
        let connectivity = Connectivity::new(true);
        let queue = Arc::new(FailedOperationQueue::default());
        let (monitor, indicator) = monitor_for(&connectivity, &queue);
        let (shutdown_tx, shutdown_rx) = broadcast::channel(1);

        let handle = tokio::spawn(monitor.run(shutdown_rx));

        connectivity.set_online(false);
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(indicator.visible(), Some(NetworkStatus::Offline));

        connectivity.set_online(true);
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(indicator.visible(), Some(NetworkStatus::Online));

        shutdown_tx.send(()).unwrap();
        handle.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_back_to_back_flap_still_drains() {
        let connectivity = Connectivity::new(true);
        let queue = Arc::new(FailedOperationQueue::default());
        let replays = Arc::new(AtomicU64::new(0));
        let counter = replays.clone();
        queue.enqueue_fn(
            move || {
                counter.fetch_add(1, Ordering::SeqCst);
                async { Ok::<(), BoxError>(()) }
            },
            "Fetch: /pending",
        );
        let (monitor, indicator) = monitor_for(&connectivity, &queue);
        let (shutdown_tx, shutdown_rx) = broadcast::channel(1);

        connectivity.set_online(false);
        connectivity.set_online(true);
        let handle = tokio::spawn(monitor.run(shutdown_rx));

        tokio::time::sleep(Duration::from_millis(300)).await;
        assert_eq!(replays.load(Ordering::SeqCst), 1);
        assert!(queue.is_empty());
        assert_eq!(indicator.visible(), Some(NetworkStatus::Online));

        shutdown_tx.send(()).unwrap();
        handle.await.unwrap();
    }
}
