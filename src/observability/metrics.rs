//! Metrics collection and exposition.
//!
//! # Metrics
//! - `site_fetch_attempts_total` (counter): fetch attempts by outcome
//! - `site_fetch_failures_total` (counter): exhausted fetches by `queued`
//! - `site_queue_depth` (gauge): pending failed operations
//! - `site_replays_total` (counter): replays by outcome
//! - `site_connectivity_online` (gauge): 1=online, 0=offline

use std::net::SocketAddr;

use metrics::{counter, gauge};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder and its HTTP listener.
///
/// Must be called from within a tokio runtime.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

/// Record the outcome of one fetch attempt ("ok", "timeout", "status", "network", "invalid").
pub fn record_fetch_attempt(outcome: &'static str) {
    counter!("site_fetch_attempts_total", "outcome" => outcome).increment(1);
}

/// Record a fetch that exhausted its attempts.
pub fn record_fetch_exhausted(queued: bool) {
    let queued = if queued { "true" } else { "false" };
    counter!("site_fetch_failures_total", "queued" => queued).increment(1);
}

/// Record the current queue depth.
pub fn record_queue_depth(depth: usize) {
    gauge!("site_queue_depth").set(depth as f64);
}

/// Record the outcome of a queued operation replay.
pub fn record_replay(success: bool) {
    let outcome = if success { "success" } else { "requeued" };
    counter!("site_replays_total", "outcome" => outcome).increment(1);
}

/// Record the host connectivity state.
pub fn record_connectivity(online: bool) {
    gauge!("site_connectivity_online").set(if online { 1.0 } else { 0.0 });
}
