//! Startup orchestration.
//!
//! Builds the shared pieces in dependency order from a validated config. The
//! caller owns the host-side `Connectivity` and decides how it is driven.

use std::sync::Arc;
use std::time::Duration;

use crate::config::SiteConfig;
use crate::errors::hooks::GlobalErrorHooks;
use crate::errors::reporter::AlertBanner;
use crate::fetch::client::SiteClient;
use crate::fetch::error::FetchError;
use crate::network::connectivity::Connectivity;
use crate::network::indicator::StatusIndicator;
use crate::network::monitor::NetworkMonitor;
use crate::resilience::queue::{FailedOperationQueue, QueuePolicy};

/// Everything a page or the CLI needs to do resilient network work.
pub struct Services {
    pub client: SiteClient,
    pub monitor: NetworkMonitor,
    pub queue: Arc<FailedOperationQueue>,
    pub banner: AlertBanner,
    pub hooks: Arc<GlobalErrorHooks>,
}

pub fn bootstrap(
    config: &SiteConfig,
    connectivity: &Connectivity,
    indicator: Arc<dyn StatusIndicator>,
) -> Result<Services, FetchError> {
    let queue = Arc::new(FailedOperationQueue::new(QueuePolicy::from(&config.queue)));
    let banner = AlertBanner::new(Duration::from_millis(config.alerts.expiry_ms));
    let hooks = Arc::new(GlobalErrorHooks::new(
        Arc::new(banner.clone()),
        config.alerts.origin.clone(),
    ));

    let client = SiteClient::new(config, queue.clone(), connectivity.watch(), Arc::new(banner.clone()))?;

    let monitor = NetworkMonitor::new(
        connectivity,
        queue.clone(),
        indicator,
        Duration::from_millis(config.network.online_indicator_ms),
    );

    tracing::info!(
        timeout_ms = config.fetch.timeout_ms,
        max_attempts = config.fetch.max_attempts,
        retry_delay_ms = config.fetch.retry_delay_ms,
        queue_cap = ?config.queue.max_entries,
        online = connectivity.is_online(),
        "Services initialized"
    );

    Ok(Services {
        client,
        monitor,
        queue,
        banner,
        hooks,
    })
}
