//! Active connectivity probing.
//!
//! # Responsibilities
//! - Periodically open a TCP connection to a well-known address
//! - Publish the result into the host-owned `Connectivity` flag
//!
//! This is the host side for processes that have no OS connectivity event
//! source. The monitor only sees the resulting transitions.

use std::net::{AddrParseError, SocketAddr};
use std::time::Duration;

use tokio::net::TcpStream;
use tokio::sync::broadcast;
use tokio::time;

use crate::config::NetworkConfig;
use crate::network::connectivity::Connectivity;

pub struct ConnectivityProbe {
    connectivity: Connectivity,
    address: SocketAddr,
    interval: Duration,
    timeout: Duration,
}

impl ConnectivityProbe {
    pub fn new(connectivity: Connectivity, config: &NetworkConfig) -> Result<Self, AddrParseError> {
        Ok(Self {
            connectivity,
            address: config.probe_address.parse()?,
            interval: Duration::from_secs(config.probe_interval_secs),
            timeout: Duration::from_millis(config.probe_timeout_ms),
        })
    }

    pub fn connectivity(&self) -> &Connectivity {
        &self.connectivity
    }

    /// Probe once and publish the result. Returns the observed state.
    pub async fn check(&self) -> bool {
        let online = match time::timeout(self.timeout, TcpStream::connect(self.address)).await {
            Ok(Ok(_stream)) => true,
            Ok(Err(e)) => {
                tracing::debug!(address = %self.address, error = %e, "Connectivity probe failed: connection error");
                false
            }
            Err(_) => {
                tracing::debug!(address = %self.address, "Connectivity probe failed: timeout");
                false
            }
        };

        if self.connectivity.set_online(online) {
            tracing::info!(address = %self.address, online, "Connectivity changed");
        }
        online
    }

    pub async fn run(self, mut shutdown: broadcast::Receiver<()>) {
        tracing::info!(
            address = %self.address,
            interval_secs = self.interval.as_secs(),
            "Connectivity probe starting"
        );

        let mut ticker = time::interval(self.interval);
        ticker.set_missed_tick_behavior(time::MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.check().await;
                }
                _ = shutdown.recv() => {
                    tracing::info!("Connectivity probe received shutdown signal, exiting loop");
                    break;
                }
            }
        }
    }
}
