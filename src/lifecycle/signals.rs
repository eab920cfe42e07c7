//! OS signal handling.

use crate::lifecycle::shutdown::Shutdown;

/// Wait for Ctrl+C, then trigger `shutdown`.
pub async fn shutdown_on_ctrl_c(shutdown: &Shutdown) -> std::io::Result<()> {
    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutdown signal received");
    shutdown.trigger();
    Ok(())
}
