//! Timeout enforcement.
//!
//! Dropping the wrapped future on expiry is what cancels the in-flight work.

use std::future::Future;
use std::time::Duration;

/// The wrapped operation did not finish before its deadline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("deadline of {}ms elapsed", .after.as_millis())]
pub struct TimedOut {
    pub after: Duration,
}

/// Run `future` with a deadline.
pub async fn with_timeout<F, T>(limit: Duration, future: F) -> Result<T, TimedOut>
where
    F: Future<Output = T>,
{
    tokio::time::timeout(limit, future)
        .await
        .map_err(|_| TimedOut { after: limit })
}
