//! Retry logic.
//!
//! # Responsibilities
//! - Run an operation up to `max_attempts` times
//! - Sleep between attempts according to a backoff schedule
//! - Return the last error once attempts are exhausted, or at once when the
//!   error is not worth retrying

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use crate::resilience::backoff::{delay_after, BackoffSchedule};

/// Attempt budget and delay schedule for one logical operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub schedule: BackoffSchedule,
}

impl RetryPolicy {
    /// Delay grows as `base * attempt`.
    pub fn linear(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts,
            base_delay,
            schedule: BackoffSchedule::Linear,
        }
    }

    /// Delay doubles after every failure.
    pub fn exponential(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts,
            base_delay,
            schedule: BackoffSchedule::Exponential,
        }
    }

    /// Effective attempt count; at least one attempt is always made.
    pub fn attempts(&self) -> u32 {
        self.max_attempts.max(1)
    }

    /// Delay after failed attempt `attempt` (1-based).
    pub fn delay_after(&self, attempt: u32) -> Duration {
        delay_after(self.schedule, attempt, self.base_delay)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::exponential(3, Duration::from_secs(1))
    }
}

/// Run `operation` under `policy`, retrying every error.
///
/// The closure receives the 1-based attempt number.
pub async fn retry<F, Fut, T, E>(policy: &RetryPolicy, operation: F) -> Result<T, E>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
{
    retry_if(policy, operation, |_| true).await
}

/// Run `operation` under `policy`, retrying only errors for which
/// `retryable` returns true.
pub async fn retry_if<F, Fut, T, E, P>(
    policy: &RetryPolicy,
    mut operation: F,
    retryable: P,
) -> Result<T, E>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
    P: Fn(&E) -> bool,
{
    let attempts = policy.attempts();
    let mut attempt = 1;

    loop {
        match operation(attempt).await {
            Ok(value) => return Ok(value),
            Err(e) if attempt >= attempts => return Err(e),
            Err(e) if !retryable(&e) => {
                tracing::debug!(attempt, error = %e, "Attempt failed, not retryable");
                return Err(e);
            }
            Err(e) => {
                let delay = policy.delay_after(attempt);
                tracing::warn!(
                    attempt,
                    max_attempts = attempts,
                    delay_ms = delay.as_millis() as u64,
                    error = %e,
                    "Attempt failed, retrying"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
        }
    }
}

/// Retry a zero-argument operation with exponential backoff.
pub async fn retry_with_backoff<F, Fut, T, E>(
    operation: F,
    max_attempts: u32,
    initial_delay: Duration,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
{
    let mut operation = operation;
    retry(&RetryPolicy::exponential(max_attempts, initial_delay), |_| operation()).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};
    use tokio::time::Instant;

    #[tokio::test(start_paused = true)]
    async fn test_linear_delays_between_attempts() {
        let started = Instant::now();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let log = seen.clone();

        let result: Result<(), String> = retry(
            &RetryPolicy::linear(3, Duration::from_millis(1000)),
            move |attempt| {
                let log = log.clone();
                async move {
                    log.lock().unwrap().push((attempt, started.elapsed()));
                    Err(format!("attempt {} failed", attempt))
                }
            },
        )
        .await;

        assert_eq!(result.unwrap_err(), "attempt 3 failed");
        let seen = seen.lock().unwrap().clone();
        assert_eq!(
            seen,
            vec![
                (1, Duration::ZERO),
                (2, Duration::from_millis(1000)),
                (3, Duration::from_millis(3000)),
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_stops_on_first_success() {
        let mut calls = 0;
        let result: Result<u32, String> = retry(
            &RetryPolicy::linear(5, Duration::from_millis(10)),
            |attempt| {
                calls += 1;
                async move {
                    if attempt < 2 {
                        Err("not yet".to_string())
                    } else {
                        Ok(attempt)
                    }
                }
            },
        )
        .await;

        assert_eq!(result, Ok(2));
        assert_eq!(calls, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_non_retryable_error_stops_immediately() {
        let started = Instant::now();
        let mut calls = 0;
        let result: Result<(), &str> = retry_if(
            &RetryPolicy::linear(3, Duration::from_secs(1)),
            |_| {
                calls += 1;
                async { Err("malformed") }
            },
            |e| *e != "malformed",
        )
        .await;

        assert_eq!(result, Err("malformed"));
        assert_eq!(calls, 1);
        assert_eq!(started.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_attempts_still_runs_once() {
        let mut calls = 0;
        let result: Result<(), &str> = retry(&RetryPolicy::linear(0, Duration::ZERO), |_| {
            calls += 1;
            async { Err("boom") }
        })
        .await;

        assert_eq!(result, Err("boom"));
        assert_eq!(calls, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_exponential_helper_doubles_delay() {
        let started = Instant::now();
        let stamps = Arc::new(Mutex::new(Vec::new()));
        let log = stamps.clone();

        let result: Result<(), &str> = retry_with_backoff(
            move || {
                let log = log.clone();
                async move {
                    log.lock().unwrap().push(started.elapsed());
                    Err("down")
                }
            },
            3,
            Duration::from_millis(1000),
        )
        .await;

        assert!(result.is_err());
        assert_eq!(
            *stamps.lock().unwrap(),
            vec![
                Duration::ZERO,
                Duration::from_millis(1000),
                Duration::from_millis(3000),
            ]
        );
    }
}
