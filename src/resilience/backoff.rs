//! Backoff delay schedules.

use std::time::Duration;

/// How the delay grows between attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackoffSchedule {
    /// `base * attempt`
    Linear,
    /// `base * 2^(attempt - 1)`
    Exponential,
}

/// Delay to wait after failed attempt `attempt` (1-based) before the next one.
pub fn delay_after(schedule: BackoffSchedule, attempt: u32, base: Duration) -> Duration {
    if attempt == 0 {
        return Duration::ZERO;
    }

    match schedule {
        BackoffSchedule::Linear => base.saturating_mul(attempt),
        BackoffSchedule::Exponential => {
            let factor = 2u32.saturating_pow(attempt - 1);
            base.saturating_mul(factor)
        }
    }
}
