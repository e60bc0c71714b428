use std::time::Duration;

use crate::config::models::BackoffConfig;

/// Exponential backoff capped at a maximum delay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackoffPolicy {
    initial: Duration,
    max: Duration,
}

impl BackoffPolicy {
    pub fn new(initial: Duration, max: Duration) -> Self {
        Self { initial, max }
    }

    /// Delay to wait after the failed attempt with the given 0-based index:
    /// `min(initial * 2^attempt, max)`.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 2u32.checked_pow(attempt).unwrap_or(u32::MAX);
        self.initial
            .checked_mul(factor)
            .map_or(self.max, |delay| delay.min(self.max))
    }
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self::from(&BackoffConfig::default())
    }
}

impl From<&BackoffConfig> for BackoffPolicy {
    fn from(config: &BackoffConfig) -> Self {
        Self::new(
            Duration::from_millis(config.initial_delay_ms),
            Duration::from_millis(config.max_delay_ms),
        )
    }
}
