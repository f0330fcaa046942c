//! Consecutive-failure tracking with exponential backoff.

use std::time::Duration;

use tracing::{debug, warn};

/// Tracks consecutive aggregation failures and the wait before the next
/// attempt.
#[derive(Debug)]
pub struct FailureTracker {
    consecutive_failures: u32,
    /// Current wait before the next cycle.
    current_backoff: Duration,
    /// Wait used while cycles succeed.
    base_interval: Duration,
    max_backoff: Duration,
}

impl FailureTracker {
    pub fn new(base_interval: Duration, max_backoff: Duration) -> Self {
        Self {
            consecutive_failures: 0,
            current_backoff: base_interval,
            base_interval,
            max_backoff: max_backoff.max(base_interval),
        }
    }

    /// Record a successful cycle. Resets the backoff.
    pub fn record_success(&mut self) {
        if self.consecutive_failures > 0 {
            debug!(
                failures = self.consecutive_failures,
                "cluster status source recovered"
            );
        }
        self.consecutive_failures = 0;
        self.current_backoff = self.base_interval;
    }

    /// Record a failed cycle. Doubles the wait up to `max_backoff`.
    pub fn record_failure(&mut self) {
        self.consecutive_failures = self.consecutive_failures.saturating_add(1);
        self.current_backoff = self
            .current_backoff
            .checked_mul(2)
            .unwrap_or(self.max_backoff)
            .min(self.max_backoff);

        if self.current_backoff == self.max_backoff && self.consecutive_failures > 1 {
            warn!(
                failures = self.consecutive_failures,
                backoff_secs = self.current_backoff.as_secs(),
                "cluster status source still failing, backoff at maximum"
            );
        }
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures
    }

    /// Wait before the next cycle.
    pub fn next_interval(&self) -> Duration {
        self.current_backoff
    }
}
