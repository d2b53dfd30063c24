//! Pipeline tuning.

use std::time::Duration;

/// Timing and retry settings of a render pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineOptions {
    /// Wait after compilation before the result is considered laid out.
    pub settle_delay: Duration,
    /// Retry a failed first compilation once.
    pub auto_retry: bool,
    /// Delay before the automatic compile retry.
    pub retry_delay: Duration,
    /// Base delay of the container lookup backoff (doubles per attempt).
    pub lookup_base_delay: Duration,
    /// Attempt ceiling for container lookup.
    pub max_attempts: u32,
}

impl PipelineOptions {
    /// Settings for a live page.
    #[must_use]
    pub fn interactive() -> Self {
        Self {
            settle_delay: Duration::from_millis(150),
            auto_retry: true,
            retry_delay: Duration::from_millis(1000),
            lookup_base_delay: Duration::from_millis(100),
            max_attempts: 3,
        }
    }

    /// Settings for offline rendering: shorter settle, no auto retry.
    #[must_use]
    pub fn headless() -> Self {
        Self {
            settle_delay: Duration::from_millis(50),
            auto_retry: false,
            ..Self::interactive()
        }
    }

    /// Container lookup delay before retrying after `attempt` misses.
    #[must_use]
    pub fn lookup_delay(&self, attempt: u32) -> Duration {
        self.lookup_base_delay
            .saturating_mul(2u32.saturating_pow(attempt))
    }
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self::interactive()
    }
}
