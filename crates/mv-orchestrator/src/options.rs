//! Orchestrator timing.

use std::time::Duration;

/// Timing of the page-wide discovery loop.
#[derive(Debug, Clone, PartialEq)]
pub struct OrchestratorOptions {
    /// Scans per navigation cycle before giving up.
    pub max_attempts: u32,
    /// Delay before the first retry scan.
    pub base_delay: Duration,
    /// Growth factor between consecutive retry delays.
    pub backoff_factor: f64,
    /// Upper bound of a retry delay.
    pub max_delay: Duration,
    /// Window in which relevant mutations coalesce into one rescan.
    pub frame: Duration,
    /// Delay after initialization before the extra deployment scan.
    pub deployment_kick: Duration,
}

impl Default for OrchestratorOptions {
    fn default() -> Self {
        Self {
            max_attempts: 15,
            base_delay: Duration::from_millis(300),
            backoff_factor: 1.4,
            max_delay: Duration::from_secs(10),
            frame: Duration::from_millis(16),
            deployment_kick: Duration::from_millis(500),
        }
    }
}

impl OrchestratorOptions {
    /// Retry delay after `attempts` empty scans: `min(base * factor^attempts, max)`.
    ///
    /// Rounded to whole milliseconds.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn backoff(&self, attempts: u32) -> Duration {
        let exponent = i32::try_from(attempts).unwrap_or(i32::MAX);
        let millis = self.base_delay.as_secs_f64() * 1000.0 * self.backoff_factor.powi(exponent);
        let capped = millis.min(self.max_delay.as_secs_f64() * 1000.0);
        Duration::from_millis(capped.round() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backoff_grows_and_caps() {
        let options = OrchestratorOptions::default();
        assert_eq!(options.backoff(0).as_millis(), 300);
        assert_eq!(options.backoff(1).as_millis(), 420);
        assert_eq!(options.backoff(2).as_millis(), 588);
        assert_eq!(options.backoff(11), Duration::from_secs(10));
        assert_eq!(options.backoff(40), Duration::from_secs(10));
    }

    #[test]
    fn test_backoff_is_non_decreasing() {
        let options = OrchestratorOptions::default();
        let delays: Vec<Duration> = (0..20).map(|n| options.backoff(n)).collect();
        assert!(delays.windows(2).all(|pair| pair[0] <= pair[1]));
    }
}
