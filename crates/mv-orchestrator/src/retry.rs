//! Backoff scheduling for empty scans.

use std::time::Duration;

use tokio::time::Instant;

use crate::options::OrchestratorOptions;

/// Attempt counter plus the deadline of the single pending retry.
///
/// The scheduler never runs anything itself; the orchestrator loop sleeps
/// until [`deadline`](Self::deadline) and then calls [`fire`](Self::fire).
#[derive(Debug, Clone)]
pub struct RetryScheduler {
    options: OrchestratorOptions,
    attempts: u32,
    deadline: Option<Instant>,
}

impl RetryScheduler {
    #[must_use]
    pub fn new(options: OrchestratorOptions) -> Self {
        Self {
            options,
            attempts: 0,
            deadline: None,
        }
    }

    /// Schedule the next scan after an empty one.
    ///
    /// Replaces any pending deadline. Returns the delay, or `None` once the
    /// budget is spent: the scan just performed was the last one allowed.
    pub fn start(&mut self) -> Option<Duration> {
        if self.attempts + 1 >= self.options.max_attempts {
            self.deadline = None;
            return None;
        }
        let delay = self.options.backoff(self.attempts);
        self.deadline = Some(Instant::now() + delay);
        Some(delay)
    }

    /// Drop the pending deadline, keeping the counter.
    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    /// Drop the pending deadline and zero the counter.
    pub fn reset(&mut self) {
        self.cancel();
        self.attempts = 0;
    }

    /// Consume the pending deadline and count the attempt it stood for.
    ///
    /// Returns `false` when nothing was pending.
    pub fn fire(&mut self) -> bool {
        if self.deadline.take().is_none() {
            return false;
        }
        self.attempts += 1;
        true
    }

    #[must_use]
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    #[must_use]
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Whether the budget for this cycle is spent.
    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.deadline.is_none() && self.attempts + 1 >= self.options.max_attempts
    }
}
