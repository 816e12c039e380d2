//! Failure handling for the long-poll loop.
//!
//! When a poll exchange fails the loop waits a fixed delay and tries again.
//! By default it never gives up; [`RetryPolicy::with_max_attempts`] bounds
//! the number of consecutive failures tolerated.
//!
//! # Example
//!
//! ```
//! use core::time::Duration;
//! use bayeux_core::retry::RetryPolicy;
//!
//! let policy = RetryPolicy::default().with_max_attempts(3);
//! let mut attempts = policy.attempts();
//!
//! assert_eq!(attempts.record_failure(), Some(Duration::from_secs(1)));
//! assert_eq!(attempts.record_failure(), Some(Duration::from_secs(1)));
//! assert_eq!(attempts.record_failure(), None);
//!
//! attempts.reset();
//! assert_eq!(attempts.consecutive_failures(), 0);
//! ```

use core::time::Duration;

/// Default pause between a failed poll exchange and the next one.
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(1);

/// Fixed-delay retry policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    delay: Duration,
    max_attempts: Option<u32>,
}

impl RetryPolicy {
    /// Create a policy with the given delay and no attempt ceiling.
    #[must_use]
    pub const fn new(delay: Duration) -> Self {
        Self {
            delay,
            max_attempts: None,
        }
    }

    /// Give up after `max` consecutive failed exchanges.
    #[must_use]
    pub const fn with_max_attempts(mut self, max: u32) -> Self {
        self.max_attempts = Some(max);
        self
    }

    /// Change the pause between attempts.
    #[must_use]
    pub const fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Pause between attempts.
    #[must_use]
    pub const fn delay(&self) -> Duration {
        self.delay
    }

    /// Consecutive failure ceiling, if any.
    #[must_use]
    pub const fn max_attempts(&self) -> Option<u32> {
        self.max_attempts
    }

    /// Start tracking failures for one loop run.
    #[must_use]
    pub const fn attempts(&self) -> Attempts {
        Attempts {
            policy: *self,
            consecutive_failures: 0,
        }
    }
}

impl Default for RetryPolicy {
    /// One second between attempts, unbounded.
    fn default() -> Self {
        Self::new(DEFAULT_RETRY_DELAY)
    }
}

/// Per-run failure counter.
#[derive(Debug, Clone, Copy)]
pub struct Attempts {
    policy: RetryPolicy,
    consecutive_failures: u32,
}

impl Attempts {
    /// Record a failed exchange.
    ///
    /// Returns the delay to wait before retrying, or `None` once the
    /// ceiling is reached.
    #[must_use]
    pub const fn record_failure(&mut self) -> Option<Duration> {
        self.consecutive_failures = self.consecutive_failures.saturating_add(1);
        match self.policy.max_attempts {
            Some(max) if self.consecutive_failures >= max => None,
            _ => Some(self.policy.delay),
        }
    }

    /// Clear the counter after a successful exchange.
    pub const fn reset(&mut self) {
        self.consecutive_failures = 0;
    }

    /// Failures since the last success.
    #[must_use]
    pub const fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures
    }
}
