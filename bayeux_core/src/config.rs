//! Client options.

use core::time::Duration;

use crate::retry::RetryPolicy;

/// Options for a [`BayeuxClient`](crate::BayeuxClient).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClientConfig {
    /// How the poll loop reacts to failed exchanges.
    pub retry: RetryPolicy,

    /// Remove the local handler when the server rejects a subscribe.
    ///
    /// Off by default: a rejected subscribe leaves its handler registered
    /// and the caller may clean it up with
    /// [`BayeuxClient::remove_channel`](crate::BayeuxClient::remove_channel).
    pub rollback_failed_subscriptions: bool,
}

impl ClientConfig {
    /// Replace the retry policy.
    #[must_use]
    pub const fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Set the pause after a failed poll exchange.
    #[must_use]
    pub const fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry = self.retry.with_delay(delay);
        self
    }

    /// Stop polling after `max` consecutive failed exchanges.
    #[must_use]
    pub const fn with_max_poll_attempts(mut self, max: u32) -> Self {
        self.retry = self.retry.with_max_attempts(max);
        self
    }

    /// Roll back the local registration when a subscribe is rejected.
    #[must_use]
    pub const fn with_subscription_rollback(mut self, rollback: bool) -> Self {
        self.rollback_failed_subscriptions = rollback;
        self
    }
}
