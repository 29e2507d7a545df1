//! Redelivery policy for consumers.
//!
//! Replaces unconditional broker redelivery with a bounded policy: a fixed
//! number of attempts with backoff, then dead-letter.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Backoff strategy between redeliveries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackoffStrategy {
    /// Fixed delay between attempts.
    Fixed,
    /// base * 2^(attempt-1), capped at `max_delay`.
    #[default]
    Exponential,
}

/// Bounded retry configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Total delivery attempts allowed (first delivery included).
    pub max_attempts: u32,
    /// Base delay before a redelivery.
    pub base_delay: Duration,
    /// Cap on the computed delay.
    pub max_delay: Duration,
    pub strategy: BackoffStrategy,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            base_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(60),
            strategy: BackoffStrategy::Exponential,
        }
    }
}

impl RetryPolicy {
    /// Policy that never redelivers.
    pub fn no_retry() -> Self {
        Self {
            max_attempts: 1,
            ..Default::default()
        }
    }

    /// Fixed-delay policy.
    pub fn fixed(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts,
            base_delay: delay,
            max_delay: delay,
            strategy: BackoffStrategy::Fixed,
        }
    }

    /// Whether another delivery is allowed after `attempt` attempts failed.
    pub fn should_retry(&self, attempt: u32) -> bool {
        attempt < self.max_attempts
    }

    /// Delay before the redelivery that follows failed attempt `attempt`
    /// (1-indexed).
    pub fn delay_after_attempt(&self, attempt: u32) -> Duration {
        if attempt == 0 {
            return Duration::ZERO;
        }

        let base_ms = self.base_delay.as_millis() as f64;
        let max_ms = self.max_delay.as_millis() as f64;

        let delay_ms = match self.strategy {
            BackoffStrategy::Fixed => base_ms,
            BackoffStrategy::Exponential => {
                let exp = 2_f64.powi((attempt - 1) as i32);
                (base_ms * exp).min(max_ms)
            }
        };

        Duration::from_millis(delay_ms as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exponential_backoff_doubles_and_caps() {
        let policy = RetryPolicy {
            max_attempts: 5,
            base_delay: Duration::from_millis(100),
            max_delay: Duration::from_millis(300),
            strategy: BackoffStrategy::Exponential,
        };

        assert_eq!(policy.delay_after_attempt(1), Duration::from_millis(100));
        assert_eq!(policy.delay_after_attempt(2), Duration::from_millis(200));
        assert_eq!(policy.delay_after_attempt(3), Duration::from_millis(300));
        assert_eq!(policy.delay_after_attempt(4), Duration::from_millis(300));
    }

    #[test]
    fn fixed_backoff_is_constant() {
        let policy = RetryPolicy::fixed(3, Duration::from_millis(250));

        assert_eq!(policy.delay_after_attempt(1), Duration::from_millis(250));
        assert_eq!(policy.delay_after_attempt(3), Duration::from_millis(250));
    }

    #[test]
    fn should_retry_respects_max_attempts() {
        let policy = RetryPolicy {
            max_attempts: 3,
            ..Default::default()
        };

        assert!(policy.should_retry(1));
        assert!(policy.should_retry(2));
        assert!(!policy.should_retry(3));
        assert!(!policy.should_retry(4));
    }

    #[test]
    fn no_retry_allows_single_attempt() {
        assert!(!RetryPolicy::no_retry().should_retry(1));
    }
}
