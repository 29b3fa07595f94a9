//! Retry policy for transient oracle failures
//!
//! The policy is a value object injected into providers, so call sites
//! share one retry behavior instead of hardcoding loop constants.

use std::time::Duration;

/// Retry behavior for transient failures: bounded attempts with
/// exponential backoff.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first (minimum 1)
    pub max_attempts: u32,

    /// Delay before the second attempt; doubles on each further attempt
    pub base_delay_ms: u64,
}

impl RetryPolicy {
    /// Create a policy. `max_attempts` is clamped to at least 1.
    pub fn new(max_attempts: u32, base_delay_ms: u64) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay_ms,
        }
    }

    /// A policy that never retries.
    pub fn no_retry() -> Self {
        Self::new(1, 0)
    }

    /// Backoff delay before attempt `attempt` (1-based; attempt 1 has no
    /// delay).
    pub fn delay_before(&self, attempt: u32) -> Duration {
        if attempt <= 1 {
            return Duration::ZERO;
        }
        // 1x, 2x, 4x, ... of the base delay
        let factor = 2u64.saturating_pow(attempt - 2);
        Duration::from_millis(self.base_delay_ms.saturating_mul(factor))
    }
}

impl Default for RetryPolicy {
    /// Three attempts with a one-second base delay.
    fn default() -> Self {
        Self::new(3, 1000)
    }
}
