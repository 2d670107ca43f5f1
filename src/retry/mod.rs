//! Retry policy seam.
//!
//! # Responsibilities
//! - Define the policy interface the clients drive their loops with
//! - Provide the default exponential-backoff-with-jitter policy
//!
//! # Design Decisions
//! - `max_retries = n` means `n + 1` total attempts
//! - The delay is computed fresh for every attempt; zero means no sleep
//! - Jittered backoff prevents thundering herd on a shared endpoint

pub mod backoff;

use std::time::Duration;

use crate::config::RetryConfig;

/// Drives the retry loop of both the blocking and the async client.
pub trait RetryPolicy: Send + Sync {
    /// Number of retries after the initial attempt.
    fn max_retries(&self) -> u32;

    /// Delay before retrying after the attempt with the given zero-based
    /// index failed. `Duration::ZERO` skips the sleep entirely.
    fn backoff(&self, attempt: u32) -> Duration;
}

/// Exponential backoff with 0-10% jitter, capped at a maximum delay.
#[derive(Debug, Clone)]
pub struct ExponentialBackoff {
    max_retries: u32,
    base_delay: Duration,
    max_delay: Duration,
}

impl ExponentialBackoff {
    pub fn new(max_retries: u32, base_delay: Duration, max_delay: Duration) -> Self {
        Self {
            max_retries,
            base_delay,
            max_delay,
        }
    }
}

impl Default for ExponentialBackoff {
    fn default() -> Self {
        Self::from(&RetryConfig::default())
    }
}

impl From<&RetryConfig> for ExponentialBackoff {
    fn from(cfg: &RetryConfig) -> Self {
        Self::new(
            cfg.max_retries,
            Duration::from_millis(cfg.base_delay_ms),
            Duration::from_millis(cfg.max_delay_ms),
        )
    }
}

impl RetryPolicy for ExponentialBackoff {
    fn max_retries(&self) -> u32 {
        self.max_retries
    }

    fn backoff(&self, attempt: u32) -> Duration {
        // attempt is zero-based; the first retry waits the base delay
        backoff::calculate_backoff(attempt + 1, self.base_delay, self.max_delay)
    }
}
