//! Retry policy for remote API requests
//!
//! Exponential backoff between a minimum and maximum wait, bounded by a
//! total attempt count.

use std::time::Duration;

use backoff::backoff::Backoff;
use backoff::{ExponentialBackoff, ExponentialBackoffBuilder};
use clap::ValueEnum;

use crate::config::defaults;

/// Predefined retry profiles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum RetryProfile {
    /// Short waits and few attempts, for tests and latency-sensitive runs
    Fast,
    /// Long waits and more attempts, for rate-limited production use
    #[default]
    Slow,
}

/// Retry policy applied to every request of an [`ApiClient`](super::ApiClient)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    wait_min: Duration,
    wait_max: Duration,
    max_attempts: u32,
}

impl RetryPolicy {
    /// Create a custom policy
    ///
    /// `max_attempts` counts the first attempt and is at least 1.
    pub fn new(wait_min: Duration, wait_max: Duration, max_attempts: u32) -> Self {
        Self {
            wait_min,
            wait_max: wait_max.max(wait_min),
            max_attempts: max_attempts.max(1),
        }
    }

    /// Policy for a predefined profile
    pub fn from_profile(profile: RetryProfile) -> Self {
        match profile {
            RetryProfile::Fast => Self::new(
                Duration::from_millis(defaults::FAST_RETRY_WAIT_MIN_MS),
                Duration::from_millis(defaults::FAST_RETRY_WAIT_MAX_MS),
                defaults::FAST_RETRY_ATTEMPTS,
            ),
            RetryProfile::Slow => Self::new(
                Duration::from_millis(defaults::SLOW_RETRY_WAIT_MIN_MS),
                Duration::from_millis(defaults::SLOW_RETRY_WAIT_MAX_MS),
                defaults::SLOW_RETRY_ATTEMPTS,
            ),
        }
    }

    /// Policy that never retries
    pub fn no_retry() -> Self {
        Self::new(Duration::ZERO, Duration::ZERO, 1)
    }

    /// Total attempts per request
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Fresh backoff state for one request
    pub fn backoff(&self) -> AttemptBackoff {
        let inner = ExponentialBackoffBuilder::new()
            .with_initial_interval(self.wait_min)
            .with_max_interval(self.wait_max)
            .with_multiplier(2.0)
            .with_randomization_factor(0.0)
            .with_max_elapsed_time(None)
            .build();
        AttemptBackoff {
            inner,
            max_attempts: self.max_attempts,
            attempts: 1,
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_profile(RetryProfile::default())
    }
}

/// Exponential backoff that gives up after a fixed number of attempts
pub struct AttemptBackoff {
    inner: ExponentialBackoff,
    max_attempts: u32,
    attempts: u32,
}

impl AttemptBackoff {
    /// Attempts made so far, including the one in flight
    pub fn attempts(&self) -> u32 {
        self.attempts
    }
}

impl std::fmt::Debug for AttemptBackoff {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AttemptBackoff")
            .field("current_interval", &self.inner.current_interval)
            .field("max_attempts", &self.max_attempts)
            .field("attempts", &self.attempts)
            .finish()
    }
}

impl Backoff for AttemptBackoff {
    fn reset(&mut self) {
        self.inner.reset();
        self.attempts = 1;
    }

    fn next_backoff(&mut self) -> Option<Duration> {
        if self.attempts >= self.max_attempts {
            return None;
        }
        self.attempts += 1;
        self.inner.next_backoff()
    }
}
