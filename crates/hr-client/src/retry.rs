//! Retry policy: exponential backoff with jitter.
//!
//! A failed call is retried only when its classified category is retryable
//! and the attempt bound has not been reached. The delay doubles per
//! attempt from the category's base delay, with bounded random jitter so
//! concurrent callers don't retry in lockstep. An advisory wait reported
//! by the provider takes precedence over the computed delay.

use std::time::Duration;

use rand::Rng;

use crate::errors::ClassifiedError;

/// Default maximum retries after the initial attempt.
const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Upper bound on any computed delay.
const MAX_DELAY: Duration = Duration::from_secs(30);

/// Upper bound on the random jitter added to each delay.
const MAX_JITTER_MS: u64 = 250;

/// Outcome of a retry consultation.
#[derive(Clone, Copy, Debug)]
pub struct RetryDecision {
    /// Whether the call should be retried.
    pub retry: bool,
    /// How long to wait before the retry; zero when `retry` is false.
    pub delay: Duration,
}

impl RetryDecision {
    fn give_up() -> Self {
        Self {
            retry: false,
            delay: Duration::ZERO,
        }
    }
}

/// Decides whether and when a classified failure is retried.
#[derive(Clone, Debug)]
pub struct RetryPolicy {
    max_attempts: u32,
}

impl RetryPolicy {
    /// Create a policy allowing up to `max_attempts` retries.
    pub fn new(max_attempts: u32) -> Self {
        Self { max_attempts }
    }

    /// Maximum retries after the initial attempt.
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Decide whether the failure on `attempt` (1-based) should be retried.
    ///
    /// Non-retryable categories never retry, regardless of attempt number.
    pub fn should_retry(&self, error: &ClassifiedError, attempt: u32) -> RetryDecision {
        if !error.is_retryable || attempt > self.max_attempts {
            return RetryDecision::give_up();
        }

        // An explicit advisory wait from the provider wins over backoff.
        let delay = match error.retry_after {
            Some(advisory) => advisory.min(MAX_DELAY),
            None => backoff_delay(error.category.base_delay(), attempt),
        };

        RetryDecision { retry: true, delay }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ATTEMPTS)
    }
}

/// Exponential backoff: `base * 2^(attempt-1)` plus bounded jitter.
fn backoff_delay(base: Duration, attempt: u32) -> Duration {
    let doubled = base.saturating_mul(1u32 << attempt.saturating_sub(1).min(16));
    let jitter = Duration::from_millis(rand::thread_rng().gen_range(0..=MAX_JITTER_MS));
    doubled.saturating_add(jitter).min(MAX_DELAY)
}
