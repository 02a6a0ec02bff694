//! Backoff policy and bounded retry driver
//!
//! Two timing concerns live here: the exponential delay applied between
//! rate-limited submission attempts, and the fixed interval between status
//! polls. The retry driver is bounded and only used for submission; the
//! poll loop never retries through it.

use crate::clock::Clock;
use crate::config::{PollConfig, RetryConfig};
use std::future::Future;
use std::time::Duration;

/// Trait for errors that can be classified as retryable or not
///
/// For submission, only a rate-limit response is retryable; every other
/// failure is returned to the caller on the first occurrence.
pub trait IsRetryable {
    /// Returns true if the operation should be retried after a backoff delay
    fn is_retryable(&self) -> bool;
}

/// Wait-duration policy for retries and steady-state polling
#[derive(Clone, Copy, Debug)]
pub struct BackoffPolicy {
    base_delay: Duration,
    poll_interval: Duration,
}

impl BackoffPolicy {
    /// Build a policy from the retry and poll configs
    pub fn new(retry: &RetryConfig, poll: &PollConfig) -> Self {
        Self {
            base_delay: retry.base_delay,
            poll_interval: poll.interval,
        }
    }

    /// Exponential delay before retry `attempt` (first retry is attempt 1)
    ///
    /// `base_delay * 2^attempt`: with the default 1s base this yields 2s,
    /// 4s, 8s, ...
    pub fn retry_delay(&self, attempt: u32) -> Duration {
        self.base_delay * 2u32.saturating_pow(attempt)
    }

    /// Fixed delay between successive status checks
    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }
}

/// Execute an operation with bounded exponential-backoff retries
///
/// Calls `operation` up to `max_attempts` times. Retryable failures sleep
/// `policy.retry_delay(attempt)` through the injected clock before the next
/// attempt; the final attempt's failure is returned without a delay.
/// Non-retryable failures are returned immediately.
pub async fn retry_with_backoff<F, Fut, T, E>(
    policy: &BackoffPolicy,
    clock: &dyn Clock,
    max_attempts: u32,
    mut operation: F,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: IsRetryable + std::fmt::Display,
{
    let mut attempt = 0;

    loop {
        match operation().await {
            Ok(result) => {
                if attempt > 0 {
                    tracing::info!(attempts = attempt + 1, "operation succeeded after retry");
                }
                return Ok(result);
            }
            Err(e) if e.is_retryable() && attempt + 1 < max_attempts => {
                attempt += 1;
                let delay = policy.retry_delay(attempt);

                tracing::warn!(
                    error = %e,
                    attempt = attempt,
                    max_attempts = max_attempts,
                    delay_secs = delay.as_secs_f64(),
                    "operation failed, retrying"
                );

                clock.sleep(delay).await;
            }
            Err(e) => {
                if e.is_retryable() {
                    tracing::error!(
                        error = %e,
                        attempts = attempt + 1,
                        "operation failed after all retry attempts exhausted"
                    );
                } else {
                    tracing::error!(error = %e, "operation failed with non-retryable error");
                }
                return Err(e);
            }
        }
    }
}
