//! Bounded retry with linear backoff
//!
//! [`with_retry`] runs an operation up to `max_retries + 1` times. After the
//! n-th failure it waits `n * base_delay` before trying again. Every failure
//! is treated the same way here; deciding what happens once retries run out
//! belongs to the caller.

use std::fmt;
use std::future::Future;
use std::time::Duration;

/// Timer seam so retries can wait without tying the engine to a runtime.
pub trait Sleeper {
    fn sleep(&self, duration: Duration) -> impl Future<Output = ()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub base_delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_retries: u32, base_delay: Duration) -> Self {
        Self {
            max_retries,
            base_delay,
        }
    }

    /// Delay before retry number `retry` (1-based)
    pub fn delay_for(&self, retry: u32) -> Duration {
        self.base_delay.saturating_mul(retry)
    }

    /// Upper bound on time spent waiting between attempts
    pub fn total_delay(&self) -> Duration {
        (1..=self.max_retries).map(|retry| self.delay_for(retry)).sum()
    }
}

/// Progress of one source's attempts within a refresh cycle.
///
/// The latest error is not stored here; [`with_retry`] hands it back to the
/// caller once the attempts run out.
#[derive(Debug, Clone, Copy)]
pub struct FetchAttempt {
    pub source_index: usize,
    pub retry_count: u32,
}

impl FetchAttempt {
    pub fn new(source_index: usize) -> Self {
        Self {
            source_index,
            retry_count: 0,
        }
    }

    /// 1-based number of the attempt about to run
    pub fn attempt_number(&self) -> u32 {
        self.retry_count + 1
    }
}

/// Run `operation` until it succeeds or `policy.max_retries` retries fail.
///
/// The error of the final attempt is returned.
pub async fn with_retry<T, E, F, Fut, S>(
    policy: &RetryPolicy,
    sleeper: &S,
    source_index: usize,
    mut operation: F,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    S: Sleeper,
    E: fmt::Display,
{
    let mut attempt = FetchAttempt::new(source_index);

    loop {
        let err = match operation().await {
            Ok(value) => {
                if attempt.retry_count > 0 {
                    tracing::info!(
                        source = attempt.source_index,
                        attempt = attempt.attempt_number(),
                        "Fetch succeeded after retry"
                    );
                }
                return Ok(value);
            }
            Err(err) => err,
        };

        tracing::warn!(
            source = attempt.source_index,
            attempt = attempt.attempt_number(),
            error = %err,
            "Fetch attempt failed"
        );

        if attempt.retry_count >= policy.max_retries {
            return Err(err);
        }

        attempt.retry_count += 1;

        let delay = policy.delay_for(attempt.retry_count);
        tracing::debug!(
            source = attempt.source_index,
            delay_ms = delay.as_millis() as u64,
            "Waiting before retry"
        );
        sleeper.sleep(delay).await;
    }
}
