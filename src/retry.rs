//! Retry with exponential backoff and condition polling

use std::future::Future;
use std::time::Duration;

use tokio::time::{sleep, Instant};
use tracing::debug;

/// Backoff schedule for retried operations.
///
/// Attempts are 1-indexed; the delay taken after a failed attempt `i`
/// (when another attempt remains) is `base_delay * multiplier^(i-1)`.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub multiplier: f64,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            // Zero attempts would mean never running the operation
            max_attempts: max_attempts.max(1),
            base_delay,
            multiplier: 2.0,
        }
    }

    /// Delay to wait after the given 1-indexed failed attempt.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.base_delay
            .mul_f64(self.multiplier.powi(attempt.saturating_sub(1) as i32))
    }
}

/// Invoke `op` up to `max_retries` times with exponential backoff.
///
/// Success on any attempt returns that attempt's value immediately. If the
/// final attempt fails, its error propagates unchanged.
pub async fn retry<T, E, F, Fut>(mut op: F, max_retries: u32, base_delay: Duration) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let policy = RetryPolicy::new(max_retries, base_delay);
    let mut attempt = 1;

    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(err) if attempt >= policy.max_attempts => return Err(err),
            Err(_) => {
                let delay = policy.delay_for(attempt);
                debug!("Attempt {}/{} failed, retrying in {:?}", attempt, policy.max_attempts, delay);
                sleep(delay).await;
                attempt += 1;
            }
        }
    }
}

/// Poll `predicate` every `interval` until it returns true or `timeout`
/// elapses. Returns whether the condition was met; timing out is not an
/// error here, failure-signaling belongs to the caller.
pub async fn wait_for_condition<F, Fut>(mut predicate: F, timeout: Duration, interval: Duration) -> bool
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    let deadline = Instant::now() + timeout;

    while Instant::now() < deadline {
        if predicate().await {
            return true;
        }
        sleep(interval).await;
    }

    false
}
