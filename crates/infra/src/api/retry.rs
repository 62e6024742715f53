//! Bounded retry with exponential backoff
//!
//! Only rate limiting is retried. Delays are `base * 2^attempt_index`
//! (zero-based), so three attempts sleep `base` then `2 * base`.

use std::future::Future;
use std::time::Duration;

use mixpanel_domain::RetryConfig;
use tracing::{debug, warn};

use super::errors::ApiError;

/// Upper bound on the backoff exponent so delays cannot overflow.
const MAX_BACKOFF_SHIFT: u32 = 16;

/// Retry parameters for one batch dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    base_delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self { max_attempts: max_attempts.max(1), base_delay }
    }

    pub fn from_config(config: &RetryConfig) -> Self {
        Self::new(config.max_attempts, config.base_delay())
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Delay before retrying after the attempt with zero-based `attempt_index`.
    pub fn backoff_delay(&self, attempt_index: u32) -> Duration {
        let shift = attempt_index.min(MAX_BACKOFF_SHIFT);
        self.base_delay.saturating_mul(1u32 << shift)
    }

    /// Run `operation` until it succeeds, fails with a non-retryable error,
    /// or the attempt budget is spent. The closure receives the zero-based
    /// attempt index.
    pub async fn execute<T, F, Fut>(&self, mut operation: F) -> Result<T, ApiError>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, ApiError>>,
    {
        let mut attempt = 0;

        loop {
            match operation(attempt).await {
                Ok(value) => {
                    if attempt > 0 {
                        debug!(attempts = attempt + 1, "request succeeded after retry");
                    }
                    return Ok(value);
                }
                Err(err) if !err.should_retry() => return Err(err),
                Err(err) => {
                    // The last attempt's error is the one reported.
                    if attempt + 1 >= self.max_attempts {
                        warn!(attempts = attempt + 1, error = %err, "retry budget exhausted");
                        return Err(err);
                    }

                    let delay = self.backoff_delay(attempt);
                    warn!(
                        attempt = attempt + 1,
                        max_attempts = self.max_attempts,
                        delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                        error = %err,
                        "rate limited, backing off"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&RetryConfig::default())
    }
}
