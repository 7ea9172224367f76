use crate::oracle::OracleError;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{info, warn};

/// Bounded exponential backoff for oracle calls. Only transient failures
/// are retried; malformed output returns immediately.
pub struct RetryPolicy {
    max_attempts: usize,
    initial_backoff: Duration,
    max_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, 1000, 6000)
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: usize, initial_backoff_ms: u64, max_backoff_ms: u64) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            initial_backoff: Duration::from_millis(initial_backoff_ms),
            max_backoff: Duration::from_millis(max_backoff_ms),
        }
    }

    /// Run `f` until it succeeds, fails non-transiently, or exhausts the
    /// attempt budget.
    pub async fn retry<F, Fut, T>(&self, operation: &str, mut f: F) -> Result<T, OracleError>
    where
        F: FnMut() -> Fut,
        Fut: std::future::Future<Output = Result<T, OracleError>>,
    {
        let mut backoff = self.initial_backoff;

        for attempt in 1..=self.max_attempts {
            match f().await {
                Ok(result) => {
                    if attempt > 1 {
                        info!(operation, attempts = attempt, "oracle call succeeded after retries");
                    }
                    return Ok(result);
                }
                Err(e) if e.is_transient() && attempt < self.max_attempts => {
                    warn!(
                        operation,
                        attempt,
                        max_attempts = self.max_attempts,
                        backoff_ms = backoff.as_millis() as u64,
                        error = %e,
                        "transient oracle failure, retrying"
                    );
                    sleep(backoff).await;
                    backoff = std::cmp::min(backoff * 2, self.max_backoff);
                }
                Err(e) => {
                    warn!(operation, attempt, error = %e, "oracle call failed");
                    return Err(e);
                }
            }
        }
        unreachable!("loop returns on the final attempt")
    }
}
