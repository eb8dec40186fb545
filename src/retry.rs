use std::future::Future;
use std::time::Duration;

use tracing::warn;

use crate::{Error, Result};

/// Fixed-budget retry with linear backoff. The wait after failed
/// attempt `i` (1-based) is `i * backoff_unit`; there is no wait after
/// the final attempt. Holds no state across invocations.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    attempts: u32,
    backoff_unit: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 3,
            backoff_unit: Duration::from_secs(3),
        }
    }
}

impl RetryPolicy {
    pub fn new(attempts: u32, backoff_unit: Duration) -> Self {
        Self {
            attempts: attempts.max(1),
            backoff_unit,
        }
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Runs `operation` up to the attempt budget, returning the first
    /// success immediately. The final failure is wrapped as
    /// [`Error::Exhausted`] carrying the last underlying cause.
    pub async fn execute<T, F, Fut>(&self, mut operation: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut attempt = 1u32;
        loop {
            match operation().await {
                Ok(value) => return Ok(value),
                Err(err) if attempt < self.attempts => {
                    let wait = self.backoff_unit * attempt;
                    warn!(
                        "attempt {attempt}/{} failed ({err}); retrying in {}s",
                        self.attempts,
                        wait.as_secs()
                    );
                    tokio::time::sleep(wait).await;
                    attempt += 1;
                }
                Err(err) => {
                    return Err(Error::Exhausted {
                        attempts: self.attempts,
                        source: Box::new(err),
                    });
                }
            }
        }
    }
}
