use crate::error::Result;
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{info, warn};

/// Exponential backoff for retryable provider errors.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub initial_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(60),
        }
    }
}

impl RetryPolicy {
    pub async fn run<F, Fut, T>(&self, mut operation: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut attempt = 0;
        let mut delay = self.initial_delay;

        loop {
            match operation().await {
                Ok(result) => return Ok(result),
                Err(err) if attempt >= self.max_retries || !err.is_retryable() => {
                    return Err(err);
                }
                Err(err) => {
                    attempt += 1;
                    warn!(
                        "Request failed (attempt {}/{}): {}",
                        attempt, self.max_retries, err
                    );

                    // Server-provided hint wins over our own schedule
                    let retry_delay = err.retry_after().map(Duration::from_secs).unwrap_or(delay);

                    info!("Retrying in {:?}", retry_delay);
                    sleep(retry_delay).await;

                    delay = std::cmp::min(delay * 2, self.max_delay);
                }
            }
        }
    }
}
