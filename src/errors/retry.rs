use std::time::Duration;
use std::future::Future;

use super::classification::ErrorClassification;
use super::types::BenchError;
use tracing::warn;

impl ErrorClassification {
    /// Calculate the retry delay for this error classification based on the
    /// current attempt number (0-indexed).
    ///
    /// - RateLimitError: 5s + (attempt * 5s), capped at 30s
    /// - Default: exponential backoff 2^attempt + random jitter (0-1s), capped at 10s
    pub fn retry_delay(&self, attempt: u32) -> Duration {
        match self.error_type {
            "RateLimitError" => {
                let secs = 5 + (attempt as u64 * 5);
                Duration::from_secs(secs.min(30))
            }
            _ => {
                let base: f64 = 2.0_f64.powi(attempt as i32);
                let jitter: f64 = rand::random::<f64>();
                let secs = (base + jitter).min(10.0);
                Duration::from_secs_f64(secs)
            }
        }
    }
}

/// Retry configuration for provider calls.
#[derive(Debug, Clone, Default)]
pub struct RetryConfig {
    pub max_retries: u32,
}

/// Execute an async operation with retry logic.
///
/// Retries only if the error is classified as retryable and we haven't
/// exceeded max_retries. With `max_retries == 0` the operation runs once.
pub async fn with_retry<F, Fut, T>(
    operation_name: &str,
    config: &RetryConfig,
    mut factory: F,
) -> Result<T, BenchError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, BenchError>>,
{
    let max_attempts = config.max_retries + 1;

    let mut last_error = None;

    for attempt in 0..max_attempts {
        match factory().await {
            Ok(result) => return Ok(result),
            Err(e) => {
                let classification = e.classify();

                if !classification.retryable || attempt + 1 >= max_attempts {
                    if max_attempts > 1 {
                        warn!(
                            operation = operation_name,
                            attempt = attempt + 1,
                            max = max_attempts,
                            error_type = classification.error_type,
                            "Giving up"
                        );
                    }
                    return Err(e);
                }

                let delay = classification.retry_delay(attempt);
                warn!(
                    operation = operation_name,
                    attempt = attempt + 1,
                    max = max_attempts,
                    error_type = classification.error_type,
                    delay_ms = delay.as_millis() as u64,
                    error = %e,
                    "Retrying after error"
                );

                tokio::time::sleep(delay).await;
                last_error = Some(e);
            }
        }
    }

    Err(last_error.unwrap_or_else(|| BenchError::Internal("Retry loop exited unexpectedly".into())))
}
