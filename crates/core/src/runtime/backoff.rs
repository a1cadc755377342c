use crate::config::BackoffConfig;
use semscope_api::{ApiError, ApiResult};
use std::future::Future;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

#[derive(Error, Debug)]
pub enum RetryError {
    #[error("Cancelled")]
    Cancelled,
    #[error("Gave up after {attempts} attempts: {source}")]
    Exhausted { attempts: u32, source: ApiError },
    #[error("Non-retryable failure: {0}")]
    Fatal(ApiError),
}

/// Run `op` until it succeeds, sleeping with exponential backoff between
/// attempts. Stops early on cancellation, on a non-transient error, or when
/// the configured attempt limit is reached.
pub async fn retry_with_backoff<T, F, Fut>(
    what: &str,
    config: &BackoffConfig,
    cancel: &CancellationToken,
    mut op: F,
) -> Result<T, RetryError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = ApiResult<T>>,
{
    let mut attempts = 0u32;
    loop {
        attempts = attempts.saturating_add(1);
        let result = tokio::select! {
            _ = cancel.cancelled() => return Err(RetryError::Cancelled),
            result = op() => result,
        };

        let error = match result {
            Ok(value) => {
                if attempts > 1 {
                    tracing::info!("{} succeeded after {} attempts", what, attempts);
                }
                return Ok(value);
            }
            Err(error) if !error.is_transient() => return Err(RetryError::Fatal(error)),
            Err(error) => error,
        };

        if config.attempts_exhausted(attempts) {
            return Err(RetryError::Exhausted {
                attempts,
                source: error,
            });
        }

        let delay = config.delay(attempts);
        tracing::warn!(
            "{} failed (attempt {}): {}; retrying in {:?}",
            what,
            attempts,
            error,
            delay
        );
        tokio::select! {
            _ = cancel.cancelled() => return Err(RetryError::Cancelled),
            _ = tokio::time::sleep(delay) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn fast(max_attempts: Option<u32>) -> BackoffConfig {
        BackoffConfig {
            initial_delay_ms: 1,
            multiplier: 2,
            max_delay_ms: 4,
            max_attempts,
        }
    }

    fn failing() -> ApiError {
        ApiError::RequestFailed {
            method: "test".to_string(),
            reason: "busy".to_string(),
        }
    }

    #[tokio::test]
    async fn test_retries_until_success() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();
        let result = retry_with_backoff("op", &fast(None), &CancellationToken::new(), || {
            let counter = counter.clone();
            async move {
                if counter.fetch_add(1, Ordering::SeqCst) < 3 {
                    Err(failing())
                } else {
                    Ok(7)
                }
            }
        })
        .await;
        assert_eq!(result.unwrap(), 7);
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn test_gives_up_after_limit() {
        let result: Result<(), _> =
            retry_with_backoff("op", &fast(Some(2)), &CancellationToken::new(), || async {
                Err(failing())
            })
            .await;
        assert!(matches!(result, Err(RetryError::Exhausted { attempts: 2, .. })));
    }

    #[tokio::test]
    async fn test_non_transient_error_stops_immediately() {
        let calls = AtomicU32::new(0);
        let result: Result<(), _> =
            retry_with_backoff("op", &fast(None), &CancellationToken::new(), || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err(ApiError::Disconnected) }
            })
            .await;
        assert!(matches!(result, Err(RetryError::Fatal(ApiError::Disconnected))));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_cancellation_interrupts_retries() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        let result: Result<(), _> =
            retry_with_backoff("op", &fast(None), &cancel, || async { Err(failing()) }).await;
        assert!(matches!(result, Err(RetryError::Cancelled)));
    }
}
