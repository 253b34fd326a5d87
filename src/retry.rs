use std::future::Future;
use std::time::Duration;

use tokio::time::{sleep, timeout};
use tracing::{debug, warn};

use crate::error::{Error, Result};

/// How a single JSON-RPC call is bounded in time and repeated on failure.
#[derive(Clone, Debug)]
pub struct RetryConfig {
    /// Total number of attempts, including the first one
    pub max_attempts: u32,
    /// Delay before the second attempt
    pub initial_delay: Duration,
    /// Upper bound for the delay between attempts
    pub max_delay: Duration,
    /// Multiplier for exponential backoff
    pub backoff_multiplier: f64,
    /// Per-attempt timeout
    pub timeout: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 1,
            initial_delay: Duration::from_millis(250),
            max_delay: Duration::from_secs(5),
            backoff_multiplier: 2.0,
            timeout: Duration::from_secs(120),
        }
    }
}

impl RetryConfig {
    pub fn with_retries(mut self, retries: u32) -> Self {
        self.max_attempts = retries.saturating_add(1);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn next_delay(&self, delay: Duration) -> Duration {
        Duration::from_secs_f64(
            (delay.as_secs_f64() * self.backoff_multiplier).min(self.max_delay.as_secs_f64()),
        )
    }
}

/// Run `operation` until it succeeds, fails with a non-retryable error, or
/// runs out of attempts. `label` names the operation in logs and timeouts.
pub async fn with_retry<F, Fut, T>(config: &RetryConfig, label: &str, mut operation: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut delay = config.initial_delay;
    let mut last_error = None;

    for attempt in 1..=config.max_attempts {
        debug!("{} attempt {} of {}", label, attempt, config.max_attempts);

        let error = match timeout(config.timeout, operation()).await {
            Ok(Ok(result)) => return Ok(result),
            Ok(Err(e)) => {
                if !e.is_retryable() {
                    debug!("Error is not retryable: {}", e);
                    return Err(e);
                }
                e
            }
            Err(_) => Error::timeout(config.timeout, format!("{label} attempt-{attempt}")),
        };

        // Don't sleep on the last attempt
        if attempt < config.max_attempts {
            warn!(
                "{} attempt {} failed, retrying in {:?}: {}",
                label, attempt, delay, error
            );
            sleep(delay).await;
            delay = config.next_delay(delay);
        }
        last_error = Some(error);
    }

    Err(last_error
        .unwrap_or_else(|| Error::InternalError("Retry failed with no error captured".to_string())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    fn fast_config(max_attempts: u32) -> RetryConfig {
        RetryConfig {
            max_attempts,
            initial_delay: Duration::from_millis(10),
            max_delay: Duration::from_millis(50),
            ..Default::default()
        }
    }

    #[test]
    fn test_default_is_single_attempt() {
        let config = RetryConfig::default();
        assert_eq!(config.max_attempts, 1);
        assert_eq!(config.timeout, Duration::from_secs(120));
        assert_eq!(RetryConfig::default().with_retries(2).max_attempts, 3);
    }

    #[tokio::test]
    async fn test_retry_success_on_second_attempt() {
        let attempt_count = Arc::new(AtomicU32::new(0));
        let attempt_count_clone = attempt_count.clone();

        let result = with_retry(&fast_config(3), "test", || {
            let count = attempt_count_clone.clone();
            async move {
                let attempt = count.fetch_add(1, Ordering::SeqCst);
                if attempt == 0 {
                    Err(Error::Transport("connection reset".to_string()))
                } else {
                    Ok("success")
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), "success");
        assert_eq!(attempt_count.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_retry_non_retryable_error() {
        let attempt_count = Arc::new(AtomicU32::new(0));
        let attempt_count_clone = attempt_count.clone();

        let result: Result<&str> = with_retry(&fast_config(3), "test", || {
            let count = attempt_count_clone.clone();
            async move {
                count.fetch_add(1, Ordering::SeqCst);
                Err(Error::Http {
                    status: Some(401),
                    message: "unauthorized".to_string(),
                })
            }
        })
        .await;

        assert!(matches!(result, Err(Error::Http { status: Some(401), .. })));
        assert_eq!(attempt_count.load(Ordering::SeqCst), 1); // Should not retry
    }

    #[tokio::test]
    async fn test_single_attempt_does_not_retry() {
        let attempt_count = Arc::new(AtomicU32::new(0));
        let attempt_count_clone = attempt_count.clone();

        let result: Result<&str> = with_retry(&RetryConfig::default(), "test", || {
            let count = attempt_count_clone.clone();
            async move {
                count.fetch_add(1, Ordering::SeqCst);
                Err(Error::Transport("down".to_string()))
            }
        })
        .await;

        assert!(matches!(result, Err(Error::Transport(_))));
        assert_eq!(attempt_count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_retry_timeout() {
        let config = RetryConfig {
            max_attempts: 2,
            timeout: Duration::from_millis(50),
            initial_delay: Duration::from_millis(10),
            ..Default::default()
        };

        let result: Result<&str> = with_retry(&config, "tools/call", || async {
            sleep(Duration::from_millis(200)).await;
            Ok("should timeout")
        })
        .await;

        match result {
            Err(Error::Timeout { request_id, .. }) => {
                assert_eq!(request_id, "tools/call attempt-2");
            }
            other => panic!("expected timeout, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_gives_up_after_max_attempts() {
        let attempt_count = Arc::new(AtomicU32::new(0));
        let count_clone = attempt_count.clone();

        let result: Result<()> = with_retry(&fast_config(4), "test", || {
            let count = count_clone.clone();
            async move {
                count.fetch_add(1, Ordering::SeqCst);
                Err(Error::Http {
                    status: Some(503),
                    message: "unavailable".to_string(),
                })
            }
        })
        .await;

        assert!(matches!(result, Err(Error::Http { status: Some(503), .. })));
        assert_eq!(attempt_count.load(Ordering::SeqCst), 4);
    }

    #[test]
    fn test_max_delay_capping() {
        let config = RetryConfig {
            initial_delay: Duration::from_millis(10),
            max_delay: Duration::from_millis(15),
            backoff_multiplier: 10.0,
            ..Default::default()
        };
        assert_eq!(
            config.next_delay(Duration::from_millis(10)),
            Duration::from_millis(15)
        );
    }

    #[tokio::test]
    async fn test_zero_max_attempts() {
        let config = RetryConfig {
            max_attempts: 0,
            ..Default::default()
        };

        let result: Result<&str> = with_retry(&config, "test", || async { Ok("test") }).await;

        assert!(matches!(
            result,
            Err(Error::InternalError(msg)) if msg.contains("Retry failed")
        ));
    }
}
