//! Bounded exponential backoff around a single completion call

use std::future::Future;
use std::time::Duration;
use tracing::warn;

use screentest_common::config::RetryConfig;

use super::backend::{BackendError, Completion};
use super::GenerationFailure;

/// Delay before retry number `retry` (1-based), capped at the configured max
pub fn backoff_delay(policy: &RetryConfig, retry: u32) -> Duration {
    let exponent = retry.saturating_sub(1) as i32;
    let millis = policy.initial_backoff_ms as f64 * policy.multiplier.powi(exponent);
    let capped = millis.min(policy.max_backoff_ms as f64).max(0.0);
    Duration::from_millis(capped as u64)
}

/// Run `call` until it succeeds, fails for good, or runs out of attempts.
///
/// Each attempt is bounded by `timeout`. Returns the completion together with
/// the number of attempts made.
pub async fn with_retry<F, Fut>(
    policy: &RetryConfig,
    timeout: Duration,
    mut call: F,
) -> Result<(Completion, u32), GenerationFailure>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Completion, BackendError>>,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 0;

    loop {
        attempt += 1;
        let outcome = match tokio::time::timeout(timeout, call()).await {
            Ok(result) => result,
            Err(_) => Err(BackendError::Timeout),
        };

        let error = match outcome {
            Ok(completion) => return Ok((completion, attempt)),
            Err(error) => error,
        };

        let failure = GenerationFailure::from_backend(&error, attempt);
        if !failure.retryable || attempt >= max_attempts {
            return Err(failure);
        }

        let delay = backoff_delay(policy, attempt);
        warn!(
            attempt,
            max_attempts,
            kind = %failure.kind,
            delay_ms = delay.as_millis() as u64,
            "Completion failed, retrying: {}",
            error
        );
        tokio::time::sleep(delay).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GenerationErrorKind;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn policy(max_attempts: u32) -> RetryConfig {
        RetryConfig {
            max_attempts,
            initial_backoff_ms: 100,
            max_backoff_ms: 350,
            multiplier: 2.0,
        }
    }

    fn completion() -> Completion {
        Completion {
            text: "ok".to_string(),
            input_tokens: 1,
            output_tokens: 1,
        }
    }

    #[test]
    fn test_backoff_grows_and_caps() {
        let policy = policy(5);
        assert_eq!(backoff_delay(&policy, 1), Duration::from_millis(100));
        assert_eq!(backoff_delay(&policy, 2), Duration::from_millis(200));
        assert_eq!(backoff_delay(&policy, 3), Duration::from_millis(350));
        assert_eq!(backoff_delay(&policy, 10), Duration::from_millis(350));
    }

    #[tokio::test(start_paused = true)]
    async fn test_transient_failures_are_retried() {
        let calls = AtomicU32::new(0);
        let result = with_retry(&policy(3), Duration::from_secs(5), || {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if n < 2 {
                    Err(BackendError::Status {
                        code: 503,
                        body: "overloaded".to_string(),
                    })
                } else {
                    Ok(completion())
                }
            }
        })
        .await;

        let (_, attempts) = result.unwrap();
        assert_eq!(attempts, 3);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_credential_failures_are_not_retried() {
        let calls = AtomicU32::new(0);
        let failure = with_retry(&policy(3), Duration::from_secs(5), || {
            calls.fetch_add(1, Ordering::SeqCst);
            async {
                Err(BackendError::Status {
                    code: 401,
                    body: "bad key".to_string(),
                })
            }
        })
        .await
        .unwrap_err();

        assert_eq!(failure.kind, GenerationErrorKind::Credential);
        assert_eq!(failure.attempts, 1);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_calls_time_out_and_exhaust_attempts() {
        let failure = with_retry(&policy(2), Duration::from_millis(50), || async {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(completion())
        })
        .await
        .unwrap_err();

        assert_eq!(failure.kind, GenerationErrorKind::Timeout);
        assert!(failure.retryable);
        assert_eq!(failure.attempts, 2);
    }
}
