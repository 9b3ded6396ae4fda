//! Bounded retry loop for resilient operations.

use super::config::RetryPolicy;
use envlift_core::Result;
use std::future::Future;
use tokio::time::sleep;

/// What one attempt produced, already classified by the caller
#[derive(Debug)]
pub enum Attempt<T> {
    /// Done, successfully
    Success(T),
    /// Transient failure; worth another attempt if any remain
    Retry(T),
    /// Failure that will not improve with another attempt
    Stop(T),
}

/// The final value of a retry loop along with how it ended
#[derive(Debug)]
pub struct RetryOutcome<T> {
    /// Value produced by the last attempt
    pub value: T,
    /// Number of attempts made, starting at 1
    pub attempts: usize,
    /// Whether the last attempt was a success
    pub succeeded: bool,
}

/// Execute an operation under a retry policy.
///
/// Attempts run strictly one after another. An `Err` from the operation aborts the
/// loop immediately and is returned as-is; `Attempt::Stop` ends the loop with the
/// value of that attempt; `Attempt::Retry` sleeps for the policy delay and tries
/// again until `max_attempts` is reached, after which the last value is returned.
pub async fn retry<F, Fut, T>(policy: &RetryPolicy, mut operation: F) -> Result<RetryOutcome<T>>
where
    F: FnMut(usize) -> Fut,
    Fut: Future<Output = Result<Attempt<T>>>,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 1;

    loop {
        match operation(attempt).await? {
            Attempt::Success(value) => {
                if attempt > 1 {
                    ::tracing::debug!(attempt, "operation succeeded after retrying");
                }
                return Ok(RetryOutcome {
                    value,
                    attempts: attempt,
                    succeeded: true,
                });
            }
            Attempt::Stop(value) => {
                return Ok(RetryOutcome {
                    value,
                    attempts: attempt,
                    succeeded: false,
                });
            }
            Attempt::Retry(value) => {
                if attempt >= max_attempts {
                    ::tracing::debug!(attempts = attempt, "giving up after final attempt");
                    return Ok(RetryOutcome {
                        value,
                        attempts: attempt,
                        succeeded: false,
                    });
                }
                ::tracing::debug!(
                    attempt,
                    max_attempts,
                    delay_ms = policy.delay.as_millis() as u64,
                    "attempt failed, retrying"
                );
                drop(value);
                sleep(policy.delay).await;
                attempt += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resilience::StatusClass;
    use envlift_core::Error;
    use std::cell::Cell;
    use std::time::Duration;

    fn scripted(statuses: &[u16]) -> impl FnMut(usize) -> std::future::Ready<Result<Attempt<u16>>> + '_ {
        let policy = RetryPolicy::default();
        move |attempt| {
            let status = statuses[attempt - 1];
            let classified = match policy.classify(status) {
                StatusClass::Success => Attempt::Success(status),
                StatusClass::Retryable => Attempt::Retry(status),
                StatusClass::Terminal => Attempt::Stop(status),
            };
            std::future::ready(Ok(classified))
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_four_transient_failures_then_success() {
        let statuses = [503, 503, 503, 503, 200];
        let outcome = retry(&RetryPolicy::default(), scripted(&statuses))
            .await
            .unwrap();

        assert!(outcome.succeeded);
        assert_eq!(outcome.attempts, 5);
        assert_eq!(outcome.value, 200);
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhaustion_returns_last_value_without_extra_attempt() {
        // A sixth entry would be an out-of-bounds panic if the loop overran
        let statuses = [503, 502, 500, 429, 503];
        let outcome = retry(&RetryPolicy::default(), scripted(&statuses))
            .await
            .unwrap();

        assert!(!outcome.succeeded);
        assert_eq!(outcome.attempts, 5);
        assert_eq!(outcome.value, 503);
    }

    #[tokio::test(start_paused = true)]
    async fn test_terminal_status_stops_immediately() {
        let statuses = [404];
        let outcome = retry(&RetryPolicy::default(), scripted(&statuses))
            .await
            .unwrap();

        assert!(!outcome.succeeded);
        assert_eq!(outcome.attempts, 1);
        assert_eq!(outcome.value, 404);
    }

    #[tokio::test(start_paused = true)]
    async fn test_error_is_fatal_without_retry() {
        let calls = Cell::new(0);
        let result: Result<RetryOutcome<()>> = retry(&RetryPolicy::default(), |_| {
            calls.set(calls.get() + 1);
            std::future::ready(Err(Error::network("http://localhost:1", "connection refused")))
        })
        .await;

        assert!(matches!(result, Err(Error::Network { .. })));
        assert_eq!(calls.get(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_delay_is_applied_between_attempts() {
        let policy = RetryPolicy::default().with_delay(Duration::from_secs(2));
        let statuses = [503, 503, 200];
        let start = tokio::time::Instant::now();

        let outcome = retry(&policy, scripted(&statuses)).await.unwrap();

        assert!(outcome.succeeded);
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_secs(4) && elapsed < Duration::from_secs(5));
    }
}
