//! Bounded exponential-backoff retry for transient backend failures

use std::future::Future;
use std::time::Duration;

use tokio::time::sleep;

/// Classifies failures into transient (worth retrying) and permanent.
///
/// A structurally malformed reply is permanent: the prompt is
/// deterministic, so re-asking cannot fix the shape.
pub trait Retryable {
    fn is_retryable(&self) -> bool;
}

/// Retry wrapper with capped exponential backoff.
///
/// Only failures whose [`Retryable::is_retryable`] returns true are
/// retried; everything else propagates after the first attempt. After
/// `max_attempts` the last failure propagates unchanged. The backoff
/// wait is a plain `tokio::time::sleep`, so dropping the future cancels
/// the retry loop immediately.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub min_backoff: Duration,
    pub max_backoff: Duration,
    pub growth_factor: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            min_backoff: Duration::from_secs(4),
            max_backoff: Duration::from_secs(10),
            growth_factor: 2,
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            ..Self::default()
        }
    }

    pub fn with_backoff(mut self, min: Duration, max: Duration) -> Self {
        self.min_backoff = min;
        self.max_backoff = max;
        self
    }

    pub fn with_growth_factor(mut self, factor: u32) -> Self {
        self.growth_factor = factor.max(1);
        self
    }

    /// Run `op`, retrying transient failures until the attempt budget
    /// is exhausted. `label` identifies the operation in diagnostics.
    pub async fn run<T, E, F, Fut>(&self, label: &str, mut op: F) -> Result<T, E>
    where
        E: Retryable + std::fmt::Display,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let mut backoff = self.min_backoff.min(self.max_backoff);
        let mut attempt = 1;

        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(error) if error.is_retryable() && attempt < self.max_attempts => {
                    tracing::warn!(
                        label,
                        attempt,
                        max_attempts = self.max_attempts,
                        wait_ms = backoff.as_millis() as u64,
                        %error,
                        "transient failure, backing off before retry"
                    );
                    sleep(backoff).await;
                    backoff = (backoff * self.growth_factor).min(self.max_backoff);
                    attempt += 1;
                }
                Err(error) => return Err(error),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[derive(Debug)]
    enum TestError {
        Transient,
        Permanent,
    }

    impl Retryable for TestError {
        fn is_retryable(&self) -> bool {
            matches!(self, TestError::Transient)
        }
    }

    impl std::fmt::Display for TestError {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            match self {
                TestError::Transient => write!(f, "transient"),
                TestError::Permanent => write!(f, "permanent"),
            }
        }
    }

    fn fast_policy(max_attempts: u32) -> RetryPolicy {
        RetryPolicy::new(max_attempts)
            .with_backoff(Duration::from_millis(1), Duration::from_millis(2))
    }

    #[tokio::test]
    async fn test_transient_failure_exhausts_attempts() {
        let calls = AtomicU32::new(0);

        let result: Result<(), TestError> = fast_policy(3)
            .run("always-fails", || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err(TestError::Transient) }
            })
            .await;

        assert!(matches!(result, Err(TestError::Transient)));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_permanent_failure_is_not_retried() {
        let calls = AtomicU32::new(0);

        let result: Result<(), TestError> = fast_policy(3)
            .run("permanent", || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err(TestError::Permanent) }
            })
            .await;

        assert!(matches!(result, Err(TestError::Permanent)));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_succeeds_after_transient_failures() {
        let calls = AtomicU32::new(0);

        let result: Result<u32, TestError> = fast_policy(3)
            .run("flaky", || {
                let call = calls.fetch_add(1, Ordering::SeqCst);
                async move {
                    if call < 2 {
                        Err(TestError::Transient)
                    } else {
                        Ok(42)
                    }
                }
            })
            .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_immediate_success_makes_one_attempt() {
        let calls = AtomicU32::new(0);

        let result: Result<&str, TestError> = fast_policy(3)
            .run("ok", || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Ok("done") }
            })
            .await;

        assert_eq!(result.unwrap(), "done");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
