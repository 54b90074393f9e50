//! Bounded retry for transient durable store failures

use crate::storage::StorageResult;
use std::time::Duration;

/// How often and how patiently a store operation is retried
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Retries after the first attempt
    pub max_retries: u32,

    /// Delay before the first retry; doubles on each further retry
    pub base_backoff: Duration,
}

impl RetryPolicy {
    pub fn new(max_retries: u32, base_backoff: Duration) -> Self {
        Self {
            max_retries,
            base_backoff,
        }
    }

    /// A policy that never retries
    pub fn none() -> Self {
        Self::new(0, Duration::ZERO)
    }

    fn backoff(&self, attempt: u32) -> Duration {
        self.base_backoff
            .saturating_mul(2u32.saturating_pow(attempt.saturating_sub(1)))
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_millis(200))
    }
}

/// Runs `op`, retrying transient failures with exponential backoff
///
/// Permanent failures, and transient ones that outlast the policy, are
/// returned to the caller unchanged.
pub async fn with_retry<T, F>(policy: RetryPolicy, operation: &str, mut op: F) -> StorageResult<T>
where
    F: FnMut() -> StorageResult<T>,
{
    let mut attempt = 0;
    loop {
        match op() {
            Ok(value) => return Ok(value),
            Err(e) if e.is_transient() && attempt < policy.max_retries => {
                attempt += 1;
                let delay = policy.backoff(attempt);
                tracing::warn!(
                    "Transient store failure during {} (attempt {}/{}), retrying in {:?}: {}",
                    operation,
                    attempt,
                    policy.max_retries,
                    delay,
                    e
                );
                tokio::time::sleep(delay).await;
            }
            Err(e) => return Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::StorageError;

    fn busy() -> StorageError {
        StorageError::Sqlite(rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_BUSY),
            None,
        ))
    }

    #[test]
    fn test_backoff_doubles() {
        let policy = RetryPolicy::new(3, Duration::from_millis(100));
        assert_eq!(policy.backoff(1), Duration::from_millis(100));
        assert_eq!(policy.backoff(2), Duration::from_millis(200));
        assert_eq!(policy.backoff(3), Duration::from_millis(400));
    }

    #[test]
    fn test_busy_is_transient() {
        assert!(busy().is_transient());
        assert!(!StorageError::LockPoisoned.is_transient());
        assert!(!StorageError::Database("gone".to_string()).is_transient());
    }

    #[tokio::test]
    async fn test_retries_transient_then_succeeds() {
        let policy = RetryPolicy::new(3, Duration::from_millis(1));
        let mut calls = 0;

        let result = with_retry(policy, "test", || {
            calls += 1;
            if calls < 3 {
                Err(busy())
            } else {
                Ok(calls)
            }
        })
        .await;

        assert_eq!(result.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_gives_up_after_max_retries() {
        let policy = RetryPolicy::new(2, Duration::from_millis(1));
        let mut calls = 0;

        let result: StorageResult<()> = with_retry(policy, "test", || {
            calls += 1;
            Err(busy())
        })
        .await;

        assert!(result.is_err());
        assert_eq!(calls, 3);
    }

    #[tokio::test]
    async fn test_permanent_failure_not_retried() {
        let policy = RetryPolicy::new(5, Duration::from_millis(1));
        let mut calls = 0;

        let result: StorageResult<()> = with_retry(policy, "test", || {
            calls += 1;
            Err(StorageError::Database("corrupt".to_string()))
        })
        .await;

        assert!(result.is_err());
        assert_eq!(calls, 1);
    }
}
