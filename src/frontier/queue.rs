//! Durable overflow queue of discovered-but-not-yet-promoted URLs

use crate::storage::{lock_storage, with_retry, RetryPolicy, SharedStorage, Storage};
use crate::Result;

/// Unbounded FIFO stored in the durable store
///
/// Entries are ordered by enqueue time across batches; within a batch they
/// keep slice order.
#[derive(Clone)]
pub struct DurableQueue {
    storage: SharedStorage,
    retry: RetryPolicy,
}

impl DurableQueue {
    pub fn new(storage: SharedStorage, retry: RetryPolicy) -> Self {
        Self { storage, retry }
    }

    /// Appends a batch of URLs
    pub async fn enqueue_many(&self, urls: &[String]) -> Result<usize> {
        let appended = with_retry(self.retry, "queue append", || {
            lock_storage(&self.storage)?.enqueue_many(urls)
        })
        .await?;
        Ok(appended)
    }

    /// Removes and returns up to `limit` of the oldest entries, oldest first
    pub async fn take_oldest(&self, limit: usize) -> Result<Vec<String>> {
        let entries = with_retry(self.retry, "queue take", || {
            lock_storage(&self.storage)?.take_oldest(limit)
        })
        .await?;
        Ok(entries.into_iter().map(|entry| entry.url).collect())
    }

    /// Counts pending entries
    pub async fn len(&self) -> Result<u64> {
        let count = with_retry(self.retry, "queue count", || {
            lock_storage(&self.storage)?.count_queued()
        })
        .await?;
        Ok(count)
    }

    pub async fn is_empty(&self) -> Result<bool> {
        Ok(self.len().await? == 0)
    }
}
