//! Visited registry
//!
//! Records which URLs and which content fingerprints have been processed.
//! Backed by the durable store and fronted by an in-process cache of URL
//! hashes.

use crate::storage::{lock_storage, with_retry, RetryPolicy, SharedStorage, Storage, VisitedRecord};
use crate::Result;
use chrono::Utc;
use sha2::{Digest, Sha256};
use std::collections::HashSet;
use std::fmt;
use std::sync::{Mutex, PoisonError};

/// Dedup identity of a URL: hex SHA-256 of the raw string, no normalization
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UrlHash(String);

impl UrlHash {
    pub fn of(url: &str) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(url.as_bytes());
        Self(hex::encode(hasher.finalize()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UrlHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Registry of processed pages
pub struct VisitedRegistry {
    storage: SharedStorage,
    retry: RetryPolicy,
    cache: Mutex<HashSet<UrlHash>>,
}

impl VisitedRegistry {
    pub fn new(storage: SharedStorage, retry: RetryPolicy) -> Self {
        Self {
            storage,
            retry,
            cache: Mutex::new(HashSet::new()),
        }
    }

    /// Checks the in-process cache only
    pub fn is_cached(&self, hash: &UrlHash) -> bool {
        self.cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(hash)
    }

    fn remember(&self, hash: &UrlHash) {
        self.cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(hash.clone());
    }

    /// Returns true if this URL hash has been recorded by any worker or any
    /// earlier run
    pub async fn contains_url(&self, hash: &UrlHash) -> Result<bool> {
        if self.is_cached(hash) {
            return Ok(true);
        }

        let found = with_retry(self.retry, "visited lookup", || {
            lock_storage(&self.storage)?.contains_url_hash(hash.as_str())
        })
        .await?;

        if found {
            self.remember(hash);
        }
        Ok(found)
    }

    /// Returns true if a page with this fingerprint has been recorded
    pub async fn contains_fingerprint(&self, fingerprint: &str) -> Result<bool> {
        let found = with_retry(self.retry, "fingerprint lookup", || {
            lock_storage(&self.storage)?.contains_fingerprint(fingerprint)
        })
        .await?;
        Ok(found)
    }

    /// Records a processed page unless its URL hash or fingerprint is
    /// already known
    ///
    /// The check and the insert are one durable statement, so two workers
    /// racing on the same URL or the same content cannot both win.
    ///
    /// # Returns
    ///
    /// * `Ok(true)` - This call recorded the page
    /// * `Ok(false)` - The page (or identical content) was already recorded
    pub async fn record_visited(&self, url: &str, hash: &UrlHash, fingerprint: &str) -> Result<bool> {
        let record = VisitedRecord {
            url_hash: hash.as_str().to_string(),
            url: url.to_string(),
            fingerprint: fingerprint.to_string(),
            visited_at: Utc::now().to_rfc3339(),
        };

        let inserted = with_retry(self.retry, "visited insert", || {
            lock_storage(&self.storage)?.insert_visited_if_absent(&record)
        })
        .await?;

        if inserted {
            self.remember(hash);
        }
        Ok(inserted)
    }

    /// Counts visited records in the durable store
    pub async fn count(&self) -> Result<u64> {
        let count = with_retry(self.retry, "visited count", || {
            lock_storage(&self.storage)?.count_visited()
        })
        .await?;
        Ok(count)
    }
}
