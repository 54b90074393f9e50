//! Storage module for persisting frontier state
//!
//! This module handles all durable store operations, including:
//! - SQLite database initialization and schema management
//! - The overflow queue of discovered URLs
//! - The visited registry (URL hashes and content fingerprints)
//! - Retry of transient store failures

mod retry;
mod schema;
mod sqlite;
mod traits;

pub use retry::{with_retry, RetryPolicy};
pub use sqlite::SqliteStorage;
pub use traits::{Storage, StorageError, StorageResult};

use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

/// A storage handle shared by the producer and every worker
pub type SharedStorage = Arc<Mutex<SqliteStorage>>;

/// Initializes or opens a storage database
///
/// # Arguments
///
/// * `path` - Path to the SQLite database file
///
/// # Returns
///
/// * `Ok(SharedStorage)` - Successfully initialized storage
/// * `Err(StorageError)` - Failed to initialize storage
pub fn open_storage(path: &Path) -> StorageResult<SharedStorage> {
    Ok(Arc::new(Mutex::new(SqliteStorage::new(path)?)))
}

/// Wraps an already-open backend for sharing
pub fn share(storage: SqliteStorage) -> SharedStorage {
    Arc::new(Mutex::new(storage))
}

/// Locks the shared storage, mapping poisoning to a storage error
pub fn lock_storage(storage: &SharedStorage) -> StorageResult<MutexGuard<'_, SqliteStorage>> {
    storage.lock().map_err(|_| StorageError::LockPoisoned)
}

/// Represents an entry of the durable queue
#[derive(Debug, Clone)]
pub struct QueueEntry {
    pub id: i64,
    pub url: String,
    pub enqueued_at: String,
}

/// Represents a processed page in the visited registry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisitedRecord {
    pub url_hash: String,
    pub url: String,
    pub fingerprint: String,
    pub visited_at: String,
}
