//! Storage traits and error types
//!
//! This module defines the trait interface for durable store backends and
//! associated error types.

use crate::storage::{QueueEntry, VisitedRecord};
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Storage lock poisoned")]
    LockPoisoned,
}

impl StorageError {
    /// Returns true for failures worth retrying (another connection holds the lock)
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Sqlite(rusqlite::Error::SqliteFailure(err, _)) => matches!(
                err.code,
                rusqlite::ErrorCode::DatabaseBusy | rusqlite::ErrorCode::DatabaseLocked
            ),
            _ => false,
        }
    }
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for durable store implementations
///
/// Backs both the overflow queue of discovered URLs and the visited
/// registry. Each method is atomic on its own; nothing here spans calls.
pub trait Storage {
    // ===== Durable Queue =====

    /// Appends URLs to the durable queue, preserving slice order
    ///
    /// # Returns
    ///
    /// The number of entries appended
    fn enqueue_many(&mut self, urls: &[String]) -> StorageResult<usize>;

    /// Removes and returns up to `limit` of the oldest queue entries, oldest first
    fn take_oldest(&mut self, limit: usize) -> StorageResult<Vec<QueueEntry>>;

    /// Counts entries waiting in the durable queue
    fn count_queued(&self) -> StorageResult<u64>;

    /// Lists queued URLs oldest first without removing them
    fn list_queued(&self, limit: usize) -> StorageResult<Vec<String>>;

    // ===== Visited Registry =====

    /// Inserts a visited record unless one already exists with the same
    /// URL hash or the same fingerprint
    ///
    /// # Returns
    ///
    /// `true` if this call inserted the record
    fn insert_visited_if_absent(&mut self, record: &VisitedRecord) -> StorageResult<bool>;

    /// Checks for a visited record with this URL hash
    fn contains_url_hash(&self, url_hash: &str) -> StorageResult<bool>;

    /// Checks for a visited record with this content fingerprint
    fn contains_fingerprint(&self, fingerprint: &str) -> StorageResult<bool>;

    /// Counts visited records
    fn count_visited(&self) -> StorageResult<u64>;

    /// Counts distinct fingerprints among visited records
    fn count_distinct_fingerprints(&self) -> StorageResult<u64>;

    /// Gets the most recently recorded visit
    fn latest_visit(&self) -> StorageResult<Option<VisitedRecord>>;

    // ===== Maintenance =====

    /// Empties both the queue and the registry
    fn clear(&mut self) -> StorageResult<()>;
}
