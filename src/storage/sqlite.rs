//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the Storage trait.

use crate::storage::schema::initialize_schema;
use crate::storage::traits::{Storage, StorageResult};
use crate::storage::{QueueEntry, VisitedRecord};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::time::Duration;

/// SQLite storage backend
pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    /// Creates a new SqliteStorage instance
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    ///
    /// # Returns
    ///
    /// * `Ok(SqliteStorage)` - Successfully opened/created database
    /// * `Err(StorageError)` - Failed to open database
    pub fn new(path: &Path) -> StorageResult<Self> {
        let conn = Connection::open(path)?;

        // Configure SQLite for better performance
        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA temp_store = MEMORY;
        ",
        )?;
        // Another process (e.g. `--stats`) may hold the write lock briefly
        conn.busy_timeout(Duration::from_secs(5))?;

        initialize_schema(&conn)?;

        Ok(Self { conn })
    }

    /// Creates an in-memory database
    pub fn new_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }
}

impl Storage for SqliteStorage {
    // ===== Durable Queue =====

    fn enqueue_many(&mut self, urls: &[String]) -> StorageResult<usize> {
        if urls.is_empty() {
            return Ok(0);
        }

        let now = Utc::now().to_rfc3339();
        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare("INSERT INTO queue (url, enqueued_at) VALUES (?1, ?2)")?;
            for url in urls {
                stmt.execute(params![url, now])?;
            }
        }
        tx.commit()?;

        Ok(urls.len())
    }

    fn take_oldest(&mut self, limit: usize) -> StorageResult<Vec<QueueEntry>> {
        if limit == 0 {
            return Ok(Vec::new());
        }

        let tx = self.conn.transaction()?;
        let entries = {
            let mut stmt =
                tx.prepare("SELECT id, url, enqueued_at FROM queue ORDER BY id ASC LIMIT ?1")?;
            let rows = stmt.query_map(params![limit as i64], |row| {
                Ok(QueueEntry {
                    id: row.get(0)?,
                    url: row.get(1)?,
                    enqueued_at: row.get(2)?,
                })
            })?;
            rows.collect::<Result<Vec<_>, _>>()?
        };

        if let Some(last) = entries.last() {
            // Ids are handed out in ascending order, so the taken rows are exactly id <= last
            tx.execute("DELETE FROM queue WHERE id <= ?1", params![last.id])?;
        }
        tx.commit()?;

        Ok(entries)
    }

    fn count_queued(&self) -> StorageResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM queue", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    fn list_queued(&self, limit: usize) -> StorageResult<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT url FROM queue ORDER BY id ASC LIMIT ?1")?;
        let urls = stmt
            .query_map(params![limit as i64], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;
        Ok(urls)
    }

    // ===== Visited Registry =====

    fn insert_visited_if_absent(&mut self, record: &VisitedRecord) -> StorageResult<bool> {
        let inserted = self.conn.execute(
            "INSERT INTO visited (url_hash, url, fingerprint, visited_at)
             SELECT ?1, ?2, ?3, ?4
             WHERE NOT EXISTS (
                 SELECT 1 FROM visited WHERE url_hash = ?1 OR fingerprint = ?3
             )",
            params![
                record.url_hash,
                record.url,
                record.fingerprint,
                record.visited_at
            ],
        )?;
        Ok(inserted == 1)
    }

    fn contains_url_hash(&self, url_hash: &str) -> StorageResult<bool> {
        let found: Option<i64> = self
            .conn
            .query_row(
                "SELECT 1 FROM visited WHERE url_hash = ?1 LIMIT 1",
                params![url_hash],
                |row| row.get(0),
            )
            .optional()?;
        Ok(found.is_some())
    }

    fn contains_fingerprint(&self, fingerprint: &str) -> StorageResult<bool> {
        let found: Option<i64> = self
            .conn
            .query_row(
                "SELECT 1 FROM visited WHERE fingerprint = ?1 LIMIT 1",
                params![fingerprint],
                |row| row.get(0),
            )
            .optional()?;
        Ok(found.is_some())
    }

    fn count_visited(&self) -> StorageResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM visited", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    fn count_distinct_fingerprints(&self) -> StorageResult<u64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(DISTINCT fingerprint) FROM visited",
            [],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }

    fn latest_visit(&self) -> StorageResult<Option<VisitedRecord>> {
        let record = self
            .conn
            .query_row(
                "SELECT url_hash, url, fingerprint, visited_at FROM visited ORDER BY id DESC LIMIT 1",
                [],
                |row| {
                    Ok(VisitedRecord {
                        url_hash: row.get(0)?,
                        url: row.get(1)?,
                        fingerprint: row.get(2)?,
                        visited_at: row.get(3)?,
                    })
                },
            )
            .optional()?;
        Ok(record)
    }

    // ===== Maintenance =====

    fn clear(&mut self) -> StorageResult<()> {
        self.conn
            .execute_batch("DELETE FROM queue; DELETE FROM visited;")?;
        Ok(())
    }
}
