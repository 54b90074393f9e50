//! Database schema definitions
//!
//! This module contains all SQL schema definitions for the frontier database.

/// SQL schema for the database
pub const SCHEMA_SQL: &str = r#"
-- Discovered URLs awaiting promotion; id order is enqueue order
CREATE TABLE IF NOT EXISTS queue (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    url TEXT NOT NULL,
    enqueued_at TEXT NOT NULL
);

-- One row per processed, non-duplicate page
CREATE TABLE IF NOT EXISTS visited (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    url_hash TEXT NOT NULL UNIQUE,
    url TEXT NOT NULL,
    fingerprint TEXT NOT NULL,
    visited_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_visited_fingerprint ON visited(fingerprint);
"#;

/// Initializes the database schema
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}
