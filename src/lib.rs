//! Ripple Frontier: a crawl frontier and deduplication engine
//!
//! This crate decides which URL to fetch next, keeps URLs and near-duplicate
//! pages from being processed twice, and coordinates several concurrent fetch
//! workers against a bounded in-memory frontier backed by a durable SQLite
//! overflow queue.

pub mod archive;
pub mod config;
pub mod crawler;
pub mod frontier;
pub mod output;
pub mod storage;

use thiserror::Error;

/// Main error type for Ripple Frontier operations
#[derive(Debug, Error)]
pub enum FrontierError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("Archive error: {0}")]
    Archive(#[from] archive::ArchiveError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Seed source error: {0}")]
    Seeds(String),

    #[error("Task {task} failed: {message}")]
    Task { task: String, message: String },
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Result type alias for Ripple Frontier operations
pub type Result<T> = std::result::Result<T, FrontierError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{Coordinator, CrawlReport};
pub use frontier::{FrontierStore, UrlHash};
