use serde::Deserialize;
use std::time::Duration;

/// Main configuration structure for Ripple Frontier
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    #[serde(default)]
    pub fetch: FetchConfig,
    pub storage: StorageConfig,
    #[serde(default)]
    pub archive: ArchiveConfig,
    #[serde(default)]
    pub seeds: SeedConfig,
}

/// Worker pool and frontier sizing
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Number of concurrent crawl workers
    #[serde(default = "default_workers")]
    pub workers: usize,

    /// Maximum number of entries promoted into memory per refill
    #[serde(rename = "frontier-capacity", default = "default_frontier_capacity")]
    pub frontier_capacity: usize,

    /// Upper bound on a single suspension before state is re-checked (milliseconds)
    #[serde(rename = "wait-timeout-ms", default = "default_wait_timeout_ms")]
    pub wait_timeout_ms: u64,
}

impl CrawlerConfig {
    pub fn wait_timeout(&self) -> Duration {
        Duration::from_millis(self.wait_timeout_ms)
    }
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            workers: default_workers(),
            frontier_capacity: default_frontier_capacity(),
            wait_timeout_ms: default_wait_timeout_ms(),
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url")]
    pub contact_url: String,

    /// Email address for crawler-related contact
    #[serde(rename = "contact-email")]
    pub contact_email: String,
}

impl UserAgentConfig {
    /// Formats the header value: `CrawlerName/Version (+ContactURL; ContactEmail)`
    pub fn header_value(&self) -> String {
        format!(
            "{}/{} (+{}; {})",
            self.crawler_name, self.crawler_version, self.contact_url, self.contact_email
        )
    }
}

/// HTTP fetch behaviour
#[derive(Debug, Clone, Deserialize)]
pub struct FetchConfig {
    #[serde(rename = "timeout-secs", default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(rename = "connect-timeout-secs", default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,

    /// Redirect hops followed before the fetch is treated as failed
    #[serde(rename = "max-redirects", default = "default_max_redirects")]
    pub max_redirects: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
            max_redirects: default_max_redirects(),
        }
    }
}

/// Durable store location and retry policy
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Path to the SQLite database file
    #[serde(rename = "database-path")]
    pub database_path: String,

    /// Retries attempted for transient store failures
    #[serde(rename = "max-retries", default = "default_max_retries")]
    pub max_retries: u32,

    /// Base backoff between retries (milliseconds), doubled per attempt
    #[serde(rename = "retry-backoff-ms", default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,
}

/// Where archived page bodies are written
#[derive(Debug, Clone, Deserialize)]
pub struct ArchiveConfig {
    #[serde(rename = "documents-dir", default = "default_documents_dir")]
    pub documents_dir: String,
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        Self {
            documents_dir: default_documents_dir(),
        }
    }
}

/// Cold-start seed URLs
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SeedConfig {
    /// Inline seed URLs, in crawl order
    #[serde(default)]
    pub urls: Vec<String>,

    /// Optional newline-delimited seed file, appended after `urls`
    #[serde(default)]
    pub file: Option<String>,
}

fn default_workers() -> usize {
    2
}

fn default_frontier_capacity() -> usize {
    40
}

fn default_wait_timeout_ms() -> u64 {
    5_000
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_connect_timeout_secs() -> u64 {
    10
}

fn default_max_redirects() -> usize {
    10
}

fn default_max_retries() -> u32 {
    3
}

fn default_retry_backoff_ms() -> u64 {
    200
}

fn default_documents_dir() -> String {
    "./Documents".to_string()
}
