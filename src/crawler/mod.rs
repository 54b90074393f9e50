//! Crawler module for web page fetching and processing
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching
//! - HTML parsing, link extraction and content fingerprinting
//! - The worker loop and the supervising coordinator

mod coordinator;
mod fetcher;
mod fingerprint;
mod parser;
mod worker;

pub use coordinator::Coordinator;
pub use fetcher::{build_http_client, fetch_url, FetchResult, HttpFetcher, PageFetcher};
pub use fingerprint::{fingerprint, own_text};
pub use parser::{parse_html, ParsedPage};
pub use worker::{CrawlCounters, CrawlReport, CrawlWorker, PageOutcome};

use crate::config::Config;
use crate::Result;
use tokio_util::sync::CancellationToken;

/// Runs a complete crawl operation
///
/// This is the main entry point for starting a crawl. It will:
/// 1. Open the durable store (cleared first when `fresh`)
/// 2. Build the HTTP fetcher and document archiver
/// 3. Run the frontier producer and the crawl workers until `cancel` fires
/// 4. Return the unfetched frontier to the durable queue
///
/// # Returns
///
/// * `Ok(CrawlReport)` - Totals for the run
/// * `Err(FrontierError)` - A task failed or initialization failed
pub async fn crawl(config: &Config, fresh: bool, cancel: CancellationToken) -> Result<CrawlReport> {
    Coordinator::new(config, fresh)?.run(cancel).await
}
