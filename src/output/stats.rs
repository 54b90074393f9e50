//! Statistics generation from crawl database
//!
//! This module provides functionality for extracting and displaying
//! frontier statistics from the storage layer.

use crate::storage::Storage;
use crate::Result;

/// Snapshot of the durable crawl state
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrawlStatistics {
    /// URLs waiting in the durable queue
    pub queued: u64,

    /// Pages in the visited registry
    pub visited: u64,

    /// Distinct content fingerprints among visited pages
    pub distinct_fingerprints: u64,

    /// URL and timestamp of the most recent visit
    pub last_visited: Option<(String, String)>,

    /// The head of the durable queue, oldest first
    pub next_up: Vec<String>,
}

/// Number of queued URLs listed in the statistics
const NEXT_UP_LIMIT: usize = 10;

/// Loads statistics from storage
///
/// # Arguments
///
/// * `storage` - The storage backend to query
///
/// # Returns
///
/// * `Ok(CrawlStatistics)` - Successfully loaded statistics
/// * `Err(FrontierError)` - Failed to query statistics
pub fn load_statistics(storage: &dyn Storage) -> Result<CrawlStatistics> {
    let last_visited = storage
        .latest_visit()?
        .map(|record| (record.url, record.visited_at));

    Ok(CrawlStatistics {
        queued: storage.count_queued()?,
        visited: storage.count_visited()?,
        distinct_fingerprints: storage.count_distinct_fingerprints()?,
        last_visited,
        next_up: storage.list_queued(NEXT_UP_LIMIT)?,
    })
}

/// Prints statistics to stdout in a formatted manner
///
/// # Arguments
///
/// * `stats` - The statistics to display
pub fn print_statistics(stats: &CrawlStatistics) {
    println!("=== Frontier Statistics ===\n");

    println!("Overview:");
    println!("  URLs queued: {}", stats.queued);
    println!("  Pages visited: {}", stats.visited);
    println!("  Distinct fingerprints: {}", stats.distinct_fingerprints);
    println!();

    if let Some((url, at)) = &stats.last_visited {
        println!("Last visit: {} at {}", url, at);
        println!();
    }

    if !stats.next_up.is_empty() {
        println!("Next Up ({} of {}):", stats.next_up.len(), stats.queued);
        for url in &stats.next_up {
            println!("  - {}", url);
        }
    }
}
