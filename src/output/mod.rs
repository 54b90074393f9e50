//! Output module for reporting on the durable crawl state
//!
//! This module handles:
//! - Summarizing the durable queue and visited registry
//! - Printing those statistics for the `--stats` command

pub mod stats;

pub use stats::{load_statistics, print_statistics, CrawlStatistics};
