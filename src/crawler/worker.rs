//! Crawl worker: the fetch, dedup, expand, archive loop

use crate::archive::DocumentArchiver;
use crate::crawler::fetcher::{FetchResult, PageFetcher};
use crate::crawler::parser::parse_html;
use crate::frontier::{FrontierEntry, FrontierStore};
use crate::Result;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use url::Url;

/// What happened to one dequeued URL
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageOutcome {
    /// Registered, links enqueued and archived
    Processed,
    /// Registered and links enqueued, but the archive write failed
    ArchiveFailed,
    /// URL or content already registered; nothing else done
    Duplicate,
    /// Fetch failed or was not markup; the URL is dropped
    FetchFailed,
}

/// Counters shared by every worker of a run
#[derive(Debug, Default)]
pub struct CrawlCounters {
    fetched: AtomicU64,
    fetch_failures: AtomicU64,
    duplicates: AtomicU64,
    archived: AtomicU64,
    archive_failures: AtomicU64,
    links_enqueued: AtomicU64,
}

impl CrawlCounters {
    fn record(&self, outcome: PageOutcome) {
        let counter = match outcome {
            PageOutcome::Processed => &self.archived,
            PageOutcome::ArchiveFailed => &self.archive_failures,
            PageOutcome::Duplicate => &self.duplicates,
            PageOutcome::FetchFailed => &self.fetch_failures,
        };
        counter.fetch_add(1, Ordering::Relaxed);
        if outcome != PageOutcome::FetchFailed {
            self.fetched.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn snapshot(&self) -> CrawlReport {
        CrawlReport {
            fetched: self.fetched.load(Ordering::Relaxed),
            fetch_failures: self.fetch_failures.load(Ordering::Relaxed),
            duplicates: self.duplicates.load(Ordering::Relaxed),
            archived: self.archived.load(Ordering::Relaxed),
            archive_failures: self.archive_failures.load(Ordering::Relaxed),
            links_enqueued: self.links_enqueued.load(Ordering::Relaxed),
        }
    }
}

/// Totals for a finished (or cancelled) run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CrawlReport {
    /// Pages successfully fetched as markup
    pub fetched: u64,
    /// URLs dropped because the fetch failed
    pub fetch_failures: u64,
    /// Fetched pages rejected as already seen
    pub duplicates: u64,
    /// Pages registered and archived
    pub archived: u64,
    /// Pages registered whose archive write failed
    pub archive_failures: u64,
    /// Links handed to the durable queue
    pub links_enqueued: u64,
}

impl CrawlReport {
    /// Pages newly added to the visited registry
    pub fn registered(&self) -> u64 {
        self.archived + self.archive_failures
    }
}

impl fmt::Display for CrawlReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Pages fetched:        {}", self.fetched)?;
        writeln!(f, "Fetch failures:       {}", self.fetch_failures)?;
        writeln!(f, "Duplicates skipped:   {}", self.duplicates)?;
        writeln!(f, "Pages archived:       {}", self.archived)?;
        writeln!(f, "Archive failures:     {}", self.archive_failures)?;
        write!(f, "Links enqueued:       {}", self.links_enqueued)
    }
}

/// One of the N concurrent crawl workers
pub struct CrawlWorker {
    id: usize,
    frontier: Arc<FrontierStore>,
    fetcher: Arc<dyn PageFetcher>,
    archiver: Arc<dyn DocumentArchiver>,
    counters: Arc<CrawlCounters>,
}

impl CrawlWorker {
    pub fn new(
        id: usize,
        frontier: Arc<FrontierStore>,
        fetcher: Arc<dyn PageFetcher>,
        archiver: Arc<dyn DocumentArchiver>,
        counters: Arc<CrawlCounters>,
    ) -> Self {
        Self {
            id,
            frontier,
            fetcher,
            archiver,
            counters,
        }
    }

    /// Runs until cancelled or a durable store operation fails for good
    pub async fn run(self, cancel: CancellationToken) -> Result<()> {
        tracing::debug!("Worker {} started", self.id);
        let mut handled: u64 = 0;

        while self.frontier.wait_for_work(&cancel).await {
            let Some(entry) = self.frontier.dequeue().await? else {
                continue;
            };

            let fetched = tokio::select! {
                _ = cancel.cancelled() => None,
                result = self.fetcher.fetch(&entry.url) => Some(result),
            };
            let Some(fetched) = fetched else {
                self.frontier.return_entry(entry);
                break;
            };

            let outcome = self.handle(&entry, fetched).await?;
            self.counters.record(outcome);

            handled += 1;
            if handled % 10 == 0 {
                tracing::info!(
                    "Worker {}: {} URLs handled, {} in frontier",
                    self.id,
                    handled,
                    self.frontier.len()
                );
            }
        }

        tracing::debug!("Worker {} stopped after {} URLs", self.id, handled);
        Ok(())
    }

    /// Processes one fetch result
    ///
    /// Registration is atomic, so when two workers race on the same URL or
    /// the same content only one of them enqueues links and archives.
    pub async fn handle(&self, entry: &FrontierEntry, fetched: FetchResult) -> Result<PageOutcome> {
        let (final_url, body) = match fetched {
            FetchResult::Success {
                final_url, body, ..
            } => (final_url, body),
            failure => {
                tracing::debug!("Dropping {}: {}", entry.url, failure);
                return Ok(PageOutcome::FetchFailed);
            }
        };

        let base = match Url::parse(&final_url).or_else(|_| Url::parse(&entry.url)) {
            Ok(base) => base,
            Err(e) => {
                tracing::debug!("Dropping {}: unparseable URL: {}", entry.url, e);
                return Ok(PageOutcome::FetchFailed);
            }
        };
        let page = parse_html(&body, &base);

        let registry = self.frontier.registry();
        if registry.contains_url(&entry.hash).await?
            || registry.contains_fingerprint(&page.fingerprint).await?
        {
            tracing::debug!("Skipping duplicate {}", entry.url);
            return Ok(PageOutcome::Duplicate);
        }
        if !registry
            .record_visited(&entry.url, &entry.hash, &page.fingerprint)
            .await?
        {
            tracing::debug!("Lost registration race for {}", entry.url);
            return Ok(PageOutcome::Duplicate);
        }

        if !page.links.is_empty() {
            let enqueued = self.frontier.enqueue_batch(&page.links).await?;
            self.counters
                .links_enqueued
                .fetch_add(enqueued as u64, Ordering::Relaxed);
        }

        match self.archiver.archive(&entry.url, &page.rendered).await {
            Ok(()) => Ok(PageOutcome::Processed),
            Err(e) => {
                tracing::warn!("Failed to archive {}: {}", entry.url, e);
                Ok(PageOutcome::ArchiveFailed)
            }
        }
    }
}
