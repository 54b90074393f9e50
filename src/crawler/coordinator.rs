//! Crawler coordinator - supervises one crawl run
//!
//! This module wires the frontier, registry, fetcher and archiver together
//! and owns the task lifecycle:
//! - Opening (and optionally clearing) the durable store
//! - Spawning the frontier producer and the crawl workers
//! - Cancelling everything on interrupt or on the first task failure
//! - Returning unfetched frontier entries to the durable queue at shutdown

use crate::archive::{DocumentArchiver, FileArchiver};
use crate::config::Config;
use crate::crawler::fetcher::{HttpFetcher, PageFetcher};
use crate::crawler::worker::{CrawlCounters, CrawlReport, CrawlWorker};
use crate::frontier::{
    DurableQueue, FrontierProducer, FrontierSettings, FrontierStore, SeedList, SeedSource,
    VisitedRegistry,
};
use crate::storage::{lock_storage, open_storage, RetryPolicy, SharedStorage, Storage};
use crate::{FrontierError, Result};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

/// Main crawler coordinator structure
pub struct Coordinator {
    storage: SharedStorage,
    frontier: Arc<FrontierStore>,
    fetcher: Arc<dyn PageFetcher>,
    archiver: Arc<dyn DocumentArchiver>,
    workers: usize,
}

impl Coordinator {
    /// Creates a new coordinator instance
    ///
    /// # Arguments
    ///
    /// * `config` - The crawler configuration
    /// * `fresh` - Whether to start a fresh crawl (clears queue and registry)
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Successfully created coordinator
    /// * `Err(FrontierError)` - Failed to initialize
    pub fn new(config: &Config, fresh: bool) -> Result<Self> {
        let storage = open_storage(Path::new(&config.storage.database_path))?;

        if fresh {
            tracing::info!("Clearing durable queue and visited registry");
            lock_storage(&storage)?.clear()?;
        }

        let retry = RetryPolicy::new(
            config.storage.max_retries,
            Duration::from_millis(config.storage.retry_backoff_ms),
        );
        let settings = FrontierSettings {
            capacity: config.crawler.frontier_capacity,
            wait_timeout: config.crawler.wait_timeout(),
        };
        let fetcher = HttpFetcher::from_config(&config.user_agent, &config.fetch)?;
        let archiver = FileArchiver::new(&config.archive.documents_dir)?;

        Ok(Self::with_components(
            storage,
            retry,
            settings,
            Arc::new(SeedList::from_config(&config.seeds)),
            Arc::new(fetcher),
            Arc::new(archiver),
            config.crawler.workers,
        ))
    }

    /// Assembles a coordinator from already-built parts
    pub fn with_components(
        storage: SharedStorage,
        retry: RetryPolicy,
        settings: FrontierSettings,
        seeds: Arc<dyn SeedSource>,
        fetcher: Arc<dyn PageFetcher>,
        archiver: Arc<dyn DocumentArchiver>,
        workers: usize,
    ) -> Self {
        let queue = DurableQueue::new(storage.clone(), retry);
        let registry = Arc::new(VisitedRegistry::new(storage.clone(), retry));
        let frontier = Arc::new(FrontierStore::new(queue, registry, seeds, settings));

        Self {
            storage,
            frontier,
            fetcher,
            archiver,
            workers: workers.max(1),
        }
    }

    pub fn frontier(&self) -> &Arc<FrontierStore> {
        &self.frontier
    }

    pub fn storage(&self) -> &SharedStorage {
        &self.storage
    }

    /// Runs the producer and all workers until `cancel` fires
    ///
    /// If any task fails, the others are cancelled and the first error is
    /// returned once every task has stopped. Either way the memory frontier
    /// is spilled back to the durable queue before returning.
    pub async fn run(self, cancel: CancellationToken) -> Result<CrawlReport> {
        tracing::info!("Starting crawl with {} workers", self.workers);

        let counters = Arc::new(CrawlCounters::default());
        let mut tasks = JoinSet::new();

        let producer = FrontierProducer::new(Arc::clone(&self.frontier));
        let token = cancel.clone();
        tasks.spawn(async move { ("producer".to_string(), producer.run(token).await) });

        for id in 0..self.workers {
            let worker = CrawlWorker::new(
                id,
                Arc::clone(&self.frontier),
                Arc::clone(&self.fetcher),
                Arc::clone(&self.archiver),
                Arc::clone(&counters),
            );
            let token = cancel.clone();
            tasks.spawn(async move { (format!("worker {}", id), worker.run(token).await) });
        }

        let mut failure: Option<FrontierError> = None;
        while let Some(joined) = tasks.join_next().await {
            let error = match joined {
                Ok((_, Ok(()))) => continue,
                Ok((task, Err(e))) => {
                    tracing::error!("Task {} failed: {}", task, e);
                    e
                }
                Err(e) => {
                    tracing::error!("Crawl task panicked: {}", e);
                    FrontierError::Task {
                        task: "crawl".to_string(),
                        message: e.to_string(),
                    }
                }
            };
            if failure.is_none() {
                cancel.cancel();
                failure = Some(error);
            }
        }

        let spilled = self.frontier.spill().await;
        let report = counters.snapshot();

        if let Some(e) = failure {
            return Err(e);
        }
        let spilled = spilled?;
        if spilled > 0 {
            tracing::info!("Returned {} unfetched URLs to the durable queue", spilled);
        }

        tracing::info!(
            "Crawl stopped: {} pages registered, {} duplicates, {} fetch failures",
            report.registered(),
            report.duplicates,
            report.fetch_failures
        );
        Ok(report)
    }
}
