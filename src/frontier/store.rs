//! Bounded in-memory frontier and its monitor
//!
//! The memory queue is only ever touched under `state`. Two signals make up
//! the rest of the monitor:
//!
//! - `refilled` is broadcast by the producer after a refill and wakes every
//!   suspended worker; each woken worker re-checks emptiness, since several
//!   may race for the same entries.
//! - `drained` is raised by a worker that finds the frontier empty and wakes
//!   the producer. It keeps a permit when the producer is busy, so the
//!   request is not lost.
//!
//! No durable store call is made while `state` is held.

use crate::frontier::{DurableQueue, SeedSource, UrlHash, VisitedRegistry};
use crate::Result;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;

/// A URL ready to fetch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrontierEntry {
    pub url: String,
    pub hash: UrlHash,
}

impl FrontierEntry {
    pub fn new(url: String) -> Self {
        let hash = UrlHash::of(&url);
        Self { url, hash }
    }
}

/// Frontier sizing and wait bounds
#[derive(Debug, Clone, Copy)]
pub struct FrontierSettings {
    /// Entries promoted from the durable queue per refill
    pub capacity: usize,

    /// Longest single suspension before state is re-checked
    pub wait_timeout: Duration,
}

impl Default for FrontierSettings {
    fn default() -> Self {
        Self {
            capacity: 40,
            wait_timeout: Duration::from_secs(5),
        }
    }
}

#[derive(Default)]
struct FrontierState {
    entries: VecDeque<String>,
    cold_start_checked: bool,
}

/// Bounded in-memory frontier shared by the producer and all workers
pub struct FrontierStore {
    state: Mutex<FrontierState>,
    refilled: Notify,
    drained: Notify,
    queue: DurableQueue,
    registry: Arc<VisitedRegistry>,
    seeds: Arc<dyn SeedSource>,
    settings: FrontierSettings,
}

impl FrontierStore {
    pub fn new(
        queue: DurableQueue,
        registry: Arc<VisitedRegistry>,
        seeds: Arc<dyn SeedSource>,
        settings: FrontierSettings,
    ) -> Self {
        Self {
            state: Mutex::new(FrontierState::default()),
            refilled: Notify::new(),
            drained: Notify::new(),
            queue,
            registry,
            seeds,
            settings,
        }
    }

    fn lock(&self) -> MutexGuard<'_, FrontierState> {
        // The state is a plain queue; a panicking holder cannot leave it torn
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn registry(&self) -> &Arc<VisitedRegistry> {
        &self.registry
    }

    /// Durably appends discovered URLs; they reach memory only by promotion
    pub async fn enqueue_batch(&self, urls: &[String]) -> Result<usize> {
        self.queue.enqueue_many(urls).await
    }

    /// Promotes entries into the memory queue
    ///
    /// Draws up to `capacity` of the oldest durable entries. The first call
    /// of a process, when both the durable queue and the registry are empty,
    /// loads the whole seed list into memory instead.
    ///
    /// # Returns
    ///
    /// The number of entries added to memory
    pub async fn refill(&self) -> Result<usize> {
        let first_call = !std::mem::replace(&mut self.lock().cold_start_checked, true);

        let urls = if first_call
            && self.queue.is_empty().await?
            && self.registry.count().await? == 0
        {
            let seeds = self.seeds.seeds()?;
            tracing::info!("Cold start: loading {} seed URLs", seeds.len());
            seeds
        } else {
            self.queue.take_oldest(self.settings.capacity).await?
        };

        let added = urls.len();
        if added > 0 {
            self.lock().entries.extend(urls);
        }
        Ok(added)
    }

    /// Pops the next URL not yet visited
    ///
    /// Visited entries are discarded without re-enqueue. Returns `None` once
    /// the memory queue is exhausted.
    pub async fn dequeue(&self) -> Result<Option<FrontierEntry>> {
        loop {
            let Some(url) = self.lock().entries.pop_front() else {
                return Ok(None);
            };

            let entry = FrontierEntry::new(url);
            if self.registry.contains_url(&entry.hash).await? {
                tracing::trace!("Discarding visited URL {}", entry.url);
                continue;
            }
            return Ok(Some(entry));
        }
    }

    /// Puts an entry taken by [`dequeue`](Self::dequeue) back at the head
    pub fn return_entry(&self, entry: FrontierEntry) {
        self.lock().entries.push_front(entry.url);
    }

    /// Moves everything still in memory back to the durable queue
    ///
    /// Called at shutdown so promoted but unfetched URLs survive a restart.
    pub async fn spill(&self) -> Result<usize> {
        let urls: Vec<String> = self.lock().entries.drain(..).collect();
        if urls.is_empty() {
            return Ok(0);
        }
        self.queue.enqueue_many(&urls).await
    }

    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().entries.is_empty()
    }

    /// Worker suspension point
    ///
    /// Returns `true` once the frontier is non-empty, `false` if cancelled.
    /// While empty, asks the producer for a refill and sleeps until the
    /// next broadcast, re-checking at least every `wait_timeout`.
    pub async fn wait_for_work(&self, cancel: &CancellationToken) -> bool {
        loop {
            if cancel.is_cancelled() {
                return false;
            }

            let notified = self.refilled.notified();
            tokio::pin!(notified);
            // Register before checking so a broadcast in between is not missed
            notified.as_mut().enable();

            if !self.is_empty() {
                return true;
            }
            self.drained.notify_one();

            tokio::select! {
                _ = cancel.cancelled() => return false,
                _ = &mut notified => {}
                _ = tokio::time::sleep(self.settings.wait_timeout) => {}
            }
        }
    }

    /// Producer suspension point
    ///
    /// Returns `true` when a worker reports the frontier drained or the wait
    /// times out, `false` if cancelled.
    pub async fn wait_until_drained(&self, cancel: &CancellationToken) -> bool {
        tokio::select! {
            _ = cancel.cancelled() => false,
            _ = self.drained.notified() => true,
            _ = tokio::time::sleep(self.settings.wait_timeout) => true,
        }
    }

    /// Wakes every suspended worker
    pub fn broadcast_refill(&self) {
        self.refilled.notify_waiters();
    }
}
