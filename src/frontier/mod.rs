//! Crawl frontier: the bounded in-memory work queue and its durable backing
//!
//! - [`DurableQueue`]: unbounded FIFO of discovered URLs in the durable store
//! - [`VisitedRegistry`]: processed URL hashes and content fingerprints
//! - [`FrontierStore`]: bounded in-memory queue plus the monitor that
//!   coordinates the producer with the crawl workers
//! - [`FrontierProducer`]: promotes durable entries (or seeds) into memory
//! - [`SeedSource`]: the cold-start URL list

mod producer;
mod queue;
mod registry;
mod seeds;
mod store;

pub use producer::FrontierProducer;
pub use queue::DurableQueue;
pub use registry::{UrlHash, VisitedRegistry};
pub use seeds::{SeedList, SeedSource};
pub use store::{FrontierEntry, FrontierSettings, FrontierStore};
