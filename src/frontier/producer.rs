//! Background task promoting durable entries into the memory frontier

use crate::frontier::FrontierStore;
use crate::Result;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// The single refill task
pub struct FrontierProducer {
    frontier: Arc<FrontierStore>,
}

impl FrontierProducer {
    pub fn new(frontier: Arc<FrontierStore>) -> Self {
        Self { frontier }
    }

    /// Runs until cancelled
    ///
    /// Refills whenever the memory frontier is empty and broadcasts to the
    /// workers when the refill added anything. Otherwise suspends until a
    /// worker reports the frontier drained (or the wait times out).
    pub async fn run(self, cancel: CancellationToken) -> Result<()> {
        tracing::info!("Frontier producer started");
        let mut promoted: u64 = 0;

        while !cancel.is_cancelled() {
            if self.frontier.is_empty() {
                let added = self.frontier.refill().await?;
                if added > 0 {
                    promoted += added as u64;
                    tracing::debug!(
                        "Promoted {} URLs into the frontier ({} total)",
                        added,
                        promoted
                    );
                    self.frontier.broadcast_refill();
                    continue;
                }
            }

            if !self.frontier.wait_until_drained(&cancel).await {
                break;
            }
        }

        tracing::info!("Frontier producer stopped after promoting {} URLs", promoted);
        Ok(())
    }
}
