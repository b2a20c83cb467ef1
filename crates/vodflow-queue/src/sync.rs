//! Queue recovery from the durable store.
//!
//! The in-memory queue dies with the process; the durable store does not.
//! `RecoverySync` re-derives the queue from the store on startup and
//! periodically thereafter. Both passes are idempotent: enqueue ignores
//! duplicates, so re-running reconciliation at any time is harmless.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::interval;
use tracing::{error, info, warn};

use vodflow_models::VideoStatus;
use vodflow_store::{StoreResult, VideoStore};

use crate::queue::TranscodeQueue;

/// Reconciles the in-memory queue with the durable store.
pub struct RecoverySync {
    store: Arc<dyn VideoStore>,
    queue: Arc<TranscodeQueue>,
    period: Duration,
}

impl RecoverySync {
    /// Create a sync task reconciling every `period`.
    pub fn new(store: Arc<dyn VideoStore>, queue: Arc<TranscodeQueue>, period: Duration) -> Self {
        Self {
            store,
            queue,
            period,
        }
    }

    /// Startup recovery pass. Must complete before the worker loop starts
    /// dequeuing.
    ///
    /// Nothing can be in flight when the process starts, so records stuck at
    /// `Processing` are leftovers of a crash: they are reset to `Pending`
    /// and re-queued along with everything else unfinished.
    pub async fn recover_on_startup(&self) -> StoreResult<usize> {
        let unfinished = self.store.list_unfinished_ids().await?;
        let mut recovered = 0usize;

        for video_id in unfinished {
            let record = self.store.get(&video_id).await?;
            if record.status == VideoStatus::Processing {
                warn!(
                    video_id = %video_id,
                    "Video stuck at processing from a previous run, resetting to pending"
                );
                self.store.set_status(&video_id, VideoStatus::Pending).await?;
            }
            self.queue.enqueue(video_id).await;
            recovered += 1;
        }

        info!("Startup recovery enqueued {} unfinished videos", recovered);
        Ok(recovered)
    }

    /// One reconciliation pass: enqueue every video the store reports as
    /// pending. Safe to run at any time, any number of times.
    pub async fn reconcile_from_store(&self) -> StoreResult<usize> {
        let pending = self.store.list_pending_ids().await?;
        let count = pending.len();

        for video_id in pending {
            self.queue.enqueue(video_id).await;
        }

        Ok(count)
    }

    /// Periodic reconciliation loop. Spawn as a background task; it only
    /// enqueues and never blocks on the worker.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        info!("Starting queue recovery sync (period: {:?})", self.period);

        let mut ticker = interval(self.period);
        // The immediate first tick would duplicate the startup pass.
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = shutdown.changed() => {
                    if *shutdown.borrow() {
                        info!("Recovery sync stopping");
                        break;
                    }
                }
                _ = ticker.tick() => {
                    match self.reconcile_from_store().await {
                        Ok(count) if count > 0 => {
                            info!("Reconciliation pass enqueued {} pending videos", count);
                        }
                        Ok(_) => {}
                        Err(e) => {
                            error!("Reconciliation pass failed: {}", e);
                        }
                    }
                }
            }
        }
    }
}
