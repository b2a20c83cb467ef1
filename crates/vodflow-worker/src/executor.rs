//! Single-consumer worker loop.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::{error, info, warn};

use vodflow_models::{VideoId, VideoStatus};
use vodflow_queue::{RecoverySync, TranscodeQueue};
use vodflow_store::VideoStore;

use crate::config::WorkerConfig;
use crate::error::WorkerResult;
use crate::transcoder::Transcoder;

/// Drains the transcode queue, one job at a time.
///
/// The loop never dies with a job: a failed transcode is recorded as
/// `Failed` in the store and the next job is picked up. Enqueues keep
/// landing while a job is processing; only this loop consumes.
pub struct WorkerLoop {
    config: WorkerConfig,
    store: Arc<dyn VideoStore>,
    queue: Arc<TranscodeQueue>,
    transcoder: Arc<dyn Transcoder>,
    shutdown: watch::Sender<bool>,
}

impl WorkerLoop {
    pub fn new(
        config: WorkerConfig,
        store: Arc<dyn VideoStore>,
        queue: Arc<TranscodeQueue>,
        transcoder: Arc<dyn Transcoder>,
    ) -> Self {
        let (shutdown, _) = watch::channel(false);
        Self {
            config,
            store,
            queue,
            transcoder,
            shutdown,
        }
    }

    /// Handle for requesting a graceful stop.
    pub fn shutdown_handle(&self) -> watch::Sender<bool> {
        self.shutdown.clone()
    }

    /// Run until shutdown.
    ///
    /// The startup recovery pass completes before the first dequeue, so a
    /// restarted worker never begins with a spuriously empty queue. The
    /// periodic reconciliation runs as an independent task and never waits
    /// on job processing.
    pub async fn run(&self) -> WorkerResult<()> {
        info!(
            "Starting worker loop (idle poll: {:?}, reconcile: {:?})",
            self.config.idle_poll_interval, self.config.reconcile_interval
        );

        let sync = Arc::new(RecoverySync::new(
            Arc::clone(&self.store),
            Arc::clone(&self.queue),
            self.config.reconcile_interval,
        ));
        sync.recover_on_startup().await?;

        let sync_task = {
            let sync = Arc::clone(&sync);
            let shutdown_rx = self.shutdown.subscribe();
            tokio::spawn(async move {
                sync.run(shutdown_rx).await;
            })
        };

        let mut shutdown_rx = self.shutdown.subscribe();

        loop {
            if *shutdown_rx.borrow() {
                break;
            }

            match self.queue.try_dequeue().await {
                Some(video_id) => {
                    // The job left the working set at dequeue; a concurrent
                    // reconciliation only brings it back if the store still
                    // says pending.
                    self.process_one(video_id).await;
                }
                None => {
                    tokio::select! {
                        _ = shutdown_rx.changed() => {
                            if *shutdown_rx.borrow() {
                                break;
                            }
                        }
                        _ = tokio::time::sleep(self.config.idle_poll_interval) => {}
                    }
                }
            }
        }

        info!("Worker loop stopping");
        sync_task.abort();
        Ok(())
    }

    /// Transcode one video, recording the outcome in the store.
    async fn process_one(&self, video_id: VideoId) {
        info!(video_id = %video_id, "Processing video");

        if let Err(e) = self
            .store
            .set_status(&video_id, VideoStatus::Processing)
            .await
        {
            // Record vanished or store hiccup; reconciliation will re-derive
            // whatever is still true.
            warn!(video_id = %video_id, "Could not mark processing: {}", e);
            return;
        }

        let input = self.store.source_path(&video_id);
        let output_dir = self.config.output_dir.join(video_id.as_str());

        match self.transcoder.transcode(&input, &output_dir).await {
            Ok(outputs) => {
                info!(
                    video_id = %video_id,
                    renditions = outputs.len(),
                    "Transcode complete"
                );
                if let Err(e) = self.store.set_status(&video_id, VideoStatus::Ready).await {
                    error!(video_id = %video_id, "Could not mark ready: {}", e);
                }
            }
            Err(e) => {
                error!(video_id = %video_id, "Transcode failed: {}", e);
                if let Err(store_err) = self.store.fail(&video_id, &e.to_string()).await {
                    error!(video_id = %video_id, "Could not record failure: {}", store_err);
                }
            }
        }
    }
}
