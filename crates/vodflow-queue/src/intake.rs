//! Producer-side intake for completed uploads.

use std::sync::Arc;

use tracing::info;

use vodflow_models::{VideoId, VideoStatus};
use vodflow_store::{StoreResult, VideoStore};

use crate::queue::TranscodeQueue;

/// Hands freshly uploaded videos to the transcode pipeline.
///
/// The durable status transition comes first, so a crash between the two
/// steps loses nothing: the next reconciliation pass finds the pending
/// record and enqueues it.
pub struct JobIntake {
    store: Arc<dyn VideoStore>,
    queue: Arc<TranscodeQueue>,
}

impl JobIntake {
    pub fn new(store: Arc<dyn VideoStore>, queue: Arc<TranscodeQueue>) -> Self {
        Self { store, queue }
    }

    /// Mark an upload-complete video pending and queue it for the worker.
    pub async fn submit(&self, video_id: &VideoId) -> StoreResult<()> {
        self.store.set_status(video_id, VideoStatus::Pending).await?;
        self.queue.enqueue(video_id.clone()).await;
        info!(video_id = %video_id, "Video submitted for transcoding");
        Ok(())
    }
}
