//! Durable video store contract.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::info;

use vodflow_models::{VideoId, VideoRecord, VideoStatus};

use crate::error::{StoreError, StoreResult};

/// Source of truth for video records.
///
/// The transcode queue is only a transient cache of `Pending` records; after
/// a restart the queue is rebuilt from this store. The production
/// implementation is backed by the relational database; `InMemoryVideoStore`
/// below serves tests and local wiring.
#[async_trait]
pub trait VideoStore: Send + Sync {
    /// Fetch a record by ID.
    async fn get(&self, video_id: &VideoId) -> StoreResult<VideoRecord>;

    /// Insert a new record.
    async fn insert(&self, record: VideoRecord) -> StoreResult<()>;

    /// List IDs of videos waiting for the worker (status `Pending`).
    async fn list_pending_ids(&self) -> StoreResult<Vec<VideoId>>;

    /// List IDs of videos whose processing never finished
    /// (status `Pending` or `Processing`). Used by the startup recovery
    /// sweep, when nothing can be legitimately in flight.
    async fn list_unfinished_ids(&self) -> StoreResult<Vec<VideoId>>;

    /// Transition a record to a new status.
    async fn set_status(&self, video_id: &VideoId, status: VideoStatus) -> StoreResult<()>;

    /// Mark a record failed with an error message.
    async fn fail(&self, video_id: &VideoId, error: &str) -> StoreResult<()>;

    /// Resolve the on-disk location of a video's raw uploaded content.
    ///
    /// The path is derived deterministically from the ID so the worker can
    /// find the source without any extra lookup.
    fn source_path(&self, video_id: &VideoId) -> PathBuf;
}

/// In-memory `VideoStore` used by tests and local wiring.
pub struct InMemoryVideoStore {
    records: RwLock<HashMap<VideoId, VideoRecord>>,
    ingest_root: PathBuf,
}

impl InMemoryVideoStore {
    /// Create a store resolving source files under `ingest_root`.
    pub fn new(ingest_root: impl AsRef<Path>) -> Self {
        Self {
            records: RwLock::new(HashMap::new()),
            ingest_root: ingest_root.as_ref().to_path_buf(),
        }
    }

    /// Number of records held (test helper).
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl VideoStore for InMemoryVideoStore {
    async fn get(&self, video_id: &VideoId) -> StoreResult<VideoRecord> {
        self.records
            .read()
            .await
            .get(video_id)
            .cloned()
            .ok_or_else(|| StoreError::not_found(video_id.as_str()))
    }

    async fn insert(&self, record: VideoRecord) -> StoreResult<()> {
        let mut records = self.records.write().await;
        if records.contains_key(&record.video_id) {
            return Err(StoreError::AlreadyExists(record.video_id.to_string()));
        }
        info!(video_id = %record.video_id, "Created video record");
        records.insert(record.video_id.clone(), record);
        Ok(())
    }

    async fn list_pending_ids(&self) -> StoreResult<Vec<VideoId>> {
        let records = self.records.read().await;
        Ok(records
            .values()
            .filter(|r| r.status == VideoStatus::Pending)
            .map(|r| r.video_id.clone())
            .collect())
    }

    async fn list_unfinished_ids(&self) -> StoreResult<Vec<VideoId>> {
        let records = self.records.read().await;
        Ok(records
            .values()
            .filter(|r| matches!(r.status, VideoStatus::Pending | VideoStatus::Processing))
            .map(|r| r.video_id.clone())
            .collect())
    }

    async fn set_status(&self, video_id: &VideoId, status: VideoStatus) -> StoreResult<()> {
        let mut records = self.records.write().await;
        let record = records
            .get_mut(video_id)
            .ok_or_else(|| StoreError::not_found(video_id.as_str()))?;
        record.status = status;
        record.updated_at = chrono::Utc::now();
        if status == VideoStatus::Ready {
            record.completed_at = Some(record.updated_at);
        }
        Ok(())
    }

    async fn fail(&self, video_id: &VideoId, error: &str) -> StoreResult<()> {
        let mut records = self.records.write().await;
        let record = records
            .get_mut(video_id)
            .ok_or_else(|| StoreError::not_found(video_id.as_str()))?;
        let now = chrono::Utc::now();
        record.status = VideoStatus::Failed;
        record.error_message = Some(error.to_string());
        record.failed_at = Some(now);
        record.updated_at = now;
        Ok(())
    }

    fn source_path(&self, video_id: &VideoId) -> PathBuf {
        self.ingest_root.join(format!("{}.src", video_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(status: VideoStatus) -> VideoRecord {
        let mut r = VideoRecord::new(VideoId::new(), "user1", "clip", 100);
        r.status = status;
        r
    }

    #[tokio::test]
    async fn test_pending_listing_excludes_other_states() {
        let store = InMemoryVideoStore::new("/tmp/ingest");
        let pending = record(VideoStatus::Pending);
        let pending_id = pending.video_id.clone();

        store.insert(pending).await.unwrap();
        store.insert(record(VideoStatus::Processing)).await.unwrap();
        store.insert(record(VideoStatus::Ready)).await.unwrap();
        store.insert(record(VideoStatus::Uploading)).await.unwrap();

        let ids = store.list_pending_ids().await.unwrap();
        assert_eq!(ids, vec![pending_id]);

        let unfinished = store.list_unfinished_ids().await.unwrap();
        assert_eq!(unfinished.len(), 2);
    }

    #[tokio::test]
    async fn test_fail_records_error() {
        let store = InMemoryVideoStore::new("/tmp/ingest");
        let r = record(VideoStatus::Processing);
        let id = r.video_id.clone();
        store.insert(r).await.unwrap();

        store.fail(&id, "ffmpeg exited with status 1").await.unwrap();

        let r = store.get(&id).await.unwrap();
        assert_eq!(r.status, VideoStatus::Failed);
        assert_eq!(r.error_message.as_deref(), Some("ffmpeg exited with status 1"));
    }

    #[tokio::test]
    async fn test_source_path_is_deterministic() {
        let store = InMemoryVideoStore::new("/data/ingest");
        let id = VideoId::from_string("abc");
        assert_eq!(store.source_path(&id), store.source_path(&id));
        assert!(store.source_path(&id).ends_with("abc.src"));
    }

    #[tokio::test]
    async fn test_duplicate_insert_rejected() {
        let store = InMemoryVideoStore::new("/tmp/ingest");
        let r = record(VideoStatus::Pending);
        store.insert(r.clone()).await.unwrap();
        assert!(matches!(
            store.insert(r).await,
            Err(StoreError::AlreadyExists(_))
        ));
    }
}
