//! Video metadata models.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for an uploaded video.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct VideoId(pub String);

impl VideoId {
    /// Generate a new random video ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Create from an existing string.
    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Get the inner string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for VideoId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for VideoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for VideoId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for VideoId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Video processing status.
///
/// `Pending` means the upload finished and the video is waiting for the
/// transcode worker. `Processing` and `Failed` are cleared back to `Pending`
/// by operator action or the startup recovery sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum VideoStatus {
    /// Upload in progress, not yet eligible for transcoding
    #[default]
    Uploading,
    /// Upload complete, waiting in the transcode queue
    Pending,
    /// A worker is transcoding the video
    Processing,
    /// All delivery renditions produced
    Ready,
    /// Transcoding failed
    Failed,
}

impl VideoStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            VideoStatus::Uploading => "uploading",
            VideoStatus::Pending => "pending",
            VideoStatus::Processing => "processing",
            VideoStatus::Ready => "ready",
            VideoStatus::Failed => "failed",
        }
    }

    /// Terminal states are never picked up by reconciliation.
    pub fn is_terminal(&self) -> bool {
        matches!(self, VideoStatus::Ready | VideoStatus::Failed)
    }
}

impl fmt::Display for VideoStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Video record held by the durable store.
///
/// The store is the source of truth for the transcode pipeline: the in-memory
/// queue is rebuilt from records whose status is `Pending` after a restart.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct VideoRecord {
    /// Unique video ID
    pub video_id: VideoId,

    /// Owner user ID
    pub user_id: String,

    /// Display title
    pub title: String,

    /// Processing status
    #[serde(default)]
    pub status: VideoStatus,

    /// Total size of the source file in bytes
    #[serde(default)]
    pub total_size: u64,

    /// Bytes received so far (equals `total_size` once the upload completes)
    #[serde(default)]
    pub uploaded_size: u64,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last update timestamp
    pub updated_at: DateTime<Utc>,

    /// Completion timestamp
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,

    /// Failure timestamp
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failed_at: Option<DateTime<Utc>>,

    /// Error message (if failed)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl VideoRecord {
    /// Create a new record for an upload that just started.
    pub fn new(
        video_id: VideoId,
        user_id: impl Into<String>,
        title: impl Into<String>,
        total_size: u64,
    ) -> Self {
        let now = Utc::now();

        Self {
            video_id,
            user_id: user_id.into(),
            title: title.into(),
            status: VideoStatus::Uploading,
            total_size,
            uploaded_size: 0,
            created_at: now,
            updated_at: now,
            completed_at: None,
            failed_at: None,
            error_message: None,
        }
    }

    /// Mark the upload finished and eligible for transcoding.
    pub fn uploaded(mut self) -> Self {
        self.status = VideoStatus::Pending;
        self.uploaded_size = self.total_size;
        self.updated_at = Utc::now();
        self
    }

    /// Mark as ready (all renditions produced).
    pub fn complete(mut self) -> Self {
        self.status = VideoStatus::Ready;
        self.completed_at = Some(Utc::now());
        self.updated_at = Utc::now();
        self
    }

    /// Mark as failed.
    pub fn fail(mut self, error: impl Into<String>) -> Self {
        self.status = VideoStatus::Failed;
        self.failed_at = Some(Utc::now());
        self.error_message = Some(error.into());
        self.updated_at = Utc::now();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_video_id_generation() {
        let id1 = VideoId::new();
        let id2 = VideoId::new();
        assert_ne!(id1, id2);
    }

    #[test]
    fn test_record_lifecycle() {
        let id = VideoId::new();
        let record = VideoRecord::new(id.clone(), "user123", "Test Video", 1024);
        assert_eq!(record.status, VideoStatus::Uploading);
        assert_eq!(record.uploaded_size, 0);

        let record = record.uploaded();
        assert_eq!(record.status, VideoStatus::Pending);
        assert_eq!(record.uploaded_size, 1024);

        let record = record.complete();
        assert_eq!(record.status, VideoStatus::Ready);
        assert!(record.completed_at.is_some());
    }

    #[test]
    fn test_failed_record_keeps_error() {
        let record = VideoRecord::new(VideoId::new(), "user123", "Broken", 10)
            .uploaded()
            .fail("codec not supported");

        assert_eq!(record.status, VideoStatus::Failed);
        assert_eq!(record.error_message.as_deref(), Some("codec not supported"));
        assert!(record.status.is_terminal());
    }
}
