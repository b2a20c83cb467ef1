//! Upload error types.

use thiserror::Error;

/// Result type for upload operations.
pub type UploadResult<T> = Result<T, UploadError>;

/// Errors that can occur during resumable uploads.
#[derive(Debug, Error)]
pub enum UploadError {
    /// The referenced remote video no longer exists (deleted server-side).
    /// The resume flow treats this as "start fresh", never as fatal.
    #[error("Video not found: {0}")]
    NotFound(String),

    /// Network failure talking to the upload endpoint. Transient; callers
    /// retry at the chunk level.
    #[error("Upload transport error: {0}")]
    Transport(String),

    #[error("Upload rejected: {0}")]
    Rejected(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl UploadError {
    pub fn not_found(id: impl Into<String>) -> Self {
        Self::NotFound(id.into())
    }

    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    pub fn rejected(msg: impl Into<String>) -> Self {
        Self::Rejected(msg.into())
    }

    /// True when the referenced remote video is gone and local state for it
    /// should be dropped.
    pub fn is_not_found(&self) -> bool {
        matches!(self, UploadError::NotFound(_))
    }
}
