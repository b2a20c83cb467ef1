//! Worker error types.

use thiserror::Error;

pub type WorkerResult<T> = Result<T, WorkerError>;

#[derive(Debug, Error)]
pub enum WorkerError {
    #[error("Transcode failed: {0}")]
    TranscodeFailed(String),

    #[error("ffmpeg binary not found in PATH")]
    FfmpegNotFound,

    #[error("Source file missing: {0}")]
    SourceMissing(String),

    #[error("Store error: {0}")]
    Store(#[from] vodflow_store::StoreError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl WorkerError {
    pub fn transcode_failed(msg: impl Into<String>) -> Self {
        Self::TranscodeFailed(msg.into())
    }

    pub fn source_missing(path: impl Into<String>) -> Self {
        Self::SourceMissing(path.into())
    }
}
