//! Resumable-upload state models.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::VideoId;

/// Stable identifier for a file's content.
///
/// Rendered as `"{size}:{sha256-hex}"`. The same unmodified file always
/// produces the same fingerprint; files differing in size or content produce
/// different fingerprints with overwhelming probability. Used as the lookup
/// key when deciding whether a newly selected file can resume a prior
/// partial upload.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct UploadFingerprint(pub String);

impl UploadFingerprint {
    /// Build a fingerprint from a file size and a hex-encoded content digest.
    pub fn new(size: u64, digest_hex: impl AsRef<str>) -> Self {
        Self(format!("{}:{}", size, digest_hex.as_ref()))
    }

    /// Get the inner string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UploadFingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for UploadFingerprint {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Progress of a partially transferred upload, persisted client-side.
///
/// The entry lives from the first acknowledged chunk until the upload
/// completes or the user discards the resume offer. It may reference a video
/// the server has since deleted; that staleness is detected at resume time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct UploadState {
    /// Remote video this upload feeds
    pub video_id: VideoId,
    /// Bytes acknowledged by the server so far
    pub bytes_uploaded: u64,
}

impl UploadState {
    pub fn new(video_id: VideoId, bytes_uploaded: u64) -> Self {
        Self {
            video_id,
            bytes_uploaded,
        }
    }
}
