//! Upload transport contract.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use vodflow_models::{UploadFingerprint, VideoId};

use crate::error::{UploadError, UploadResult};

/// Remote view of a video as the upload endpoint reports it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteVideo {
    pub video_id: VideoId,
    pub title: String,
    /// Bytes the server has durably accepted.
    pub uploaded_size: u64,
}

/// Server side of the chunked upload protocol.
///
/// The returned offset of `upload_chunk` is authoritative: the client
/// persists whatever the server acknowledges, never its own bookkeeping.
#[async_trait]
pub trait UploadTransport: Send + Sync {
    /// Open a new upload session; returns the remote video ID.
    async fn start_upload(
        &self,
        fingerprint: &UploadFingerprint,
        title: &str,
        total_size: u64,
    ) -> UploadResult<VideoId>;

    /// Send one chunk at `offset`; returns the server's new offset.
    async fn upload_chunk(
        &self,
        video_id: &VideoId,
        offset: u64,
        chunk: &[u8],
    ) -> UploadResult<u64>;

    /// Fetch the remote video record. Fails with `NotFound` if it was
    /// deleted since the prior session.
    async fn get_video(&self, video_id: &VideoId) -> UploadResult<RemoteVideo>;

    /// Finalize the upload.
    async fn complete(&self, video_id: &VideoId) -> UploadResult<()>;
}

#[derive(Serialize)]
struct StartUploadRequest<'a> {
    fingerprint: &'a str,
    title: &'a str,
    total_size: u64,
}

#[derive(Deserialize)]
struct StartUploadResponse {
    video_id: VideoId,
}

#[derive(Deserialize)]
struct ChunkResponse {
    uploaded_size: u64,
}

/// HTTP upload transport against the ingest endpoint.
pub struct HttpUploadTransport {
    client: reqwest::Client,
    base_url: String,
}

impl HttpUploadTransport {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    fn check_status(status: reqwest::StatusCode, context: &str) -> UploadResult<()> {
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(UploadError::not_found(context.to_string()));
        }
        if !status.is_success() {
            return Err(UploadError::rejected(format!("{}: {}", context, status)));
        }
        Ok(())
    }
}

#[async_trait]
impl UploadTransport for HttpUploadTransport {
    async fn start_upload(
        &self,
        fingerprint: &UploadFingerprint,
        title: &str,
        total_size: u64,
    ) -> UploadResult<VideoId> {
        let url = format!("{}/videos", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(&StartUploadRequest {
                fingerprint: fingerprint.as_str(),
                title,
                total_size,
            })
            .send()
            .await
            .map_err(|e| UploadError::transport(e.to_string()))?;

        Self::check_status(response.status(), "start upload")?;
        let body: StartUploadResponse = response
            .json()
            .await
            .map_err(|e| UploadError::transport(e.to_string()))?;
        Ok(body.video_id)
    }

    async fn upload_chunk(
        &self,
        video_id: &VideoId,
        offset: u64,
        chunk: &[u8],
    ) -> UploadResult<u64> {
        let url = format!("{}/videos/{}/content", self.base_url, video_id);
        let response = self
            .client
            .put(&url)
            .header("Upload-Offset", offset)
            .body(chunk.to_vec())
            .send()
            .await
            .map_err(|e| UploadError::transport(e.to_string()))?;

        Self::check_status(response.status(), video_id.as_str())?;
        let body: ChunkResponse = response
            .json()
            .await
            .map_err(|e| UploadError::transport(e.to_string()))?;
        Ok(body.uploaded_size)
    }

    async fn get_video(&self, video_id: &VideoId) -> UploadResult<RemoteVideo> {
        let url = format!("{}/videos/{}", self.base_url, video_id);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| UploadError::transport(e.to_string()))?;

        Self::check_status(response.status(), video_id.as_str())?;
        response
            .json()
            .await
            .map_err(|e| UploadError::transport(e.to_string()))
    }

    async fn complete(&self, video_id: &VideoId) -> UploadResult<()> {
        let url = format!("{}/videos/{}/complete", self.base_url, video_id);
        let response = self
            .client
            .post(&url)
            .send()
            .await
            .map_err(|e| UploadError::transport(e.to_string()))?;

        Self::check_status(response.status(), video_id.as_str())
    }
}
