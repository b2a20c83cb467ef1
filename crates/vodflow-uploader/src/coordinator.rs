//! Resume-or-restart decisions for selected files.

use std::io::SeekFrom;
use std::path::Path;
use std::sync::Arc;

use tokio::io::{AsyncReadExt, AsyncSeekExt};
use tracing::{info, warn};

use vodflow_models::{UploadFingerprint, UploadState, VideoId};

use crate::error::UploadResult;
use crate::fingerprint::fingerprint_file;
use crate::state_store::FingerprintStore;
use crate::transport::{RemoteVideo, UploadTransport};

/// Default transfer chunk size (4 MiB).
pub const DEFAULT_CHUNK_SIZE: usize = 4 * 1024 * 1024;

/// What to do with a newly selected file.
#[derive(Debug)]
pub enum UploadPlan {
    /// No usable prior state; a new upload session is needed.
    Fresh {
        fingerprint: UploadFingerprint,
        total_size: u64,
    },
    /// A prior partial upload exists server-side. The caller chooses
    /// between [`ResumeCoordinator::resume`] and
    /// [`ResumeCoordinator::discard_and_restart`].
    Resumable {
        fingerprint: UploadFingerprint,
        total_size: u64,
        video: RemoteVideo,
        bytes_uploaded: u64,
    },
}

/// Drives resumable uploads against the transport, keeping the
/// [`FingerprintStore`] in sync with every server acknowledgment.
pub struct ResumeCoordinator {
    transport: Arc<dyn UploadTransport>,
    store: Arc<FingerprintStore>,
    chunk_size: usize,
}

impl ResumeCoordinator {
    pub fn new(transport: Arc<dyn UploadTransport>, store: Arc<FingerprintStore>) -> Self {
        Self {
            transport,
            store,
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }

    /// Override the transfer chunk size.
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    /// Fingerprint `path` and decide whether its upload can resume.
    ///
    /// A state entry whose remote video has been deleted is cleared here and
    /// the flow falls back to a fresh upload; staleness is detected, not
    /// prevented.
    pub async fn prepare(&self, path: &Path) -> UploadResult<UploadPlan> {
        let (fingerprint, total_size) = fingerprint_file(path).await?;

        let Some(state) = self.store.get(&fingerprint).await else {
            return Ok(UploadPlan::Fresh {
                fingerprint,
                total_size,
            });
        };

        match self.transport.get_video(&state.video_id).await {
            Ok(video) => {
                info!(
                    video_id = %video.video_id,
                    bytes_uploaded = state.bytes_uploaded,
                    "Found resumable upload"
                );
                Ok(UploadPlan::Resumable {
                    fingerprint,
                    total_size,
                    video,
                    bytes_uploaded: state.bytes_uploaded,
                })
            }
            Err(e) if e.is_not_found() => {
                warn!(
                    video_id = %state.video_id,
                    "Stored upload state references a deleted video, starting over"
                );
                self.store.remove(&fingerprint).await?;
                Ok(UploadPlan::Fresh {
                    fingerprint,
                    total_size,
                })
            }
            Err(e) => Err(e),
        }
    }

    /// Start a brand-new upload session and transfer the whole file.
    pub async fn upload_fresh(
        &self,
        path: &Path,
        title: &str,
        fingerprint: UploadFingerprint,
        total_size: u64,
    ) -> UploadResult<VideoId> {
        let video_id = self
            .transport
            .start_upload(&fingerprint, title, total_size)
            .await?;
        // Persist before the first chunk so a crash right here still resumes.
        self.store
            .put(
                fingerprint.clone(),
                UploadState::new(video_id.clone(), 0),
            )
            .await?;

        self.transfer(path, &fingerprint, &video_id, 0, total_size)
            .await?;
        Ok(video_id)
    }

    /// Continue a prior upload from its acknowledged offset.
    ///
    /// Only the remaining bytes are transmitted; nothing the server already
    /// acknowledged is re-sent.
    pub async fn resume(
        &self,
        path: &Path,
        fingerprint: UploadFingerprint,
        video_id: VideoId,
        bytes_uploaded: u64,
        total_size: u64,
    ) -> UploadResult<VideoId> {
        info!(
            video_id = %video_id,
            from_offset = bytes_uploaded,
            "Resuming upload"
        );
        self.transfer(path, &fingerprint, &video_id, bytes_uploaded, total_size)
            .await?;
        Ok(video_id)
    }

    /// Throw away the prior partial upload and start fresh.
    pub async fn discard_and_restart(
        &self,
        path: &Path,
        title: &str,
        fingerprint: UploadFingerprint,
        total_size: u64,
    ) -> UploadResult<VideoId> {
        self.store.remove(&fingerprint).await?;
        self.upload_fresh(path, title, fingerprint, total_size).await
    }

    /// Chunk loop: read from `offset`, send, persist each acknowledged
    /// offset, finalize, and clear the state entry.
    async fn transfer(
        &self,
        path: &Path,
        fingerprint: &UploadFingerprint,
        video_id: &VideoId,
        offset: u64,
        total_size: u64,
    ) -> UploadResult<()> {
        let mut file = tokio::fs::File::open(path).await?;
        file.seek(SeekFrom::Start(offset)).await?;

        let mut buf = vec![0u8; self.chunk_size];
        let mut offset = offset;

        while offset < total_size {
            let n = file.read(&mut buf).await?;
            if n == 0 {
                break;
            }

            let acked = self
                .transport
                .upload_chunk(video_id, offset, &buf[..n])
                .await?;
            // The server's offset is authoritative; re-align the read
            // position if it acknowledged more or less than this chunk.
            if acked != offset + n as u64 {
                file.seek(SeekFrom::Start(acked)).await?;
            }
            offset = acked;
            self.store
                .put(
                    fingerprint.clone(),
                    UploadState::new(video_id.clone(), offset),
                )
                .await?;
        }

        self.transport.complete(video_id).await?;
        self.store.remove(fingerprint).await?;
        info!(video_id = %video_id, bytes = total_size, "Upload complete");
        Ok(())
    }
}
