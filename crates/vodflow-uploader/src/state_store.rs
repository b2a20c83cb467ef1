//! Persisted fingerprint → upload-progress mapping.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tokio::sync::Mutex;
use tracing::debug;

use vodflow_models::{UploadFingerprint, UploadState};

use crate::error::UploadResult;

/// Client-local store of partial upload progress, one JSON file.
///
/// Every acknowledged chunk rewrites the entry for its fingerprint;
/// completion or discard deletes it, so the file only ever holds uploads
/// that are genuinely resumable. Survives app restarts; that persistence is
/// the whole point.
pub struct FingerprintStore {
    path: PathBuf,
    entries: Mutex<HashMap<UploadFingerprint, UploadState>>,
}

impl FingerprintStore {
    /// Open the store at `path`, loading any existing entries.
    pub async fn open(path: impl AsRef<Path>) -> UploadResult<Self> {
        let path = path.as_ref().to_path_buf();
        let entries = match tokio::fs::read(&path).await {
            Ok(bytes) => serde_json::from_slice(&bytes)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => HashMap::new(),
            Err(e) => return Err(e.into()),
        };

        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    /// Look up prior progress for a fingerprint.
    pub async fn get(&self, fingerprint: &UploadFingerprint) -> Option<UploadState> {
        self.entries.lock().await.get(fingerprint).cloned()
    }

    /// Record progress for a fingerprint and persist.
    pub async fn put(
        &self,
        fingerprint: UploadFingerprint,
        state: UploadState,
    ) -> UploadResult<()> {
        let mut entries = self.entries.lock().await;
        entries.insert(fingerprint, state);
        self.persist(&entries).await
    }

    /// Drop the entry for a fingerprint and persist.
    pub async fn remove(&self, fingerprint: &UploadFingerprint) -> UploadResult<()> {
        let mut entries = self.entries.lock().await;
        if entries.remove(fingerprint).is_some() {
            debug!(fingerprint = %fingerprint, "Cleared upload state entry");
            self.persist(&entries).await?;
        }
        Ok(())
    }

    /// Number of tracked partial uploads.
    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }

    async fn persist(&self, entries: &HashMap<UploadFingerprint, UploadState>) -> UploadResult<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let bytes = serde_json::to_vec_pretty(entries)?;
        tokio::fs::write(&self.path, bytes).await?;
        Ok(())
    }
}
