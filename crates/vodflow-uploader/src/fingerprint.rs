//! Content fingerprinting for upload resume.

use std::path::Path;

use sha2::{Digest, Sha256};
use tokio::io::AsyncReadExt;

use vodflow_models::UploadFingerprint;

use crate::error::UploadResult;

/// Read size for the digest loop.
const DIGEST_BUF_SIZE: usize = 1024 * 1024;

/// Fingerprint a file by size and content digest.
///
/// Returns the fingerprint and the file size. The digest streams the whole
/// file, so the fingerprint changes whenever the content does; the embedded
/// size makes same-digest-different-length collisions impossible.
pub async fn fingerprint_file(path: &Path) -> UploadResult<(UploadFingerprint, u64)> {
    let mut file = tokio::fs::File::open(path).await?;
    let mut hasher = Sha256::new();
    let mut buf = vec![0u8; DIGEST_BUF_SIZE];
    let mut size: u64 = 0;

    loop {
        let n = file.read(&mut buf).await?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
        size += n as u64;
    }

    let digest = hasher.finalize();
    Ok((UploadFingerprint::new(size, format!("{:x}", digest)), size))
}
