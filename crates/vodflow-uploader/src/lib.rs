//! Resumable chunked upload client.
//!
//! This crate provides:
//! - Content fingerprinting (`size:sha256`) for resume lookup
//! - `FingerprintStore`: persisted partial-upload progress
//! - `ResumeCoordinator`: resume / restart / discard decisions and the
//!   chunk transfer loop
//! - The `UploadTransport` contract with an HTTP implementation

pub mod coordinator;
pub mod error;
pub mod fingerprint;
pub mod state_store;
pub mod transport;

pub use coordinator::{ResumeCoordinator, UploadPlan, DEFAULT_CHUNK_SIZE};
pub use error::{UploadError, UploadResult};
pub use fingerprint::fingerprint_file;
pub use state_store::FingerprintStore;
pub use transport::{HttpUploadTransport, RemoteVideo, UploadTransport};
