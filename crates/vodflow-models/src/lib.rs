//! Shared data models for the Vodflow backend.
//!
//! This crate provides Serde-serializable types for:
//! - Videos and their processing lifecycle
//! - Delivery quality renditions
//! - Upload fingerprints and resumable-upload state

pub mod quality;
pub mod upload;
pub mod video;

// Re-export common types
pub use quality::DeliveryQuality;
pub use upload::{UploadFingerprint, UploadState};
pub use video::{VideoId, VideoRecord, VideoStatus};
