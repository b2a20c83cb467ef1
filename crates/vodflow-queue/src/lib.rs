//! Transcode job queue.
//!
//! This crate provides:
//! - `TranscodeQueue`: deduplicated in-memory pending set, one consumer
//! - `RecoverySync`: startup and periodic reconciliation with the store
//! - `JobIntake`: producer-side submission of uploaded videos

pub mod intake;
pub mod queue;
pub mod sync;

pub use intake::JobIntake;
pub use queue::TranscodeQueue;
pub use sync::RecoverySync;
