//! Transcode worker.
//!
//! This crate provides:
//! - The single-consumer worker loop draining the transcode queue
//! - The `Transcoder` boundary with an ffmpeg implementation
//! - Worker configuration

pub mod config;
pub mod error;
pub mod executor;
pub mod transcoder;

pub use config::WorkerConfig;
pub use error::{WorkerError, WorkerResult};
pub use executor::WorkerLoop;
pub use transcoder::{FfmpegTranscoder, Transcoder};
