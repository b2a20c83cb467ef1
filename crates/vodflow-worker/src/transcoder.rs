//! Transcode operation boundary.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, info};

use vodflow_models::quality::{
    DEFAULT_AUDIO_BITRATE, DEFAULT_AUDIO_CODEC, DEFAULT_PRESET, DEFAULT_VIDEO_CODEC,
};
use vodflow_models::DeliveryQuality;

use crate::error::{WorkerError, WorkerResult};

/// The opaque transcode operation: raw source in, renditions out.
///
/// The worker loop only cares about success or failure; everything about
/// codecs and containers stays behind this trait.
#[async_trait]
pub trait Transcoder: Send + Sync {
    /// Produce all delivery renditions for `input` under `output_dir`.
    async fn transcode(&self, input: &Path, output_dir: &Path) -> WorkerResult<Vec<PathBuf>>;
}

/// Transcoder shelling out to ffmpeg, one run per ladder rung.
pub struct FfmpegTranscoder {
    qualities: Vec<DeliveryQuality>,
}

impl FfmpegTranscoder {
    /// Transcode to the full default ladder.
    pub fn new() -> Self {
        Self {
            qualities: DeliveryQuality::ladder().to_vec(),
        }
    }

    /// Restrict the ladder (e.g. for low-powered hosts).
    pub fn with_qualities(qualities: Vec<DeliveryQuality>) -> Self {
        Self { qualities }
    }

    /// Argument list for one rendition.
    fn build_args(input: &Path, output: &Path, quality: DeliveryQuality) -> Vec<String> {
        vec![
            "-y".to_string(),
            "-v".to_string(),
            "error".to_string(),
            "-i".to_string(),
            input.to_string_lossy().to_string(),
            "-c:v".to_string(),
            DEFAULT_VIDEO_CODEC.to_string(),
            "-preset".to_string(),
            DEFAULT_PRESET.to_string(),
            "-b:v".to_string(),
            quality.video_bitrate().to_string(),
            "-vf".to_string(),
            format!("scale=-2:{}", quality.height()),
            "-c:a".to_string(),
            DEFAULT_AUDIO_CODEC.to_string(),
            "-b:a".to_string(),
            DEFAULT_AUDIO_BITRATE.to_string(),
            "-movflags".to_string(),
            "+faststart".to_string(),
            output.to_string_lossy().to_string(),
        ]
    }
}

impl Default for FfmpegTranscoder {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transcoder for FfmpegTranscoder {
    async fn transcode(&self, input: &Path, output_dir: &Path) -> WorkerResult<Vec<PathBuf>> {
        which::which("ffmpeg").map_err(|_| WorkerError::FfmpegNotFound)?;

        if !input.exists() {
            return Err(WorkerError::source_missing(input.to_string_lossy()));
        }
        tokio::fs::create_dir_all(output_dir).await?;

        let mut outputs = Vec::with_capacity(self.qualities.len());

        for quality in &self.qualities {
            let output = output_dir.join(format!("{}.mp4", quality));
            let args = Self::build_args(input, &output, *quality);
            debug!("Running ffmpeg {}", args.join(" "));

            let result = Command::new("ffmpeg")
                .args(&args)
                .stdin(Stdio::null())
                .output()
                .await?;

            if !result.status.success() {
                let stderr = String::from_utf8_lossy(&result.stderr);
                return Err(WorkerError::transcode_failed(format!(
                    "ffmpeg exited with {} for {} rendition: {}",
                    result.status,
                    quality,
                    stderr.trim()
                )));
            }

            info!(rendition = %quality, output = %output.display(), "Rendition produced");
            outputs.push(output);
        }

        Ok(outputs)
    }
}
