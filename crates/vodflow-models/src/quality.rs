//! Delivery quality renditions.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Default video codec (H.264)
pub const DEFAULT_VIDEO_CODEC: &str = "libx264";
/// Default audio codec
pub const DEFAULT_AUDIO_CODEC: &str = "aac";
/// Default encoding preset
pub const DEFAULT_PRESET: &str = "fast";
/// Default audio bitrate
pub const DEFAULT_AUDIO_BITRATE: &str = "128k";

/// A delivery rendition produced by the transcode worker.
///
/// Every uploaded video is transcoded once per ladder rung.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryQuality {
    /// 1920x1080, primary rendition
    Fhd1080,
    /// 1280x720
    Hd720,
    /// 854x480, bandwidth-constrained clients
    Sd480,
}

impl DeliveryQuality {
    /// The full ladder, highest quality first.
    pub fn ladder() -> &'static [DeliveryQuality] {
        &[
            DeliveryQuality::Fhd1080,
            DeliveryQuality::Hd720,
            DeliveryQuality::Sd480,
        ]
    }

    /// Output frame height in pixels.
    pub fn height(&self) -> u32 {
        match self {
            DeliveryQuality::Fhd1080 => 1080,
            DeliveryQuality::Hd720 => 720,
            DeliveryQuality::Sd480 => 480,
        }
    }

    /// Target video bitrate for the rendition.
    pub fn video_bitrate(&self) -> &'static str {
        match self {
            DeliveryQuality::Fhd1080 => "5000k",
            DeliveryQuality::Hd720 => "2800k",
            DeliveryQuality::Sd480 => "1200k",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DeliveryQuality::Fhd1080 => "1080p",
            DeliveryQuality::Hd720 => "720p",
            DeliveryQuality::Sd480 => "480p",
        }
    }
}

impl fmt::Display for DeliveryQuality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ladder_is_descending() {
        let heights: Vec<u32> = DeliveryQuality::ladder().iter().map(|q| q.height()).collect();
        let mut sorted = heights.clone();
        sorted.sort_unstable_by(|a, b| b.cmp(a));
        assert_eq!(heights, sorted);
    }

    #[test]
    fn test_quality_labels() {
        assert_eq!(DeliveryQuality::Fhd1080.as_str(), "1080p");
        assert_eq!(DeliveryQuality::Sd480.height(), 480);
    }
}
