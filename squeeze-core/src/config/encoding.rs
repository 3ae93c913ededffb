//! Encoding configuration module
//!
//! Defines the encoder settings used when synthesizing the ffmpeg command.

use serde::{Deserialize, Serialize};

use super::utils::*;

/// Default x265 constant rate factor
pub const DEFAULT_CRF: u8 = 28;

/// Default x265 preset
pub const DEFAULT_PRESET: &str = "medium";

/// Default MP4/MOV video track timescale
pub const DEFAULT_TRACK_TIMESCALE: u32 = 15360;

pub const DEFAULT_OPUS_BITRATE: &str = "192k";
pub const DEFAULT_AAC_BITRATE: &str = "256k";

/// Presets accepted by libx265, fastest first
pub const X265_PRESETS: &[&str] = &[
    "ultrafast",
    "superfast",
    "veryfast",
    "faster",
    "fast",
    "medium",
    "slow",
    "slower",
    "veryslow",
    "placebo",
];

/// Encoder settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EncodingConfig {
    /// Constant rate factor for libx265 (0-51, lower is better quality)
    pub crf: u8,

    /// libx265 preset
    pub preset: String,

    /// Video track timescale written by the muxer
    pub track_timescale: u32,

    /// Bitrate for Opus re-encodes
    pub opus_bitrate: String,

    /// Bitrate for AAC re-encodes
    pub aac_bitrate: String,
}

impl Default for EncodingConfig {
    fn default() -> Self {
        Self {
            crf: get_env_u8("SQUEEZE_CRF", DEFAULT_CRF),
            preset: get_env_string("SQUEEZE_PRESET", DEFAULT_PRESET),
            track_timescale: get_env_u32("SQUEEZE_TRACK_TIMESCALE", DEFAULT_TRACK_TIMESCALE),
            opus_bitrate: get_env_string("SQUEEZE_OPUS_BITRATE", DEFAULT_OPUS_BITRATE),
            aac_bitrate: get_env_string("SQUEEZE_AAC_BITRATE", DEFAULT_AAC_BITRATE),
        }
    }
}
