//! Audio codec selection
//!
//! Raw PCM audio is re-encoded with a codec the target container can hold:
//! Opus for Matroska, WebM and Ogg; AAC for the MP4 family, using the
//! AudioToolbox encoder on macOS and the native ffmpeg encoder elsewhere.

use std::fmt;

use serde::Serialize;

use crate::config::EncodingConfig;
use crate::error::{Result, SqueezeError};
use crate::external::is_macos;
use crate::planning::Container;

/// Host platform, as far as encoder availability is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    MacOs,
    Other,
}

impl Platform {
    pub fn current() -> Self {
        if is_macos() { Platform::MacOs } else { Platform::Other }
    }
}

/// Audio encoder used for a re-encoded stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "encoder", rename_all = "snake_case")]
pub enum AudioCodec {
    /// `libopus`
    Opus { bitrate: String },
    /// `aac_at` in constrained VBR mode
    AudioToolboxAac { bitrate: String },
    /// ffmpeg's native `aac` with the two-loop coder
    Aac { bitrate: String },
}

impl AudioCodec {
    /// Picks the encoder for `container` on `platform`.
    pub fn select(container: Container, platform: Platform, encoding: &EncodingConfig) -> Result<Self> {
        match container {
            Container::Matroska | Container::WebM | Container::Ogg | Container::Opus => Ok(AudioCodec::Opus {
                bitrate: encoding.opus_bitrate.clone(),
            }),
            Container::Mp4 | Container::Mov | Container::M4a | Container::M4v => match platform {
                Platform::MacOs => Ok(AudioCodec::AudioToolboxAac {
                    bitrate: encoding.aac_bitrate.clone(),
                }),
                Platform::Other => Ok(AudioCodec::Aac {
                    bitrate: encoding.aac_bitrate.clone(),
                }),
            },
            other => Err(SqueezeError::UnsupportedContainer(format!(
                "no audio encoder configured for {other} output"
            ))),
        }
    }

    pub fn encoder(&self) -> &'static str {
        match self {
            AudioCodec::Opus { .. } => "libopus",
            AudioCodec::AudioToolboxAac { .. } => "aac_at",
            AudioCodec::Aac { .. } => "aac",
        }
    }

    /// Encoder arguments for output stream `index`.
    pub fn stream_args(&self, index: usize) -> Vec<String> {
        let mut args = vec![format!("-c:{index}"), self.encoder().to_string()];
        match self {
            AudioCodec::Opus { bitrate } => {
                args.extend([format!("-b:{index}"), bitrate.clone()]);
            }
            AudioCodec::AudioToolboxAac { bitrate } => {
                args.extend([
                    format!("-aac_at_mode:{index}"),
                    "cvbr".to_string(),
                    format!("-b:{index}"),
                    bitrate.clone(),
                ]);
            }
            AudioCodec::Aac { bitrate } => {
                args.extend([
                    format!("-b:{index}"),
                    bitrate.clone(),
                    format!("-aac_coder:{index}"),
                    "twoloop".to_string(),
                ]);
            }
        }
        args
    }
}

impl fmt::Display for AudioCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AudioCodec::Opus { bitrate } | AudioCodec::AudioToolboxAac { bitrate } | AudioCodec::Aac { bitrate } => {
                write!(f, "{} @ {}", self.encoder(), bitrate)
            }
        }
    }
}
