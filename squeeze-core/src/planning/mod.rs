//! Stream planning
//!
//! Decides, for every stream of a probed file, whether it is copied or
//! re-encoded, and which container the converted file is written to.
//!
//! - video streams are re-encoded
//! - raw PCM audio is re-encoded, compressed audio is copied
//! - everything else (subtitles, attachments, data) is copied untouched
//!
//! A plain `[video, audio]` file is always written as Matroska; any other
//! layout keeps the source container.

use std::fmt;
use std::path::Path;

use log::{debug, info, warn};
use serde::Serialize;

use crate::error::{Result, SqueezeError};
use crate::media::{MediaProbe, StreamInfo, StreamType, stream_infos};
use crate::utils::file_extension;

/// What happens to one input stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeDecision {
    Copy,
    TranscodeVideo,
    TranscodeAudio,
    /// Stream type the planner does not know; copied as-is.
    Unknown,
}

impl ChangeDecision {
    /// Whether the stream goes through an encoder.
    pub fn transcodes(self) -> bool {
        matches!(self, ChangeDecision::TranscodeVideo | ChangeDecision::TranscodeAudio)
    }
}

impl fmt::Display for ChangeDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChangeDecision::Copy => write!(f, "copy"),
            ChangeDecision::TranscodeVideo => write!(f, "transcode video"),
            ChangeDecision::TranscodeAudio => write!(f, "transcode audio"),
            ChangeDecision::Unknown => write!(f, "unknown (copy)"),
        }
    }
}

/// Containers a converted file can be written to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Container {
    Matroska,
    WebM,
    Ogg,
    Opus,
    Mp4,
    Mov,
    M4a,
    M4v,
    Avi,
    MpegTs,
    Flv,
}

impl Container {
    /// Looks up a container by file extension (case-insensitive, no dot).
    pub fn from_extension(extension: &str) -> Option<Self> {
        let container = match extension.to_ascii_lowercase().as_str() {
            "mkv" => Container::Matroska,
            "webm" => Container::WebM,
            "ogg" => Container::Ogg,
            "opus" => Container::Opus,
            "mp4" => Container::Mp4,
            "mov" => Container::Mov,
            "m4a" => Container::M4a,
            "m4v" => Container::M4v,
            "avi" => Container::Avi,
            "ts" => Container::MpegTs,
            "flv" => Container::Flv,
            _ => return None,
        };
        Some(container)
    }

    /// Extension used for the converted file.
    pub fn extension(self) -> &'static str {
        match self {
            Container::Matroska => "mkv",
            Container::WebM => "webm",
            Container::Ogg => "ogg",
            Container::Opus => "opus",
            Container::Mp4 => "mp4",
            Container::Mov => "mov",
            Container::M4a => "m4a",
            Container::M4v => "m4v",
            Container::Avi => "avi",
            Container::MpegTs => "ts",
            Container::Flv => "flv",
        }
    }
}

impl fmt::Display for Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.extension())
    }
}

/// Decision for one stream, in input order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StreamDecision {
    pub index: usize,
    pub stream_type: StreamType,
    pub codec_name: String,
    pub decision: ChangeDecision,
}

/// Per-stream decisions and the target container for one file.
///
/// Built once by [`StreamPlanner::plan`] and read-only afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConversionPlan {
    decisions: Vec<StreamDecision>,
    container: Container,
}

impl ConversionPlan {
    pub fn decisions(&self) -> &[StreamDecision] {
        &self.decisions
    }

    pub fn container(&self) -> Container {
        self.container
    }

    pub fn has_video(&self) -> bool {
        self.decisions.iter().any(|d| d.decision == ChangeDecision::TranscodeVideo)
    }

    pub fn transcoded_streams(&self) -> usize {
        self.decisions.iter().filter(|d| d.decision.transcodes()).count()
    }
}

impl fmt::Display for ConversionPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Container: {}", self.container)?;
        for d in &self.decisions {
            let codec = if d.codec_name.is_empty() { "?" } else { d.codec_name.as_str() };
            writeln!(f, "  #{} {} ({}): {}", d.index, d.stream_type, codec, d.decision)?;
        }
        Ok(())
    }
}

/// Builds a [`ConversionPlan`] from a probe.
#[derive(Debug, Clone, Copy, Default)]
pub struct StreamPlanner;

impl StreamPlanner {
    pub fn new() -> Self {
        Self
    }

    /// Plans the conversion of `source`, whose probe is `probe`.
    ///
    /// Fails with [`SqueezeError::UnsupportedLayout`] when the probe has no
    /// streams, or when the source container has to be kept but its
    /// extension names no known container.
    pub fn plan(&self, probe: &MediaProbe, source: &Path) -> Result<ConversionPlan> {
        let streams = stream_infos(probe);
        if streams.is_empty() {
            return Err(SqueezeError::UnsupportedLayout(format!(
                "{} has no streams",
                source.display()
            )));
        }

        let layout: Vec<StreamType> = streams.iter().map(|s| s.codec_type).collect();
        if !matches!(layout.as_slice(), [StreamType::Video] | [StreamType::Video, StreamType::Audio]) {
            warn!(
                "Unexpected stream layout [{}] in {}",
                layout.iter().map(ToString::to_string).collect::<Vec<_>>().join(", "),
                source.display()
            );
        }

        let container = select_container(&layout, source)?;
        let decisions: Vec<StreamDecision> = streams.iter().map(decide).collect();
        for d in &decisions {
            debug!("Stream {} ({} {}): {}", d.index, d.stream_type, d.codec_name, d.decision);
        }

        let plan = ConversionPlan { decisions, container };
        info!(
            "Planned {} stream(s), {} to transcode, container {}",
            plan.decisions.len(),
            plan.transcoded_streams(),
            plan.container
        );
        Ok(plan)
    }
}

fn decide(stream: &StreamInfo) -> StreamDecision {
    let decision = match stream.codec_type {
        StreamType::Video => ChangeDecision::TranscodeVideo,
        StreamType::Audio if stream.is_raw_audio() => ChangeDecision::TranscodeAudio,
        StreamType::Audio => ChangeDecision::Copy,
        _ => ChangeDecision::Unknown,
    };
    StreamDecision {
        index: stream.index,
        stream_type: stream.codec_type,
        codec_name: stream.codec_name.clone(),
        decision,
    }
}

fn select_container(layout: &[StreamType], source: &Path) -> Result<Container> {
    let video = layout.iter().filter(|t| **t == StreamType::Video).count();
    let audio = layout.iter().filter(|t| **t == StreamType::Audio).count();
    if layout.len() == 2 && video == 1 && audio == 1 {
        return Ok(Container::Matroska);
    }

    let extension = file_extension(source).unwrap_or_default();
    Container::from_extension(&extension).ok_or_else(|| {
        SqueezeError::UnsupportedLayout(format!(
            "cannot keep container of {}: unknown extension '{extension}'",
            source.display()
        ))
    })
}
