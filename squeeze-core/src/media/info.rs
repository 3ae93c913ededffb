use std::fmt;

use serde::{Deserialize, Serialize};

use crate::media::probe::{MediaProbe, ProbeValue};

/// Media stream types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StreamType {
    Video,
    Audio,
    Subtitle,
    Attachment,
    Data,
    Unknown,
}

impl From<&str> for StreamType {
    fn from(s: &str) -> Self {
        match s {
            "video" => StreamType::Video,
            "audio" => StreamType::Audio,
            "subtitle" => StreamType::Subtitle,
            "attachment" => StreamType::Attachment,
            "data" => StreamType::Data,
            _ => StreamType::Unknown,
        }
    }
}

impl fmt::Display for StreamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StreamType::Video => write!(f, "video"),
            StreamType::Audio => write!(f, "audio"),
            StreamType::Subtitle => write!(f, "subtitle"),
            StreamType::Attachment => write!(f, "attachment"),
            StreamType::Data => write!(f, "data"),
            StreamType::Unknown => write!(f, "unknown"),
        }
    }
}

/// The fields of a probed stream that planning looks at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamInfo {
    /// Position in the probe's stream list
    pub index: usize,

    /// Stream type
    pub codec_type: StreamType,

    /// Codec name, empty when the prober did not report one
    pub codec_name: String,
}

impl StreamInfo {
    /// Raw PCM audio (`pcm_s16le`, `pcm_s24be`, ...).
    pub fn is_raw_audio(&self) -> bool {
        self.codec_type == StreamType::Audio && self.codec_name.starts_with("pcm")
    }
}

/// Typed descriptors for every stream of a probe, in probe order.
pub fn stream_infos(probe: &MediaProbe) -> Vec<StreamInfo> {
    probe
        .streams()
        .iter()
        .enumerate()
        .map(|(index, stream)| StreamInfo {
            index,
            codec_type: stream
                .get("codec_type")
                .and_then(ProbeValue::as_str)
                .map(StreamType::from)
                .unwrap_or(StreamType::Unknown),
            codec_name: stream
                .get("codec_name")
                .and_then(ProbeValue::as_str)
                .unwrap_or_default()
                .to_string(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_stream_infos() {
        let probe = MediaProbe::from_json(json!({
            "streams": [
                {"codec_type": "video", "codec_name": "h264"},
                {"codec_type": "audio", "codec_name": "pcm_s16le"},
                {"codec_type": "subtitle"},
                {"codec_name": "bin_data"}
            ]
        }))
        .unwrap();

        let infos = stream_infos(&probe);
        assert_eq!(infos.len(), 4);
        assert_eq!(infos[0].codec_type, StreamType::Video);
        assert!(infos[1].is_raw_audio());
        assert_eq!(infos[2].codec_name, "");
        assert_eq!(infos[3].codec_type, StreamType::Unknown);
        assert_eq!(
            infos.iter().map(|s| s.codec_type).collect::<Vec<_>>(),
            vec![StreamType::Video, StreamType::Audio, StreamType::Subtitle, StreamType::Unknown]
        );
    }
}
