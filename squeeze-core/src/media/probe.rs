//! Probe trees and the ffprobe collaborator
//!
//! A [`MediaProbe`] is an immutable snapshot of what ffprobe reports about a
//! file: a `format` record and an ordered list of stream records. The tree is
//! kept as a small closed [`ProbeValue`] variant so that every later pass
//! (flattening, planning) is a total match over known shapes.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::process::Command;

use serde_json::{Number, Value};

use crate::error::{Result, SqueezeError, collaborator_error};

/// A node of a probe tree.
#[derive(Debug, Clone, PartialEq)]
pub enum ProbeValue {
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    List(Vec<ProbeValue>),
    Map(BTreeMap<String, ProbeValue>),
}

impl ProbeValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ProbeValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Reads a numeric value, accepting both JSON numbers and the numeric
    /// strings ffprobe uses for most of its fields.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ProbeValue::Number(n) => n.as_f64(),
            ProbeValue::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }
}

impl From<Value> for ProbeValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => ProbeValue::Null,
            Value::Bool(b) => ProbeValue::Bool(b),
            Value::Number(n) => ProbeValue::Number(n),
            Value::String(s) => ProbeValue::String(s),
            Value::Array(items) => ProbeValue::List(items.into_iter().map(ProbeValue::from).collect()),
            Value::Object(fields) => ProbeValue::Map(
                fields
                    .into_iter()
                    .map(|(key, value)| (key, ProbeValue::from(value)))
                    .collect(),
            ),
        }
    }
}

impl fmt::Display for ProbeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProbeValue::Null => write!(f, "null"),
            ProbeValue::Bool(b) => write!(f, "{b}"),
            ProbeValue::Number(n) => write!(f, "{n}"),
            ProbeValue::String(s) => write!(f, "{s}"),
            ProbeValue::List(items) => write!(f, "[{} item(s)]", items.len()),
            ProbeValue::Map(fields) => write!(f, "{{{} field(s)}}", fields.len()),
        }
    }
}

/// Snapshot of a probed media file.
#[derive(Debug, Clone, PartialEq)]
pub struct MediaProbe {
    format: BTreeMap<String, ProbeValue>,
    streams: Vec<BTreeMap<String, ProbeValue>>,
}

impl MediaProbe {
    /// Builds a probe from ffprobe's JSON document.
    ///
    /// The root must be an object; `format` (if present) must be an object and
    /// `streams` (if present) a list of objects. Anything else is reported as
    /// [`SqueezeError::MalformedProbe`].
    pub fn from_json(json: Value) -> Result<Self> {
        let Value::Object(mut root) = json else {
            return Err(SqueezeError::MalformedProbe(
                "probe root is not an object".to_string(),
            ));
        };

        let format = match root.remove("format").map(ProbeValue::from) {
            None => BTreeMap::new(),
            Some(ProbeValue::Map(fields)) => fields,
            Some(other) => {
                return Err(SqueezeError::MalformedProbe(format!(
                    "'format' is not an object: {other}"
                )));
            }
        };

        let streams = match root.remove("streams").map(ProbeValue::from) {
            None => Vec::new(),
            Some(ProbeValue::List(items)) => items
                .into_iter()
                .enumerate()
                .map(|(index, item)| match item {
                    ProbeValue::Map(fields) => Ok(fields),
                    other => Err(SqueezeError::MalformedProbe(format!(
                        "stream {index} is not an object: {other}"
                    ))),
                })
                .collect::<Result<Vec<_>>>()?,
            Some(other) => {
                return Err(SqueezeError::MalformedProbe(format!(
                    "'streams' is not a list: {other}"
                )));
            }
        };

        Ok(Self { format, streams })
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(json)
            .map_err(|e| SqueezeError::MalformedProbe(format!("invalid JSON: {e}")))?;
        Self::from_json(value)
    }

    pub fn format(&self) -> &BTreeMap<String, ProbeValue> {
        &self.format
    }

    pub fn streams(&self) -> &[BTreeMap<String, ProbeValue>] {
        &self.streams
    }

    pub fn format_field(&self, key: &str) -> Option<&ProbeValue> {
        self.format.get(key)
    }

    /// Container duration in seconds, if reported.
    pub fn duration(&self) -> Option<f64> {
        self.format_field("duration").and_then(ProbeValue::as_f64)
    }

    /// Container bit rate in bits per second, if reported.
    pub fn bit_rate(&self) -> Option<u64> {
        self.format_field("bit_rate")
            .and_then(ProbeValue::as_f64)
            .filter(|rate| *rate >= 0.0)
            .map(|rate| rate as u64)
    }

    /// The whole tree as a single map, `format` and `streams` at the top.
    pub fn to_tree(&self) -> ProbeValue {
        let mut root = BTreeMap::new();
        root.insert("format".to_string(), ProbeValue::Map(self.format.clone()));
        root.insert(
            "streams".to_string(),
            ProbeValue::List(self.streams.iter().cloned().map(ProbeValue::Map).collect()),
        );
        ProbeValue::Map(root)
    }
}

/// How much work the prober should do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeMode {
    /// Container and stream headers only.
    Fast,
    /// Also decodes the file to count frames (`nb_read_frames`).
    Thorough,
}

/// Produces a [`MediaProbe`] for a file.
pub trait Prober {
    fn probe(&self, path: &Path, mode: ProbeMode) -> Result<MediaProbe>;
}

/// [`Prober`] backed by the ffprobe executable.
#[derive(Debug, Clone)]
pub struct FfprobeProber {
    binary: String,
}

impl FfprobeProber {
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    fn build_command(&self, path: &Path, mode: ProbeMode) -> Command {
        let mut cmd = Command::new(&self.binary);
        cmd.args(["-v", "quiet", "-print_format", "json", "-show_format", "-show_streams"]);
        if mode == ProbeMode::Thorough {
            cmd.arg("-count_frames");
        }
        cmd.arg(path);
        cmd
    }
}

impl Default for FfprobeProber {
    fn default() -> Self {
        Self::new("ffprobe")
    }
}

impl Prober for FfprobeProber {
    fn probe(&self, path: &Path, mode: ProbeMode) -> Result<MediaProbe> {
        if !path.is_file() {
            return Err(collaborator_error(
                "ffprobe",
                format!("file not found: {}", path.display()),
                "",
            ));
        }

        let mut cmd = self.build_command(path, mode);
        crate::external::log_command(&cmd);

        let output = cmd
            .output()
            .map_err(|e| collaborator_error("ffprobe", format!("failed to execute: {e}"), ""))?;

        if !output.status.success() {
            return Err(collaborator_error(
                "ffprobe",
                format!("exited with {}", output.status),
                String::from_utf8_lossy(&output.stderr),
            ));
        }

        let json: Value = serde_json::from_slice(&output.stdout).map_err(|e| {
            collaborator_error(
                "ffprobe",
                format!("unparsable output: {e}"),
                String::from_utf8_lossy(&output.stderr),
            )
        })?;

        let probe = MediaProbe::from_json(json)?;
        log::debug!(
            "Probed {} ({:?}): {} stream(s)",
            path.display(),
            mode,
            probe.streams().len()
        );
        Ok(probe)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_json_keeps_stream_order_and_format() {
        let probe = MediaProbe::from_json(json!({
            "format": {"duration": "120.000000", "bit_rate": "25000000", "nb_streams": 2},
            "streams": [
                {"index": 0, "codec_type": "video"},
                {"index": 1, "codec_type": "audio"}
            ]
        }))
        .unwrap();

        assert_eq!(probe.streams().len(), 2);
        assert_eq!(probe.streams()[1]["codec_type"].as_str(), Some("audio"));
        assert_eq!(probe.duration(), Some(120.0));
        assert_eq!(probe.bit_rate(), Some(25_000_000));
    }

    #[test]
    fn test_malformed_probes_are_errors() {
        assert!(matches!(
            MediaProbe::from_json(json!([1, 2])),
            Err(SqueezeError::MalformedProbe(_))
        ));
        assert!(matches!(
            MediaProbe::from_json(json!({"format": "mkv"})),
            Err(SqueezeError::MalformedProbe(_))
        ));
        assert!(matches!(
            MediaProbe::from_json(json!({"streams": {"0": {}}})),
            Err(SqueezeError::MalformedProbe(_))
        ));
        assert!(matches!(
            MediaProbe::from_json(json!({"streams": [{"index": 0}, 7]})),
            Err(SqueezeError::MalformedProbe(_))
        ));
        assert!(matches!(
            MediaProbe::from_json_str("not json"),
            Err(SqueezeError::MalformedProbe(_))
        ));
    }

    #[test]
    fn test_missing_sections_are_empty() {
        let probe = MediaProbe::from_json(json!({})).unwrap();
        assert!(probe.streams().is_empty());
        assert!(probe.format().is_empty());
        assert_eq!(probe.duration(), None);
    }

    #[test]
    fn test_thorough_mode_counts_frames() {
        let prober = FfprobeProber::default();
        let fast: Vec<String> = prober
            .build_command(Path::new("in.mkv"), ProbeMode::Fast)
            .get_args()
            .map(|a| a.to_string_lossy().into_owned())
            .collect();
        let thorough: Vec<String> = prober
            .build_command(Path::new("in.mkv"), ProbeMode::Thorough)
            .get_args()
            .map(|a| a.to_string_lossy().into_owned())
            .collect();

        assert!(!fast.contains(&"-count_frames".to_string()));
        assert!(thorough.contains(&"-count_frames".to_string()));
        assert_eq!(thorough.last().map(String::as_str), Some("in.mkv"));
    }

    #[test]
    fn test_missing_file_is_collaborator_error() {
        let err = FfprobeProber::default()
            .probe(Path::new("/definitely/not/here.mkv"), ProbeMode::Fast)
            .unwrap_err();
        assert!(matches!(err, SqueezeError::CollaboratorInvocation { .. }));
    }
}
