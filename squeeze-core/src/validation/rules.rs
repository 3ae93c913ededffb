//! Tolerance and irrelevance rules for probe comparison
//!
//! Each rule pairs a field-path pattern with the way that field is compared
//! between the original and the converted probe. Rules are evaluated in
//! declared order and the first match wins; a path no rule matches is compared
//! strictly.
//!
//! Patterns are regular expressions matched against the whole lower-cased dot
//! path, so `streams.\d+.start_time` covers the start time of every stream.

use std::fmt;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SqueezeError};

/// Why a rule exists. Kept as data so reports and audits can group by it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleCategory {
    /// Differs because the codec or container changed.
    CodecOrContainerChange,
    /// Dropped by the new encoder or muxer.
    RemovedOnTranscode,
    /// Moved under `tags.*` by the new container; checked by the duration cross-check.
    MovedToTags,
    /// Checked by the frame-count check.
    CountedElsewhere,
    /// Introduced by the new codec.
    AddedByCodec,
    /// Changes because the file got smaller.
    SizeReduction,
    /// Known timing drift not yet preserved by the encode.
    TimingDrift,
    /// Timestamps that may move by up to about one frame.
    TimingTolerance,
    /// Frame rates compared as fractions.
    FrameRate,
    /// Language tags.
    Language,
    /// Deployment-specific rule.
    Custom,
}

impl fmt::Display for RuleCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RuleCategory::CodecOrContainerChange => "codec/container change",
            RuleCategory::RemovedOnTranscode => "removed on transcode",
            RuleCategory::MovedToTags => "moved to tags",
            RuleCategory::CountedElsewhere => "counted elsewhere",
            RuleCategory::AddedByCodec => "added by codec",
            RuleCategory::SizeReduction => "size reduction",
            RuleCategory::TimingDrift => "timing drift",
            RuleCategory::TimingTolerance => "timing tolerance",
            RuleCategory::FrameRate => "frame rate",
            RuleCategory::Language => "language",
            RuleCategory::Custom => "custom",
        };
        write!(f, "{name}")
    }
}

/// How a matched field is compared.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RuleKind {
    /// Not compared at all.
    Ignore,
    /// Both values parsed as numbers, equal within an absolute tolerance.
    NumericClose { tolerance: f64 },
    /// Both values parsed as `num/den` fractions, equal within an absolute tolerance.
    RationalClose { tolerance: f64 },
    /// Equal, or the original carried the undetermined sentinel.
    EqualOrUndetermined,
}

/// A field-path pattern matched against the full dot path.
#[derive(Debug, Clone)]
pub struct PathPattern {
    source: String,
    regex: Regex,
}

impl PathPattern {
    pub fn new(source: &str) -> Result<Self> {
        let regex = Regex::new(&format!("^(?:{source})$")).map_err(|e| {
            SqueezeError::Config(format!("invalid field pattern '{source}': {e}"))
        })?;
        Ok(Self {
            source: source.to_string(),
            regex,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn is_match(&self, path: &str) -> bool {
        self.regex.is_match(path)
    }
}

impl PartialEq for PathPattern {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

impl Serialize for PathPattern {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.source)
    }
}

impl<'de> Deserialize<'de> for PathPattern {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let source = String::deserialize(deserializer)?;
        PathPattern::new(&source).map_err(serde::de::Error::custom)
    }
}

/// One entry of the tolerance table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToleranceRule {
    pub pattern: PathPattern,
    #[serde(flatten)]
    pub kind: RuleKind,
    pub category: RuleCategory,
    #[serde(default)]
    pub rationale: String,
}

/// Ordered tolerance table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ToleranceRules {
    rules: Vec<ToleranceRule>,
}

// (pattern, category, rationale) for the default ignore entries.
const IGNORED_FIELDS: &[(&str, RuleCategory, &str)] = &[
    (r"format\.format_name", RuleCategory::CodecOrContainerChange, "container may change"),
    (r"format\.format_long_name", RuleCategory::CodecOrContainerChange, "container may change"),
    (r"format\.tags\.encoder", RuleCategory::CodecOrContainerChange, "written by the muxer"),
    (r"streams\.\d+\.tags\.encoder", RuleCategory::CodecOrContainerChange, "written by the encoder"),
    (r"streams\.\d+\.profile", RuleCategory::CodecOrContainerChange, "codec specific"),
    (r"streams\.\d+\.codec_time_base", RuleCategory::CodecOrContainerChange, "codec specific"),
    (r"streams\.\d+\.level", RuleCategory::CodecOrContainerChange, "codec specific"),
    (r"streams\.\d+\.start_pts", RuleCategory::CodecOrContainerChange, "depends on the stream time base"),
    (r"streams\.\d+\.extradata_size", RuleCategory::CodecOrContainerChange, "codec specific"),
    (r"streams\.\d+\.codec_name", RuleCategory::CodecOrContainerChange, "codec changes on transcode"),
    (r"streams\.\d+\.codec_long_name", RuleCategory::CodecOrContainerChange, "codec changes on transcode"),
    (r"streams\.\d+\.codec_tag", RuleCategory::CodecOrContainerChange, "codec changes on transcode"),
    (r"streams\.\d+\.codec_tag_string", RuleCategory::CodecOrContainerChange, "codec changes on transcode"),
    (r"streams\.\d+\.refs", RuleCategory::CodecOrContainerChange, "encoder decision"),
    (r"streams\.\d+\.has_b_frames", RuleCategory::CodecOrContainerChange, "encoder decision"),
    (r"streams\.\d+\.sample_fmt", RuleCategory::CodecOrContainerChange, "audio codec specific"),
    (r"streams\.\d+\.bits_per_sample", RuleCategory::CodecOrContainerChange, "audio codec specific"),
    (r"streams\.\d+\.color_space", RuleCategory::RemovedOnTranscode, "not carried over by the encoder"),
    (r"streams\.\d+\.color_transfer", RuleCategory::RemovedOnTranscode, "not carried over by the encoder"),
    (r"streams\.\d+\.color_primaries", RuleCategory::RemovedOnTranscode, "not carried over by the encoder"),
    (r"streams\.\d+\.is_avc", RuleCategory::RemovedOnTranscode, "h264 only"),
    (r"streams\.\d+\.nal_length_size", RuleCategory::RemovedOnTranscode, "h264 only"),
    (r"streams\.\d+\.bits_per_raw_sample", RuleCategory::RemovedOnTranscode, "not reported for the new codec"),
    (r"streams\.\d+\.id", RuleCategory::RemovedOnTranscode, "container stream ids"),
    (r"streams\.\d+\.coded_width", RuleCategory::RemovedOnTranscode, "coded size is codec padding, width is authoritative"),
    (r"streams\.\d+\.coded_height", RuleCategory::RemovedOnTranscode, "coded size is codec padding, height is authoritative"),
    (r"streams\.\d+\.duration", RuleCategory::MovedToTags, "moved under tags, checked by the duration cross-check"),
    (r"streams\.\d+\.tags\.duration", RuleCategory::MovedToTags, "checked by the duration cross-check"),
    (r"streams\.\d+\.duration_ts", RuleCategory::MovedToTags, "depends on the stream time base"),
    (r"streams\.\d+\.nb_frames", RuleCategory::CountedElsewhere, "header count, nb_read_frames is used instead"),
    (r"streams\.\d+\.nb_read_frames", RuleCategory::CountedElsewhere, "checked by the frame-count check"),
    (r"streams\.\d+\.channel_layout", RuleCategory::AddedByCodec, "reported by the new audio codec"),
    (r"format\.size", RuleCategory::SizeReduction, "the point of converting"),
    (r"format\.bit_rate", RuleCategory::SizeReduction, "the point of converting"),
    (r"format\.filename", RuleCategory::SizeReduction, "converted file has its own name"),
    (r"streams\.\d+\.bit_rate", RuleCategory::SizeReduction, "the point of converting"),
    (r"streams\.\d+\.time_base", RuleCategory::TimingDrift, "muxer picks its own time base"),
    (r"streams\.\d+\.color_range", RuleCategory::TimingDrift, "not preserved by every encoder"),
];

impl ToleranceRules {
    pub fn new(rules: Vec<ToleranceRule>) -> Self {
        Self { rules }
    }

    /// The built-in table. `timing_tolerance` is the allowed drift, in
    /// seconds and frames per second, for timestamps and frame rates.
    pub fn default_rules(timing_tolerance: f64) -> Result<Self> {
        let mut rules = vec![
            rule(
                r"format\.duration",
                RuleKind::NumericClose { tolerance: timing_tolerance },
                RuleCategory::TimingTolerance,
                "may drift by about one frame",
            )?,
            rule(
                r"format\.start_time",
                RuleKind::NumericClose { tolerance: timing_tolerance },
                RuleCategory::TimingTolerance,
                "may drift by about one frame",
            )?,
            rule(
                r"streams\.\d+\.start_time",
                RuleKind::NumericClose { tolerance: timing_tolerance },
                RuleCategory::TimingTolerance,
                "may drift by about one frame",
            )?,
            rule(
                r"streams\.\d+\.r_frame_rate",
                RuleKind::RationalClose { tolerance: timing_tolerance },
                RuleCategory::FrameRate,
                "same rate may be written as a different fraction",
            )?,
            rule(
                r"streams\.\d+\.avg_frame_rate",
                RuleKind::RationalClose { tolerance: timing_tolerance },
                RuleCategory::FrameRate,
                "same rate may be written as a different fraction",
            )?,
            rule(
                r"streams\.\d+\.tags\.language",
                RuleKind::EqualOrUndetermined,
                RuleCategory::Language,
                "muxers may fill in an undetermined language",
            )?,
        ];
        for (pattern, category, rationale) in IGNORED_FIELDS {
            rules.push(rule(pattern, RuleKind::Ignore, *category, rationale)?);
        }
        Ok(Self { rules })
    }

    /// The first rule matching `path`, or `None` when the path is strict.
    pub fn classify(&self, path: &str) -> Option<&ToleranceRule> {
        self.rules.iter().find(|rule| rule.pattern.is_match(path))
    }

    pub fn rules(&self) -> &[ToleranceRule] {
        &self.rules
    }

    /// Adds rules evaluated after the existing ones.
    pub fn extended(mut self, extra: impl IntoIterator<Item = ToleranceRule>) -> Self {
        self.rules.extend(extra);
        self
    }
}

fn rule(pattern: &str, kind: RuleKind, category: RuleCategory, rationale: &str) -> Result<ToleranceRule> {
    Ok(ToleranceRule {
        pattern: PathPattern::new(pattern)?,
        kind,
        category,
        rationale: rationale.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn defaults() -> ToleranceRules {
        ToleranceRules::default_rules(0.05).unwrap()
    }

    #[test]
    fn test_wildcard_matches_any_stream_index() {
        let rules = defaults();
        for path in ["streams.0.codec_name", "streams.12.codec_name"] {
            let rule = rules.classify(path).unwrap();
            assert_eq!(rule.kind, RuleKind::Ignore);
            assert_eq!(rule.category, RuleCategory::CodecOrContainerChange);
        }
        assert!(rules.classify("streams.x.codec_name").is_none());
    }

    #[test]
    fn test_patterns_match_whole_path() {
        let rules = defaults();
        assert!(rules.classify("streams.0.width").is_none());
        assert!(rules.classify("format.nb_streams").is_none());
        assert!(rules.classify("streams.0.disposition.default").is_none());
        // codec_tag does not swallow unrelated fields that merely share the prefix
        assert!(rules.classify("streams.0.codec_tagx").is_none());
    }

    #[test]
    fn test_tolerance_rules_win_over_ignores() {
        let rules = defaults();
        let start = rules.classify("streams.1.start_time").unwrap();
        assert_eq!(start.kind, RuleKind::NumericClose { tolerance: 0.05 });

        let rate = rules.classify("streams.0.avg_frame_rate").unwrap();
        assert_eq!(rate.kind, RuleKind::RationalClose { tolerance: 0.05 });

        let lang = rules.classify("streams.0.tags.language").unwrap();
        assert_eq!(lang.kind, RuleKind::EqualOrUndetermined);
    }

    #[test]
    fn test_first_match_wins() {
        let custom = ToleranceRules::new(vec![
            rule(r"format\..*", RuleKind::Ignore, RuleCategory::Custom, "").unwrap(),
            rule(r"format\.duration", RuleKind::NumericClose { tolerance: 1.0 }, RuleCategory::Custom, "")
                .unwrap(),
        ]);
        assert_eq!(custom.classify("format.duration").unwrap().kind, RuleKind::Ignore);
    }

    #[test]
    fn test_every_default_rule_has_rationale() {
        assert!(defaults().rules().iter().all(|r| !r.rationale.is_empty()));
    }

    #[test]
    fn test_rules_roundtrip_through_json() {
        let json = r#"[
            {"pattern": "streams\\.\\d+\\.tags\\.handler_name", "kind": "ignore", "category": "custom"},
            {"pattern": "format\\.duration", "kind": "numeric_close", "tolerance": 0.1, "category": "timing_tolerance", "rationale": "loose"}
        ]"#;
        let rules: ToleranceRules = serde_json::from_str(json).unwrap();
        assert_eq!(rules.rules().len(), 2);
        assert_eq!(
            rules.classify("streams.3.tags.handler_name").unwrap().category,
            RuleCategory::Custom
        );
        assert_eq!(
            rules.classify("format.duration").unwrap().kind,
            RuleKind::NumericClose { tolerance: 0.1 }
        );
    }

    #[test]
    fn test_invalid_pattern_is_config_error() {
        assert!(matches!(PathPattern::new("streams.(["), Err(SqueezeError::Config(_))));
        let bad: std::result::Result<ToleranceRules, _> =
            serde_json::from_str(r#"[{"pattern": "(", "kind": "ignore", "category": "custom"}]"#);
        assert!(bad.is_err());
    }
}
