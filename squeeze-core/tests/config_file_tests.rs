// squeeze-core/tests/config_file_tests.rs

use squeeze_core::config::Config;
use squeeze_core::error::SqueezeError;
use squeeze_core::validation::{RuleCategory, RuleKind};
use std::fs;
use tempfile::tempdir;

#[test]
fn test_save_and_load_round_trip() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("squeeze.json");

    let mut config = Config::default();
    config.encoding.crf = 24;
    config.encoding.preset = "slow".to_string();
    config.selection.min_bitrate = 5_000_000;
    config.quality.min_mean = 93.0;
    config.save(&path).unwrap();

    let loaded = Config::from_file(&path).unwrap();
    assert_eq!(loaded, config);
}

#[test]
fn test_extra_rules_extend_the_default_table() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("squeeze.json");
    fs::write(
        &path,
        r#"{
            "encoding": {"crf": 28, "preset": "medium"},
            "validation": {
                "extra_rules": [
                    {"pattern": "streams\\.\\d+\\.tags\\.handler_name", "kind": "ignore",
                     "category": "custom", "rationale": "rewritten by the muxer"}
                ]
            }
        }"#,
    )
    .unwrap();

    let config = Config::from_file(&path).unwrap();
    let rules = config.validation.tolerance_rules().unwrap();

    let handler = rules.classify("streams.0.tags.handler_name").unwrap();
    assert_eq!(handler.kind, RuleKind::Ignore);
    assert_eq!(handler.category, RuleCategory::Custom);
    // built-in rules still apply
    assert_eq!(rules.classify("format.bit_rate").unwrap().category, RuleCategory::SizeReduction);
}

#[test]
fn test_rules_replace_the_default_table() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("squeeze.json");
    fs::write(
        &path,
        r#"{
            "encoding": {"crf": 28, "preset": "medium"},
            "validation": {
                "rules": [
                    {"pattern": "format\\.duration", "kind": "numeric_close", "tolerance": 1.0,
                     "category": "timing_tolerance", "rationale": "loose timing"}
                ]
            }
        }"#,
    )
    .unwrap();

    let rules = Config::from_file(&path).unwrap().validation.tolerance_rules().unwrap();
    assert_eq!(rules.rules().len(), 1);
    assert!(rules.classify("format.bit_rate").is_none());
}

#[test]
fn test_invalid_file_is_a_config_error() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("squeeze.json");

    fs::write(&path, r#"{"encoding": {"crf": "high"}}"#).unwrap();
    assert!(matches!(Config::from_file(&path), Err(SqueezeError::Config(_))));

    fs::write(&path, r#"{"encoding": {"crf": 60, "preset": "medium"}}"#).unwrap();
    assert!(matches!(Config::from_file(&path), Err(SqueezeError::Config(_))));

    assert!(matches!(
        Config::from_file(&dir.path().join("missing.json")),
        Err(SqueezeError::Io(_))
    ));
}
