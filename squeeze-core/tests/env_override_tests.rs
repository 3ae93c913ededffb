// squeeze-core/tests/env_override_tests.rs
//
// Kept as the only test in this binary: it mutates the process environment.

use squeeze_core::config::Config;
use std::env;

const VARS: &[&str] = &[
    "SQUEEZE_CRF",
    "SQUEEZE_PRESET",
    "SQUEEZE_MIN_BITRATE",
    "SQUEEZE_MIN_VMAF_MEAN",
    "SQUEEZE_MIN_VMAF_MIN",
    "SQUEEZE_FFMPEG",
    "SQUEEZE_FFPROBE",
];

#[test]
fn test_env_var_overrides() {
    // SAFETY: no other thread in this test binary reads the environment
    unsafe {
        for var in VARS {
            env::remove_var(var);
        }
        env::set_var("SQUEEZE_CRF", "22");
        env::set_var("SQUEEZE_PRESET", "slow");
        env::set_var("SQUEEZE_MIN_BITRATE", "1000000");
        env::set_var("SQUEEZE_MIN_VMAF_MEAN", "97.5");
        env::set_var("SQUEEZE_MIN_VMAF_MIN", "not-a-number");
        env::set_var("SQUEEZE_FFMPEG", "/opt/ffmpeg/bin/ffmpeg");
    }

    let config = Config::new();
    assert_eq!(config.encoding.crf, 22);
    assert_eq!(config.encoding.preset, "slow");
    assert_eq!(config.selection.min_bitrate, 1_000_000);
    assert_eq!(config.quality.min_mean, 97.5);
    // unparsable values fall back to the default
    assert_eq!(config.quality.min_min, 90.0);
    assert_eq!(config.tools.ffmpeg, "/opt/ffmpeg/bin/ffmpeg");
    assert_eq!(config.tools.ffprobe, "ffprobe");

    // file values win over the environment
    let from_file: Config = serde_json::from_str(r#"{"encoding": {"crf": 30}}"#).unwrap();
    assert_eq!(from_file.encoding.crf, 30);
    assert_eq!(from_file.encoding.preset, "slow");

    // SAFETY: as above
    unsafe {
        for var in VARS {
            env::remove_var(var);
        }
    }
}
