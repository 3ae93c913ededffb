// squeeze-cli/tests/cli_integration.rs

use clap::{CommandFactory, Parser};
use squeeze_cli::{Cli, Commands, run_compare, run_plan};
use squeeze_cli::{CompareArgs, EncoderOverrides, PlanArgs};
use std::path::PathBuf;

#[test]
fn test_cli_definition_is_consistent() {
    Cli::command().debug_assert();
}

#[test]
fn test_parse_convert_basic_args() {
    let cli = Cli::try_parse_from(["squeeze", "convert", "clip.mov"]).unwrap();
    assert!(!cli.verbose);
    assert!(!cli.json);

    match cli.command {
        Commands::Convert(args) => {
            assert_eq!(args.input, PathBuf::from("clip.mov"));
            assert!(!args.force);
            assert!(!args.no_progress);
            assert!(args.encoder.crf.is_none());
            assert!(args.encoder.preset.is_none());
        }
        other => panic!("expected convert, got {other:?}"),
    }
}

#[test]
fn test_parse_convert_with_overrides_and_global_flags() {
    let cli = Cli::try_parse_from([
        "squeeze",
        "convert",
        "clip.mov",
        "--scratch-dir",
        "/tmp/work",
        "--force",
        "--crf",
        "24",
        "--preset",
        "slow",
        "--json",
        "-v",
        "--config",
        "squeeze.json",
    ])
    .unwrap();

    assert!(cli.verbose);
    assert!(cli.json);
    assert_eq!(cli.config, Some(PathBuf::from("squeeze.json")));
    match cli.command {
        Commands::Convert(args) => {
            assert_eq!(args.scratch_dir, Some(PathBuf::from("/tmp/work")));
            assert!(args.force);
            assert_eq!(args.encoder.crf, Some(24));
            assert_eq!(args.encoder.preset.as_deref(), Some("slow"));
        }
        other => panic!("expected convert, got {other:?}"),
    }
}

#[test]
fn test_crf_out_of_range_is_rejected() {
    assert!(Cli::try_parse_from(["squeeze", "convert", "clip.mov", "--crf", "52"]).is_err());
}

#[test]
fn test_parse_compare() {
    let cli = Cli::try_parse_from(["squeeze", "compare", "a.mov", "b.mkv", "--no-quality"]).unwrap();
    match cli.command {
        Commands::Compare(args) => {
            assert_eq!(args.original, PathBuf::from("a.mov"));
            assert_eq!(args.converted, PathBuf::from("b.mkv"));
            assert!(args.no_quality);
        }
        other => panic!("expected compare, got {other:?}"),
    }
}

#[test]
fn test_compare_requires_two_files() {
    assert!(Cli::try_parse_from(["squeeze", "compare", "a.mov"]).is_err());
}

#[test]
fn test_plan_non_existent_input() {
    let args = PlanArgs {
        input: PathBuf::from("surely/this/does/not/exist/input.mov"),
        scratch_dir: None,
        encoder: EncoderOverrides::default(),
    };
    let err = run_plan(args, None, false).unwrap_err();
    assert!(err.to_string().contains("Invalid input path"));
}

#[test]
fn test_compare_non_existent_converted_file() {
    let dir = tempfile::tempdir().unwrap();
    let original = dir.path().join("a.mov");
    std::fs::write(&original, b"x").unwrap();

    let args = CompareArgs {
        original,
        converted: dir.path().join("missing.mkv"),
        no_quality: true,
    };
    let err = run_compare(args, None, false).unwrap_err();
    assert!(err.to_string().contains("missing.mkv"));
}
