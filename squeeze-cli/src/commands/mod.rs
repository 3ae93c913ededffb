//! Command implementations for the CLI.
//!
//! Each submodule contains the implementation of a specific command. Commands
//! return `Ok(true)` when the run succeeded, `Ok(false)` when the file was
//! rejected or compared unequal.

/// `convert`: run the full conversion and validation of one file.
pub mod convert;

/// `plan`: dry run showing decisions and the ffmpeg command.
pub mod plan;

/// `compare`: validate an existing conversion against its original.
pub mod compare;

pub use compare::run_compare;
pub use convert::run_convert;
pub use plan::run_plan;

use std::path::{Path, PathBuf};

use log::debug;
use squeeze_core::{Config, FfprobeProber, Orchestrator, SidecarEngine, VmafScorer};

use crate::cli::EncoderOverrides;
use crate::error::{CliErrorContext, CliResult};

/// Orchestrator wired to the real ffprobe and ffmpeg.
pub type CliOrchestrator = Orchestrator<FfprobeProber, SidecarEngine, VmafScorer>;

/// Loads the config file (or defaults) and applies command-line overrides.
pub fn load_config(path: Option<&Path>, overrides: &EncoderOverrides) -> CliResult<Config> {
    let mut config = match path {
        Some(path) => Config::from_file(path)
            .cli_with_context(|| format!("Failed to load config '{}'", path.display()))?,
        None => Config::new(),
    };

    if let Some(crf) = overrides.crf {
        config.encoding.crf = crf;
    }
    if let Some(preset) = &overrides.preset {
        config.encoding.preset = preset.clone();
    }

    config.validate()?;
    debug!("Effective configuration: {:?}", config);
    Ok(config)
}

pub fn build_orchestrator(config: Config, show_progress: bool) -> CliResult<CliOrchestrator> {
    let prober = FfprobeProber::new(config.tools.ffprobe.clone());
    let engine = SidecarEngine::new(config.tools.ffmpeg.clone()).show_progress(show_progress);
    let scorer = VmafScorer::new(config.tools.ffmpeg.clone(), config.quality.n_subsample);
    Orchestrator::new(config, prober, engine, scorer)
}

/// Scratch directory used when none is given.
pub fn default_scratch_dir() -> PathBuf {
    std::env::temp_dir().join("squeeze")
}

/// Resolves an input path, failing early with a readable message.
pub fn resolve_input(path: &Path) -> CliResult<PathBuf> {
    let resolved = path
        .canonicalize()
        .cli_with_context(|| format!("Invalid input path '{}'", path.display()))?;
    if !resolved.is_file() {
        return Err(squeeze_core::SqueezeError::Path(format!(
            "Input path '{}' is not a file",
            resolved.display()
        )));
    }
    Ok(resolved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_overrides_apply_on_top_of_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("squeeze.json");
        fs::write(&path, r#"{"encoding": {"crf": 30, "preset": "slow"}}"#).unwrap();

        let overrides = EncoderOverrides {
            crf: Some(24),
            preset: None,
        };
        let config = load_config(Some(&path), &overrides).unwrap();
        assert_eq!(config.encoding.crf, 24);
        assert_eq!(config.encoding.preset, "slow");
    }

    #[test]
    fn test_invalid_override_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("squeeze.json");
        fs::write(&path, r#"{"encoding": {"crf": 28, "preset": "medium"}}"#).unwrap();

        let overrides = EncoderOverrides {
            crf: None,
            preset: Some("warp".to_string()),
        };
        assert!(load_config(Some(&path), &overrides).is_err());
    }

    #[test]
    fn test_missing_config_file_has_context() {
        let err = load_config(Some(Path::new("/no/such/squeeze.json")), &EncoderOverrides::default()).unwrap_err();
        assert!(err.to_string().starts_with("Failed to load config '/no/such/squeeze.json'"));
    }

    #[test]
    fn test_resolve_input() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("clip.mov");
        fs::write(&file, b"x").unwrap();

        assert_eq!(resolve_input(&file).unwrap(), file.canonicalize().unwrap());
        assert!(resolve_input(dir.path()).is_err());
        assert!(
            resolve_input(&dir.path().join("missing.mov"))
                .unwrap_err()
                .to_string()
                .contains("Invalid input path")
        );
    }
}
