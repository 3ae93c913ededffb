//! Configuration structures for the squeeze-core library.
//!
//! Every setting has a built-in default that can be overridden by an
//! environment variable (`SQUEEZE_*`). A JSON config file loaded with
//! [`Config::from_file`] overrides both for the fields it sets.
//!
//! # Examples
//!
//! ```rust,no_run
//! use squeeze_core::config::Config;
//! use std::path::Path;
//!
//! let mut config = Config::from_file(Path::new("squeeze.json")).unwrap();
//! config.encoding.crf = 26;
//! config.validate().unwrap();
//! config.save(Path::new("squeeze.json")).unwrap();
//! ```

pub mod encoding;
pub mod utils;
pub mod validation;

use std::path::Path;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SqueezeError};
use utils::*;

pub use encoding::{DEFAULT_CRF, DEFAULT_PRESET, EncodingConfig, X265_PRESETS};
pub use validation::{DEFAULT_N_SUBSAMPLE, DEFAULT_TIMING_TOLERANCE, QualityConfig, ValidationConfig};

/// Files below this overall bit rate are not worth converting (20 Mb/s)
pub const DEFAULT_MIN_BITRATE: u64 = 20_000_000;

/// Which files get converted at all
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectionConfig {
    /// Minimum container bit rate in bits per second
    pub min_bitrate: u64,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            min_bitrate: get_env_u64("SQUEEZE_MIN_BITRATE", DEFAULT_MIN_BITRATE),
        }
    }
}

/// Locations of the external tools
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolsConfig {
    pub ffmpeg: String,
    pub ffprobe: String,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            ffmpeg: get_env_string("SQUEEZE_FFMPEG", "ffmpeg"),
            ffprobe: get_env_string("SQUEEZE_FFPROBE", "ffprobe"),
        }
    }
}

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub encoding: EncodingConfig,
    pub validation: ValidationConfig,
    pub quality: QualityConfig,
    pub selection: SelectionConfig,
    pub tools: ToolsConfig,
}

impl Config {
    /// Defaults with environment overrides applied
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads and validates a JSON config file; missing fields keep their defaults
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading configuration from {}", path.display());
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)
            .map_err(|e| SqueezeError::Config(format!("{}: {e}", path.display())))?;
        config.validate()?;
        Ok(config)
    }

    /// Writes the configuration as pretty-printed JSON
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Rejects settings no run could succeed with
    pub fn validate(&self) -> Result<()> {
        if self.encoding.crf > 51 {
            return Err(SqueezeError::Config(format!(
                "crf must be between 0 and 51, got {}",
                self.encoding.crf
            )));
        }
        if !X265_PRESETS.contains(&self.encoding.preset.as_str()) {
            return Err(SqueezeError::Config(format!(
                "unknown preset '{}' (expected one of: {})",
                self.encoding.preset,
                X265_PRESETS.join(", ")
            )));
        }
        if self.encoding.track_timescale == 0 {
            return Err(SqueezeError::Config("track_timescale must be positive".to_string()));
        }

        let tolerances = [
            ("timing_tolerance", self.validation.timing_tolerance),
            ("duration_tolerance", self.validation.duration_tolerance),
        ];
        for (name, value) in tolerances {
            if !value.is_finite() || value < 0.0 {
                return Err(SqueezeError::Config(format!("{name} must be a non-negative number, got {value}")));
            }
        }
        if self.quality.n_subsample == 0 {
            return Err(SqueezeError::Config("n_subsample must be at least 1".to_string()));
        }
        if self.tools.ffmpeg.is_empty() || self.tools.ffprobe.is_empty() {
            return Err(SqueezeError::Config("tool paths must not be empty".to_string()));
        }
        Ok(())
    }
}
