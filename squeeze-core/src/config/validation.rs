//! Validation configuration module
//!
//! Defines the tolerances used by the equivalence checks and the thresholds
//! of the quality gate.

use serde::{Deserialize, Serialize};

use super::utils::*;
use crate::error::Result;
use crate::validation::equivalence::{
    DEFAULT_DURATION_TOLERANCE, DEFAULT_FRAME_TOLERANCE, DEFAULT_UNDETERMINED_LANGUAGE, EquivalenceValidator,
};
use crate::validation::quality::{DEFAULT_METRIC, DEFAULT_MIN_MEAN, DEFAULT_MIN_MIN, QualityGate};
use crate::validation::rules::{ToleranceRule, ToleranceRules};

/// Default allowed drift for timestamps (seconds) and frame rates (fps)
pub const DEFAULT_TIMING_TOLERANCE: f64 = 0.05;

/// Default VMAF frame subsampling
pub const DEFAULT_N_SUBSAMPLE: u32 = 10;

/// Equivalence check configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Tolerance of the built-in timestamp and frame-rate rules
    pub timing_tolerance: f64,

    /// Allowed per-stream duration drift in seconds
    pub duration_tolerance: f64,

    /// Allowed decoded frame count difference
    pub frame_tolerance: u64,

    /// Language tag that matches any converted language
    pub undetermined_language: String,

    /// Replaces the built-in tolerance table when set
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rules: Option<ToleranceRules>,

    /// Rules evaluated after the table
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub extra_rules: Vec<ToleranceRule>,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            timing_tolerance: get_env_f64("SQUEEZE_TIMING_TOLERANCE", DEFAULT_TIMING_TOLERANCE),
            duration_tolerance: get_env_f64("SQUEEZE_DURATION_TOLERANCE", DEFAULT_DURATION_TOLERANCE),
            frame_tolerance: get_env_u64("SQUEEZE_FRAME_TOLERANCE", DEFAULT_FRAME_TOLERANCE),
            undetermined_language: get_env_string("SQUEEZE_UNDETERMINED_LANGUAGE", DEFAULT_UNDETERMINED_LANGUAGE),
            rules: None,
            extra_rules: Vec::new(),
        }
    }
}

impl ValidationConfig {
    /// The configured table, or the built-in one, followed by the extra rules
    pub fn tolerance_rules(&self) -> Result<ToleranceRules> {
        let base = match &self.rules {
            Some(rules) => rules.clone(),
            None => ToleranceRules::default_rules(self.timing_tolerance)?,
        };
        Ok(base.extended(self.extra_rules.iter().cloned()))
    }

    pub fn equivalence_validator(&self) -> Result<EquivalenceValidator> {
        Ok(EquivalenceValidator::new(self.tolerance_rules()?)
            .with_undetermined_language(self.undetermined_language.clone())
            .with_duration_tolerance(self.duration_tolerance)
            .with_frame_tolerance(self.frame_tolerance))
    }
}

/// Quality gate configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QualityConfig {
    /// Pooled metric the gate reads
    pub metric: String,

    /// The metric's mean must be strictly above this
    pub min_mean: f64,

    /// The metric's worst frame must be strictly above this
    pub min_min: f64,

    /// Score every n-th frame
    pub n_subsample: u32,
}

impl Default for QualityConfig {
    fn default() -> Self {
        Self {
            metric: get_env_string("SQUEEZE_QUALITY_METRIC", DEFAULT_METRIC),
            min_mean: get_env_f64("SQUEEZE_MIN_VMAF_MEAN", DEFAULT_MIN_MEAN),
            min_min: get_env_f64("SQUEEZE_MIN_VMAF_MIN", DEFAULT_MIN_MIN),
            n_subsample: get_env_u32("SQUEEZE_VMAF_SUBSAMPLE", DEFAULT_N_SUBSAMPLE),
        }
    }
}

impl QualityConfig {
    pub fn gate(&self) -> QualityGate {
        QualityGate::new(self.metric.clone(), self.min_mean, self.min_min)
    }
}
