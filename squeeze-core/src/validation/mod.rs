//! Media validation module
//!
//! Responsibilities:
//! - Flatten probe trees into comparable dot-path facts
//! - Classify every fact with the tolerance table
//! - Check structural equivalence of an original and its conversion
//! - Cross-check stream durations and decoded frame counts
//! - Enforce the perceptual quality gate
//! - Collect every divergence into a single verdict
//!
//! The checks are pure: they take probes and scores gathered elsewhere and
//! never touch the filesystem or spawn processes.

use log::{error, info};

use crate::error::{Result, SqueezeError};
use crate::media::MediaProbe;

pub mod duration;
pub mod equivalence;
pub mod flatten;
pub mod quality;
pub mod report;
pub mod rules;

pub use duration::parse_duration;
pub use equivalence::EquivalenceValidator;
pub use flatten::{FlatFacts, FlatValue, flatten};
pub use quality::{PooledMetric, QualityGate, QualityReport};
pub use report::{CheckKind, ValidationFailure, ValidationVerdict};
pub use rules::{PathPattern, RuleCategory, RuleKind, ToleranceRule, ToleranceRules};

/// Runs the equivalence checks and turns a failing verdict into
/// [`SqueezeError::EquivalenceViolation`].
pub fn require_equivalent(
    validator: &EquivalenceValidator,
    original: &MediaProbe,
    converted: &MediaProbe,
) -> Result<ValidationVerdict> {
    let verdict = validator.validate(original, converted);
    if verdict.passed() {
        Ok(verdict)
    } else {
        error!("Equivalence check failed with {} failure(s)", verdict.failures().len());
        Err(SqueezeError::EquivalenceViolation(verdict))
    }
}

/// Evaluates the quality gate and turns a failing verdict into
/// [`SqueezeError::QualityGateViolation`].
pub fn require_quality(gate: &QualityGate, report: &QualityReport) -> Result<ValidationVerdict> {
    let verdict = gate.evaluate(report);
    if verdict.passed() {
        info!("Quality gate passed");
        Ok(verdict)
    } else {
        error!("Quality gate failed with {} failure(s)", verdict.failures().len());
        Err(SqueezeError::QualityGateViolation(verdict))
    }
}
