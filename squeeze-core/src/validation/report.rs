use std::collections::BTreeMap;
use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};

/// Which check produced a failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckKind {
    /// Numeric field outside its tolerance
    NumericTolerance,
    /// Fractional field outside its tolerance
    RationalTolerance,
    /// Language tag changed
    Language,
    /// Strictly compared metadata differs
    Metadata,
    /// Per-stream duration cross-check
    Duration,
    /// Decoded frame count check
    FrameCount,
    /// Perceptual quality thresholds
    Quality,
}

impl Display for CheckKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CheckKind::NumericTolerance => write!(f, "Numeric tolerance"),
            CheckKind::RationalTolerance => write!(f, "Rational tolerance"),
            CheckKind::Language => write!(f, "Language"),
            CheckKind::Metadata => write!(f, "Metadata"),
            CheckKind::Duration => write!(f, "Duration"),
            CheckKind::FrameCount => write!(f, "Frame count"),
            CheckKind::Quality => write!(f, "Quality"),
        }
    }
}

/// A single divergence between original and converted file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationFailure {
    /// Check that failed
    pub check: CheckKind,

    /// Field path, stream or metric the failure is about
    pub subject: String,

    /// Human readable description, including the values involved
    pub message: String,
}

impl Display for ValidationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.check, self.subject, self.message)
    }
}

/// Outcome of the equivalence checks or the quality gate.
///
/// A verdict with no failures is a pass. Checks add every failure they find;
/// nothing stops at the first one.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationVerdict {
    failures: Vec<ValidationFailure>,
}

impl ValidationVerdict {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn passed(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn failures(&self) -> &[ValidationFailure] {
        &self.failures
    }

    /// Record a failure, logging it as it is found
    pub fn add_failure<S: Into<String>, M: Into<String>>(&mut self, check: CheckKind, subject: S, message: M) {
        let failure = ValidationFailure {
            check,
            subject: subject.into(),
            message: message.into(),
        };
        log::warn!("{}", failure);
        self.failures.push(failure);
    }

    /// Failures of one check kind
    pub fn failures_of(&self, check: CheckKind) -> Vec<&ValidationFailure> {
        self.failures.iter().filter(|f| f.check == check).collect()
    }

    /// Generate a formatted report, failures grouped by check
    pub fn format(&self) -> String {
        if self.passed() {
            return "VALIDATION PASSED".to_string();
        }

        let mut grouped: BTreeMap<CheckKind, Vec<&ValidationFailure>> = BTreeMap::new();
        for failure in &self.failures {
            grouped.entry(failure.check).or_default().push(failure);
        }

        let mut lines = Vec::new();
        lines.push(format!("VALIDATION FAILED: {} failure(s)", self.failures.len()));
        for (check, failures) in grouped {
            lines.push(format!("{} ({}):", check, failures.len()));
            for failure in failures {
                let mut message = failure.message.lines();
                lines.push(format!("  - {}: {}", failure.subject, message.next().unwrap_or_default()));
                // multi-line messages are diffs; keep them indented under their subject
                lines.extend(message.map(|line| format!("      {line}")));
            }
        }
        lines.join("\n")
    }
}

impl Display for ValidationVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_verdict_passes() {
        let verdict = ValidationVerdict::new();
        assert!(verdict.passed());
        assert_eq!(verdict.format(), "VALIDATION PASSED");
    }

    #[test]
    fn test_format_groups_by_check() {
        let mut verdict = ValidationVerdict::new();
        verdict.add_failure(CheckKind::Quality, "vmaf", "mean 94.00 <= 95.00");
        verdict.add_failure(CheckKind::NumericTolerance, "format.duration", "120 vs 121");
        verdict.add_failure(CheckKind::Metadata, "metadata", "diff found\n-a: 1\n+a: 2");
        verdict.add_failure(CheckKind::Quality, "vmaf", "min 80.00 <= 90.00");

        assert!(!verdict.passed());
        assert_eq!(verdict.failures_of(CheckKind::Quality).len(), 2);

        let formatted = verdict.format();
        assert!(formatted.starts_with("VALIDATION FAILED: 4 failure(s)"));
        assert!(formatted.contains("Quality (2):"));
        assert!(formatted.contains("  - format.duration: 120 vs 121"));
        assert!(formatted.contains("      +a: 2"));
    }
}
