//! Run outcomes and the acceptance summary.

use std::fmt;
use std::path::PathBuf;

use serde::Serialize;

use crate::error::SqueezeError;
use crate::planning::ConversionPlan;
use crate::utils::{format_bytes, format_duration};
use crate::validation::{QualityReport, ValidationVerdict};

/// Stages of a conversion run, in the order they are reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunState {
    /// Nothing done yet
    Started,
    /// Source probed (fast)
    Probed,
    /// Stream decisions and container resolved
    PlanBuilt,
    /// ffmpeg wrote the output file
    Converted,
    /// Both files probed again (thorough)
    Reprobed,
    /// Equivalence and quality checks passed
    Validated,
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RunState::Started => "started",
            RunState::Probed => "probed",
            RunState::PlanBuilt => "plan built",
            RunState::Converted => "converted",
            RunState::Reprobed => "reprobed",
            RunState::Validated => "validated",
        };
        write!(f, "{name}")
    }
}

/// Statistics of an accepted conversion.
#[derive(Debug, Clone, Serialize)]
pub struct ConversionSummary {
    pub source: PathBuf,
    pub output: PathBuf,
    pub original_size: u64,
    pub converted_size: u64,
    /// Percent saved; negative when the output is larger
    pub size_reduction: f64,
    /// Wall-clock seconds spent in ffmpeg
    pub encode_seconds: f64,
    /// Source duration divided by encode time
    pub speed_ratio: Option<f64>,
    pub quality_metric: String,
    pub quality_mean: f64,
    pub crf: u8,
    pub preset: String,
    pub plan: ConversionPlan,
}

impl fmt::Display for ConversionSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Source:        {}", self.source.display())?;
        writeln!(f, "Output:        {}", self.output.display())?;
        writeln!(f, "Encoder:       libx265 crf {} preset {}", self.crf, self.preset)?;
        writeln!(f, "Encode time:   {}", format_duration(self.encode_seconds))?;
        match self.speed_ratio {
            Some(ratio) => writeln!(f, "Speed:         {ratio:.2}x")?,
            None => writeln!(f, "Speed:         unknown")?,
        }
        writeln!(f, "Original size: {}", format_bytes(self.original_size))?;
        writeln!(f, "New size:      {}", format_bytes(self.converted_size))?;
        writeln!(f, "Reduced by:    {:.1}%", self.size_reduction)?;
        write!(f, "Quality:       {} mean {:.2}", self.quality_metric, self.quality_mean)
    }
}

/// What became of one file.
#[derive(Debug)]
pub enum RunOutcome {
    /// Converted, validated and kept in the scratch directory
    Accepted(ConversionSummary),
    /// Not converted: the gate before planning turned it down
    Skipped { reason: String },
    /// Failed; any output file has been removed
    Rejected {
        /// Last state reached before the failure
        state: RunState,
        error: SqueezeError,
    },
}

impl RunOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, RunOutcome::Accepted(_))
    }
}

/// Verdicts of checking an existing conversion against its original.
#[derive(Debug, Clone, Serialize)]
pub struct Comparison {
    pub equivalence: ValidationVerdict,
    /// Present when quality scoring was requested
    pub quality: Option<QualityComparison>,
}

#[derive(Debug, Clone, Serialize)]
pub struct QualityComparison {
    pub report: QualityReport,
    pub verdict: ValidationVerdict,
}

impl Comparison {
    pub fn passed(&self) -> bool {
        self.equivalence.passed() && self.quality.as_ref().is_none_or(|q| q.verdict.passed())
    }
}
