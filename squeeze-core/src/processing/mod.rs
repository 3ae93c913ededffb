//! Conversion orchestration.
//!
//! Runs one file through probe, plan, transcode, reprobe and validation, and
//! reports whether the conversion was accepted, skipped or rejected.

pub mod orchestrator;
pub mod summary;

pub use orchestrator::Orchestrator;
pub use summary::{Comparison, ConversionSummary, QualityComparison, RunOutcome, RunState};
