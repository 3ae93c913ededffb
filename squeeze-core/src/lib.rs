//! Core library for deciding, re-encoding and certifying media files.
//!
//! Probes a file with ffprobe, decides per stream whether to copy or
//! re-encode, synthesizes the ffmpeg command, runs it, and only accepts the
//! result when its metadata is equivalent to the original and its VMAF score
//! clears the quality gate.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use squeeze_core::{Config, FfprobeProber, Orchestrator, RunOutcome, SidecarEngine, VmafScorer};
//! use std::path::Path;
//!
//! let config = Config::new();
//! let orchestrator = Orchestrator::new(
//!     config.clone(),
//!     FfprobeProber::new(&config.tools.ffprobe),
//!     SidecarEngine::new(&config.tools.ffmpeg),
//!     VmafScorer::new(&config.tools.ffmpeg, config.quality.n_subsample),
//! )
//! .unwrap();
//!
//! match orchestrator.run(Path::new("/media/clip.mov"), Path::new("/tmp/squeeze")) {
//!     RunOutcome::Accepted(summary) => println!("{summary}"),
//!     RunOutcome::Skipped { reason } => println!("skipped: {reason}"),
//!     RunOutcome::Rejected { state, error } => eprintln!("rejected after {state}: {error}"),
//! }
//! ```

pub mod config;
pub mod encoding;
pub mod error;
pub mod external;
pub mod media;
pub mod planning;
pub mod processing;
pub mod utils;
pub mod validation;

// Re-exports for public API
pub use config::Config;
pub use encoding::{CommandSynthesizer, Platform, TranscodeInstructions};
pub use error::{Result, SqueezeError};
pub use external::{QualityScorer, SidecarEngine, TranscodeEngine, VmafScorer};
pub use media::{FfprobeProber, MediaProbe, ProbeMode, Prober};
pub use planning::{ChangeDecision, Container, ConversionPlan, StreamPlanner};
pub use processing::{Comparison, ConversionSummary, Orchestrator, RunOutcome, RunState};
pub use utils::{format_bytes, format_duration, parse_ffmpeg_time};
pub use validation::{EquivalenceValidator, QualityGate, QualityReport, ValidationVerdict};
