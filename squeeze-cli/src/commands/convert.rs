//! Implementation of the 'convert' subcommand.
//!
//! Runs the orchestrator on one file and reports the accepted summary, the
//! skip reason, or the rejection with its complete failure list.

use std::path::Path;

use log::info;
use serde_json::json;
use squeeze_core::{RunOutcome, SqueezeError};

use crate::cli::ConvertArgs;
use crate::commands::{build_orchestrator, default_scratch_dir, load_config, resolve_input};
use crate::error::CliResult;
use crate::output;

pub fn run_convert(args: ConvertArgs, config_path: Option<&Path>, json: bool) -> CliResult<bool> {
    let input = resolve_input(&args.input)?;
    let config = load_config(config_path, &args.encoder)?;
    let scratch_dir = args.scratch_dir.unwrap_or_else(default_scratch_dir);
    info!("Scratch directory: {}", scratch_dir.display());

    let orchestrator = build_orchestrator(config, !args.no_progress && !json)?.force(args.force);

    match orchestrator.run(&input, &scratch_dir) {
        RunOutcome::Accepted(summary) => {
            if json {
                output::print_json(&json!({"outcome": "accepted", "summary": summary}))?;
            } else {
                output::print_summary(&summary);
            }
            Ok(true)
        }
        RunOutcome::Skipped { reason } => {
            if json {
                output::print_json(&json!({"outcome": "skipped", "source": input, "reason": reason}))?;
            } else {
                output::print_warning(&format!("Skipped {}: {}", input.display(), reason));
            }
            Ok(true)
        }
        RunOutcome::Rejected { state, error } => {
            if json {
                output::print_json(&output::rejection_json(&input, state, &error))?;
            } else {
                output::print_heading("Conversion Rejected");
                output::print_info("Source", input.display());
                output::print_info("Last state", state);
                match &error {
                    SqueezeError::EquivalenceViolation(verdict) => output::print_verdict("Equivalence", verdict),
                    SqueezeError::QualityGateViolation(verdict) => output::print_verdict("Quality gate", verdict),
                    other => output::print_failure(&other.to_string()),
                }
            }
            Ok(false)
        }
    }
}
