//! Implementation of the 'compare' subcommand.
//!
//! Checks a file converted earlier (or by another tool) against its original
//! with the same equivalence checks and quality gate `convert` uses.

use std::path::Path;

use crate::cli::{CompareArgs, EncoderOverrides};
use crate::commands::{build_orchestrator, load_config, resolve_input};
use crate::error::CliResult;
use crate::output;

pub fn run_compare(args: CompareArgs, config_path: Option<&Path>, json: bool) -> CliResult<bool> {
    let original = resolve_input(&args.original)?;
    let converted = resolve_input(&args.converted)?;
    let config = load_config(config_path, &EncoderOverrides::default())?;

    let orchestrator = build_orchestrator(config, false)?;
    let comparison = orchestrator.compare(&original, &converted, !args.no_quality)?;

    if json {
        output::print_json(&comparison)?;
    } else {
        output::print_heading("Comparison");
        output::print_info("Original", original.display());
        output::print_info("Converted", converted.display());
        output::print_verdict("Equivalence", &comparison.equivalence);
        if let Some(quality) = &comparison.quality {
            for (name, metric) in sorted_metrics(quality) {
                output::print_info(
                    name,
                    format!("mean {:.2}, min {:.2}, max {:.2}", metric.mean, metric.min, metric.max),
                );
            }
            output::print_verdict("Quality gate", &quality.verdict);
        }
    }
    Ok(comparison.passed())
}

fn sorted_metrics(
    quality: &squeeze_core::processing::QualityComparison,
) -> Vec<(&str, &squeeze_core::validation::PooledMetric)> {
    let mut metrics: Vec<_> = quality.report.metrics().iter().map(|(k, v)| (k.as_str(), v)).collect();
    metrics.sort_by(|a, b| a.0.cmp(b.0));
    metrics
}
