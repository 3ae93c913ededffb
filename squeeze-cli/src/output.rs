//! Terminal output for command results.
//!
//! Text reports go to stdout, styled with `console` (styling is dropped
//! automatically when stdout is not a terminal). Errors go to stderr.

use std::fmt::Display;

use console::style;
use serde::Serialize;
use serde_json::{Value, json};

use squeeze_core::{
    ConversionPlan, ConversionSummary, RunState, SqueezeError, TranscodeInstructions, ValidationVerdict,
};

use crate::error::CliResult;

/// Print a heading with a separator line
pub fn print_heading(text: &str) {
    let line = "=".repeat(50);
    println!("\n{}", style(&line).blue());
    println!(" {}", style(text).bold());
    println!("{}", style(&line).blue());
}

/// Print an info line with the label highlighted
pub fn print_info<T: Display>(label: &str, value: T) {
    println!("{}: {}", style(label).cyan(), value);
}

pub fn print_success(message: &str) {
    println!("{} {}", style("[OK]").green().bold(), message);
}

pub fn print_warning(message: &str) {
    println!("{} {}", style("[WARN]").yellow().bold(), message);
}

pub fn print_failure(message: &str) {
    println!("{} {}", style("[FAIL]").red().bold(), message);
}

/// Print an error to stderr
pub fn print_error(error: &SqueezeError) {
    eprintln!("{} {}", style("Error:").red().bold(), error);
}

/// Print a verdict under `title`, one line per failure
pub fn print_verdict(title: &str, verdict: &ValidationVerdict) {
    if verdict.passed() {
        print_success(&format!("{title}: passed"));
        return;
    }
    print_failure(&format!("{title}: {} failure(s)", verdict.failures().len()));
    for line in verdict.format().lines().skip(1) {
        println!("  {line}");
    }
}

pub fn print_plan(plan: &ConversionPlan, instructions: &TranscodeInstructions, ffmpeg: &str) {
    print_heading("Conversion Plan");
    print!("{plan}");
    print_info("Output", instructions.output_path.display());
    print_info("Command", instructions.command_line(ffmpeg));
}

pub fn print_summary(summary: &ConversionSummary) {
    print_heading("Conversion Accepted");
    println!("{summary}");
}

/// Print any serializable value as pretty JSON on stdout
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> CliResult<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Structured form of a rejected run, with the failure list when there is one
pub fn rejection_json(source: &std::path::Path, state: RunState, error: &SqueezeError) -> Value {
    let failures = match error {
        SqueezeError::EquivalenceViolation(verdict) | SqueezeError::QualityGateViolation(verdict) => {
            serde_json::to_value(verdict.failures()).unwrap_or(Value::Null)
        }
        _ => Value::Null,
    };
    json!({
        "outcome": "rejected",
        "source": source,
        "state": state,
        "error": error.to_string(),
        "failures": failures,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use squeeze_core::validation::CheckKind;
    use std::path::Path;

    #[test]
    fn test_rejection_json_lists_failures() {
        let mut verdict = ValidationVerdict::new();
        verdict.add_failure(CheckKind::Quality, "vmaf", "mean 94.0 <= 95.0");
        let error = SqueezeError::QualityGateViolation(verdict);

        let value = rejection_json(Path::new("clip.mov"), RunState::Reprobed, &error);
        assert_eq!(value["outcome"], "rejected");
        assert_eq!(value["state"], "reprobed");
        assert_eq!(value["failures"][0]["subject"], "vmaf");
    }

    #[test]
    fn test_rejection_json_without_verdict() {
        let error = SqueezeError::UnsupportedLayout("no streams".to_string());
        let value = rejection_json(Path::new("clip.mov"), RunState::Probed, &error);
        assert!(value["failures"].is_null());
        assert_eq!(value["error"], "Unsupported stream layout: no streams");
    }
}
