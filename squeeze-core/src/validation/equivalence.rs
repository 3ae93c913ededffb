//! Structural equivalence of an original and a converted file
//!
//! Both probes are flattened and every path present on either side is
//! classified by the tolerance table. Tolerance and language rules are checked
//! field by field; unclassified paths must match exactly and are reported as a
//! unified diff. The per-stream duration and frame-count cross-checks run
//! afterwards. Every failure is collected into one verdict.

use std::collections::BTreeSet;

use similar::TextDiff;

use crate::media::MediaProbe;
use crate::validation::duration::check_stream_durations;
use crate::validation::flatten::{FlatFacts, FlatValue, flatten};
use crate::validation::report::{CheckKind, ValidationVerdict};
use crate::validation::rules::{RuleKind, ToleranceRules};

pub const DEFAULT_UNDETERMINED_LANGUAGE: &str = "und";
pub const DEFAULT_DURATION_TOLERANCE: f64 = 0.2;
pub const DEFAULT_FRAME_TOLERANCE: u64 = 10;

/// Compares two probes under a tolerance table.
#[derive(Debug, Clone)]
pub struct EquivalenceValidator {
    rules: ToleranceRules,
    undetermined_language: String,
    duration_tolerance: f64,
    frame_tolerance: u64,
}

impl EquivalenceValidator {
    pub fn new(rules: ToleranceRules) -> Self {
        Self {
            rules,
            undetermined_language: DEFAULT_UNDETERMINED_LANGUAGE.to_string(),
            duration_tolerance: DEFAULT_DURATION_TOLERANCE,
            frame_tolerance: DEFAULT_FRAME_TOLERANCE,
        }
    }

    pub fn with_undetermined_language(mut self, sentinel: impl Into<String>) -> Self {
        self.undetermined_language = sentinel.into();
        self
    }

    pub fn with_duration_tolerance(mut self, seconds: f64) -> Self {
        self.duration_tolerance = seconds;
        self
    }

    pub fn with_frame_tolerance(mut self, frames: u64) -> Self {
        self.frame_tolerance = frames;
        self
    }

    pub fn rules(&self) -> &ToleranceRules {
        &self.rules
    }

    /// Runs every check and returns the complete list of failures.
    pub fn validate(&self, original: &MediaProbe, converted: &MediaProbe) -> ValidationVerdict {
        let original_facts = flatten(original);
        let converted_facts = flatten(converted);
        log::debug!(
            "Comparing {} original fact(s) against {} converted fact(s)",
            original_facts.len(),
            converted_facts.len()
        );

        let mut verdict = ValidationVerdict::new();
        let paths: BTreeSet<&String> = original_facts.keys().chain(converted_facts.keys()).collect();

        let mut strict_paths = Vec::new();
        for path in paths {
            let before = original_facts.get(path);
            let after = converted_facts.get(path);
            match self.rules.classify(path).map(|rule| rule.kind) {
                None => strict_paths.push(path.as_str()),
                Some(RuleKind::Ignore) => {}
                Some(RuleKind::NumericClose { tolerance }) => check_close(
                    &mut verdict,
                    CheckKind::NumericTolerance,
                    path,
                    before,
                    after,
                    tolerance,
                    FlatValue::as_f64,
                ),
                Some(RuleKind::RationalClose { tolerance }) => check_close(
                    &mut verdict,
                    CheckKind::RationalTolerance,
                    path,
                    before,
                    after,
                    tolerance,
                    parse_rational,
                ),
                Some(RuleKind::EqualOrUndetermined) => self.check_language(&mut verdict, path, before, after),
            }
        }

        check_strict(&mut verdict, &strict_paths, &original_facts, &converted_facts);
        check_stream_durations(
            &original_facts,
            &converted_facts,
            original.streams().len(),
            self.duration_tolerance,
            &mut verdict,
        );
        self.check_frame_counts(&mut verdict, &original_facts, &converted_facts, original.streams().len());

        if verdict.passed() {
            log::info!("Converted file is structurally equivalent to the original");
        }
        verdict
    }

    fn check_language(
        &self,
        verdict: &mut ValidationVerdict,
        path: &str,
        before: Option<&FlatValue>,
        after: Option<&FlatValue>,
    ) {
        let undetermined = before.and_then(FlatValue::as_str) == Some(self.undetermined_language.as_str());
        if undetermined || before == after {
            return;
        }
        verdict.add_failure(
            CheckKind::Language,
            path,
            format!("original {} != converted {}", show(before), show(after)),
        );
    }

    fn check_frame_counts(
        &self,
        verdict: &mut ValidationVerdict,
        original: &FlatFacts,
        converted: &FlatFacts,
        stream_count: usize,
    ) {
        for index in 0..stream_count {
            let path = format!("streams.{index}.nb_read_frames");
            let before = original.get(&path);
            let after = converted.get(&path);
            if before.is_none() && after.is_none() {
                continue;
            }

            match (before.and_then(frame_count), after.and_then(frame_count)) {
                (Some(a), Some(b)) => {
                    let diff = a.abs_diff(b);
                    if diff > self.frame_tolerance {
                        verdict.add_failure(
                            CheckKind::FrameCount,
                            format!("stream {index}"),
                            format!("original {a} frames, converted {b} frames, diff {diff} > {}", self.frame_tolerance),
                        );
                    }
                }
                _ => verdict.add_failure(
                    CheckKind::FrameCount,
                    format!("stream {index}"),
                    format!("frame count not comparable: original {} converted {}", show(before), show(after)),
                ),
            }
        }
    }
}

fn check_close(
    verdict: &mut ValidationVerdict,
    check: CheckKind,
    path: &str,
    before: Option<&FlatValue>,
    after: Option<&FlatValue>,
    tolerance: f64,
    parse: fn(&FlatValue) -> Option<f64>,
) {
    let (Some(before), Some(after)) = (before, after) else {
        verdict.add_failure(
            check,
            path,
            format!("present on one side only: original {} converted {}", show(before), show(after)),
        );
        return;
    };
    // ffprobe writes "0/0" or "N/A" for rates that do not apply; identical text is equal
    if before == after {
        return;
    }

    match (parse(before), parse(after)) {
        (Some(a), Some(b)) => {
            let diff = (a - b).abs();
            if diff > tolerance {
                verdict.add_failure(
                    check,
                    path,
                    format!("original {before} ({a}) vs converted {after} ({b}), diff {diff:.6} > {tolerance}"),
                );
            }
        }
        _ => verdict.add_failure(
            check,
            path,
            format!("unparsable value: original {before} converted {after}"),
        ),
    }
}

fn check_strict(verdict: &mut ValidationVerdict, paths: &[&str], original: &FlatFacts, converted: &FlatFacts) {
    let differing: Vec<&str> = paths
        .iter()
        .copied()
        .filter(|path| original.get(*path) != converted.get(*path))
        .collect();
    if differing.is_empty() {
        return;
    }

    let before = strict_lines(paths, original);
    let after = strict_lines(paths, converted);
    let diff = TextDiff::from_lines(&before, &after)
        .unified_diff()
        .context_radius(0)
        .header("original", "converted")
        .to_string();

    verdict.add_failure(
        CheckKind::Metadata,
        differing.join(", "),
        format!("{} field(s) differ\n{}", differing.len(), diff.trim_end()),
    );
}

fn strict_lines(paths: &[&str], facts: &FlatFacts) -> String {
    let mut lines = String::new();
    for path in paths {
        if let Some(value) = facts.get(*path) {
            lines.push_str(&format!("{path}: {value}\n"));
        }
    }
    lines
}

/// Reads `num/den` as a number; plain numbers are accepted as-is.
pub fn parse_rational(value: &FlatValue) -> Option<f64> {
    let FlatValue::String(text) = value else {
        return value.as_f64();
    };
    match text.split_once('/') {
        Some((num, den)) => {
            let num: f64 = num.trim().parse().ok()?;
            let den: f64 = den.trim().parse().ok()?;
            (den != 0.0).then(|| num / den)
        }
        None => value.as_f64(),
    }
}

fn frame_count(value: &FlatValue) -> Option<u64> {
    value
        .as_f64()
        .filter(|count| *count >= 0.0 && count.fract() == 0.0)
        .map(|count| count as u64)
}

fn show(value: Option<&FlatValue>) -> String {
    value.map_or_else(|| "<missing>".to_string(), ToString::to_string)
}
