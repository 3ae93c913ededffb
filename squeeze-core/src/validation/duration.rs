//! Stream duration cross-check
//!
//! Containers disagree on where a stream's duration lives: MP4 reports a
//! plain `duration` in seconds, Matroska writes a `tags.DURATION` clock string
//! (`00:02:05.400000000`). The per-field tolerance rules ignore both, so this
//! check reads whichever is present on each side and compares them in seconds.

use crate::utils::parse_ffmpeg_time;
use crate::validation::flatten::{FlatFacts, FlatValue};
use crate::validation::report::{CheckKind, ValidationVerdict};

/// Parses a duration given either as seconds (`"125.400000"`) or as a clock
/// string with fractional seconds (`"00:02:05.400000"`).
pub fn parse_duration(value: &str) -> Option<f64> {
    let value = value.trim();
    let seconds = if value.contains(':') {
        parse_ffmpeg_time(value)?
    } else {
        value.parse::<f64>().ok()?
    };
    (seconds.is_finite() && seconds >= 0.0).then_some(seconds)
}

fn reported_duration<'a>(facts: &'a FlatFacts, index: usize, prefer_tags: bool) -> Option<&'a FlatValue> {
    let plain = facts.get(&format!("streams.{index}.duration"));
    let tagged = facts.get(&format!("streams.{index}.tags.duration"));
    if prefer_tags {
        tagged.or(plain)
    } else {
        plain.or(tagged)
    }
}

fn parse_fact(value: &FlatValue) -> Option<f64> {
    match value {
        FlatValue::String(s) => parse_duration(s),
        other => other.as_f64(),
    }
}

/// Compares the duration of each of the first `stream_count` streams.
///
/// A stream the original reports no duration for is skipped. Once the
/// original has one, a missing or unparsable duration on either side is a
/// failure.
pub fn check_stream_durations(
    original: &FlatFacts,
    converted: &FlatFacts,
    stream_count: usize,
    tolerance: f64,
    verdict: &mut ValidationVerdict,
) {
    for index in 0..stream_count {
        let subject = format!("stream {index}");
        let Some(original_raw) = reported_duration(original, index, false) else {
            log::debug!("Stream {index} reports no duration in the original, skipping duration check");
            continue;
        };
        let Some(converted_raw) = reported_duration(converted, index, true) else {
            verdict.add_failure(
                CheckKind::Duration,
                subject,
                format!("original duration {original_raw} but converted stream reports none"),
            );
            continue;
        };

        match (parse_fact(original_raw), parse_fact(converted_raw)) {
            (Some(a), Some(b)) => {
                let diff = (a - b).abs();
                if diff > tolerance {
                    verdict.add_failure(
                        CheckKind::Duration,
                        subject,
                        format!(
                            "original {original_raw} ({a:.6}s) != converted {converted_raw} ({b:.6}s), diff {diff:.6}s > {tolerance}s"
                        ),
                    );
                } else {
                    log::debug!("Stream {index} duration ok: {a:.6}s vs {b:.6}s");
                }
            }
            (a, b) => {
                verdict.add_failure(
                    CheckKind::Duration,
                    subject,
                    format!(
                        "unparsable duration: original {original_raw}{} converted {converted_raw}{}",
                        if a.is_none() { " (invalid)" } else { "" },
                        if b.is_none() { " (invalid)" } else { "" },
                    ),
                );
            }
        }
    }
}
