//! VMAF scoring through ffmpeg's libvmaf filter
//!
//! libvmaf writes its per-frame and pooled scores to a JSON log; the scorer
//! points the log at a temporary file and reads `pooled_metrics` back once
//! ffmpeg exits.

use std::path::Path;

use crate::error::{Result, collaborator_error};
use crate::external::ffmpeg_executor::{FfmpegSpawner, SidecarSpawner, run_ffmpeg};
use crate::validation::QualityReport;

/// Produces pooled quality metrics for a converted file against its original.
pub trait QualityScorer {
    fn score(&self, original: &Path, converted: &Path) -> Result<QualityReport>;
}

/// [`QualityScorer`] running ffmpeg with libvmaf (plus PSNR).
#[derive(Debug, Clone)]
pub struct VmafScorer<S: FfmpegSpawner = SidecarSpawner> {
    ffmpeg: String,
    n_subsample: u32,
    spawner: S,
}

impl VmafScorer<SidecarSpawner> {
    pub fn new(ffmpeg: impl Into<String>, n_subsample: u32) -> Self {
        Self::with_spawner(ffmpeg, n_subsample, SidecarSpawner)
    }
}

impl<S: FfmpegSpawner> VmafScorer<S> {
    pub fn with_spawner(ffmpeg: impl Into<String>, n_subsample: u32, spawner: S) -> Self {
        Self {
            ffmpeg: ffmpeg.into(),
            n_subsample: n_subsample.max(1),
            spawner,
        }
    }

    /// Filter graph comparing input 1 (distorted) against input 0 (reference).
    fn filter(&self, log_path: &Path) -> String {
        format!(
            "[1:v][0:v]libvmaf=feature='name=psnr':log_fmt=json:log_path={}:n_subsample={}",
            escape_filter_value(&log_path.to_string_lossy()),
            self.n_subsample
        )
    }

    fn args(&self, original: &Path, converted: &Path, log_path: &Path) -> Vec<String> {
        vec![
            "-i".to_string(),
            original.to_string_lossy().into_owned(),
            "-i".to_string(),
            converted.to_string_lossy().into_owned(),
            "-lavfi".to_string(),
            self.filter(log_path),
            "-f".to_string(),
            "null".to_string(),
            "-".to_string(),
        ]
    }
}

impl<S: FfmpegSpawner> QualityScorer for VmafScorer<S> {
    fn score(&self, original: &Path, converted: &Path) -> Result<QualityReport> {
        for path in [original, converted] {
            if !path.is_file() {
                return Err(collaborator_error("vmaf", format!("file not found: {}", path.display()), ""));
            }
        }

        let log_file = tempfile::Builder::new()
            .prefix("squeeze-vmaf-")
            .suffix(".json")
            .tempfile()?;
        log::info!("Scoring {} against {}", converted.display(), original.display());

        run_ffmpeg(&self.spawner, &self.ffmpeg, &self.args(original, converted, log_file.path()), |_| {})?;

        let log = std::fs::read_to_string(log_file.path())?;
        if log.trim().is_empty() {
            return Err(collaborator_error("vmaf", "libvmaf wrote an empty log", ""));
        }
        let report = QualityReport::from_vmaf_log(&log)?;
        log::debug!("Pooled metrics: {:?}", report.metrics().keys().collect::<Vec<_>>());
        Ok(report)
    }
}

/// Escapes a value for use as a filter option inside a filtergraph.
///
/// The option parser and the filtergraph parser each strip one level, so the
/// value is escaped for the option first and for the graph second.
fn escape_filter_value(value: &str) -> String {
    let option = escape_chars(value, &['\\', ':', '\'']);
    escape_chars(&option, &['\\', '\'', '[', ']', ',', ';'])
}

fn escape_chars(value: &str, special: &[char]) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if special.contains(&c) {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
