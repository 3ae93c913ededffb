//! Perceptual quality gate
//!
//! The scorer reports pooled metrics (VMAF and friends) over the whole file;
//! the gate accepts the conversion only when both the mean and the worst
//! frame are strictly above their thresholds.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{Result, collaborator_error};
use crate::validation::report::{CheckKind, ValidationVerdict};

pub const DEFAULT_METRIC: &str = "vmaf";
pub const DEFAULT_MIN_MEAN: f64 = 95.0;
pub const DEFAULT_MIN_MIN: f64 = 90.0;

/// Aggregate of one metric over all scored frames.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PooledMetric {
    pub mean: f64,
    pub min: f64,
    pub max: f64,
    pub harmonic_mean: f64,
}

/// Pooled metrics keyed by metric name (`vmaf`, `psnr_y`, ...).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QualityReport {
    metrics: HashMap<String, PooledMetric>,
}

impl QualityReport {
    pub fn new(metrics: HashMap<String, PooledMetric>) -> Self {
        Self { metrics }
    }

    /// Reads the `pooled_metrics` section of a libvmaf JSON log.
    pub fn from_vmaf_log(json: &str) -> Result<Self> {
        #[derive(Deserialize)]
        struct VmafLog {
            pooled_metrics: HashMap<String, PooledMetric>,
        }

        let log: VmafLog = serde_json::from_str(json)
            .map_err(|e| collaborator_error("vmaf", format!("unreadable log: {e}"), ""))?;
        Ok(Self::new(log.pooled_metrics))
    }

    pub fn metric(&self, name: &str) -> Option<&PooledMetric> {
        self.metrics.get(name)
    }

    pub fn metrics(&self) -> &HashMap<String, PooledMetric> {
        &self.metrics
    }
}

/// Thresholds a [`QualityReport`] must clear.
#[derive(Debug, Clone, PartialEq)]
pub struct QualityGate {
    pub metric: String,
    pub min_mean: f64,
    pub min_min: f64,
}

impl Default for QualityGate {
    fn default() -> Self {
        Self {
            metric: DEFAULT_METRIC.to_string(),
            min_mean: DEFAULT_MIN_MEAN,
            min_min: DEFAULT_MIN_MIN,
        }
    }
}

impl QualityGate {
    pub fn new(metric: impl Into<String>, min_mean: f64, min_min: f64) -> Self {
        Self {
            metric: metric.into(),
            min_mean,
            min_min,
        }
    }

    /// Passes iff `mean > min_mean` and `min > min_min`. Non-finite scores
    /// never pass.
    pub fn evaluate(&self, report: &QualityReport) -> ValidationVerdict {
        let mut verdict = ValidationVerdict::new();

        let Some(scores) = report.metric(&self.metric) else {
            let mut available: Vec<&str> = report.metrics().keys().map(String::as_str).collect();
            available.sort_unstable();
            verdict.add_failure(
                CheckKind::Quality,
                &self.metric,
                format!("metric not reported (available: {})", available.join(", ")),
            );
            return verdict;
        };

        if !scores.mean.is_finite() || scores.mean <= self.min_mean {
            verdict.add_failure(
                CheckKind::Quality,
                &self.metric,
                format!("mean {:.2} is not above {:.2}", scores.mean, self.min_mean),
            );
        }
        if !scores.min.is_finite() || scores.min <= self.min_min {
            verdict.add_failure(
                CheckKind::Quality,
                &self.metric,
                format!("min {:.2} is not above {:.2}", scores.min, self.min_min),
            );
        }

        if verdict.passed() {
            log::info!(
                "{} passed: mean {:.2} (> {:.2}), min {:.2} (> {:.2})",
                self.metric,
                scores.mean,
                self.min_mean,
                scores.min,
                self.min_min
            );
        }
        verdict
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SqueezeError;

    fn report(mean: f64, min: f64) -> QualityReport {
        let mut metrics = HashMap::new();
        metrics.insert(
            "vmaf".to_string(),
            PooledMetric {
                mean,
                min,
                max: 100.0,
                harmonic_mean: mean,
            },
        );
        QualityReport::new(metrics)
    }

    #[test]
    fn test_thresholds_are_exclusive() {
        let gate = QualityGate::default();
        assert!(gate.evaluate(&report(95.1, 90.1)).passed());

        let at_mean = gate.evaluate(&report(95.0, 92.0));
        assert_eq!(at_mean.failures().len(), 1);
        assert!(at_mean.failures()[0].message.contains("95.00"));

        assert!(!gate.evaluate(&report(97.0, 90.0)).passed());
        assert_eq!(gate.evaluate(&report(80.0, 70.0)).failures().len(), 2);
    }

    #[test]
    fn test_non_finite_scores_fail() {
        let gate = QualityGate::default();

        let nan_mean = gate.evaluate(&report(f64::NAN, 97.0));
        assert_eq!(nan_mean.failures().len(), 1);
        assert!(nan_mean.failures()[0].message.starts_with("mean NaN"));

        let nan_min = gate.evaluate(&report(97.0, f64::NAN));
        assert_eq!(nan_min.failures().len(), 1);
        assert!(nan_min.failures()[0].message.starts_with("min NaN"));

        assert_eq!(gate.evaluate(&report(f64::NAN, f64::NAN)).failures().len(), 2);
        assert!(!gate.evaluate(&report(f64::INFINITY, 97.0)).passed());
    }

    #[test]
    fn test_missing_metric_fails() {
        let gate = QualityGate::new("ssim", 0.9, 0.8);
        let verdict = gate.evaluate(&report(99.0, 99.0));
        assert_eq!(verdict.failures().len(), 1);
        assert!(verdict.failures()[0].message.contains("vmaf"));
    }

    #[test]
    fn test_reads_pooled_metrics_from_vmaf_log() {
        let log = r#"{
            "version": "2.3.1",
            "frames": [{"frameNum": 0, "metrics": {"vmaf": 97.1}}],
            "pooled_metrics": {
                "vmaf": {"min": 93.2, "max": 99.8, "mean": 97.4, "harmonic_mean": 97.3},
                "psnr_y": {"min": 40.1, "max": 52.0, "mean": 45.5, "harmonic_mean": 45.2}
            }
        }"#;
        let report = QualityReport::from_vmaf_log(log).unwrap();
        assert_eq!(report.metrics().len(), 2);
        let vmaf = report.metric("vmaf").unwrap();
        assert_eq!(vmaf.mean, 97.4);
        assert_eq!(vmaf.min, 93.2);
        assert!(QualityGate::default().evaluate(&report).passed());

        assert!(matches!(
            QualityReport::from_vmaf_log(r#"{"frames": []}"#),
            Err(SqueezeError::CollaboratorInvocation { .. })
        ));
    }
}
