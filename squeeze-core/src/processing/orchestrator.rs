// ============================================================================
// squeeze-core/src/processing/orchestrator.rs
// ============================================================================
//
// ORCHESTRATOR: One file from probe to accepted or rejected conversion
//
// WORKFLOW:
// 1. Fast probe of the source, bit rate gate
// 2. Plan stream decisions and synthesize the ffmpeg command
// 3. Run the transcode into the scratch directory
// 4. Thorough probes of the source and the output
// 5. Equivalence checks, VMAF scoring, quality gate
// 6. Accept with a summary, or reject and remove the output
//
// Every stage runs once, in order. The first failure ends the run.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use log::{debug, error, info, warn};

use crate::config::Config;
use crate::encoding::{CommandSynthesizer, Platform, TranscodeInstructions};
use crate::error::{Result, SqueezeError};
use crate::external::{FileMetadataProvider, QualityScorer, StdFsMetadataProvider, TranscodeEngine};
use crate::media::{MediaProbe, ProbeMode, Prober};
use crate::planning::{ConversionPlan, StreamPlanner};
use crate::utils::{calculate_size_reduction, format_bytes, format_duration};
use crate::validation::{EquivalenceValidator, QualityGate, QualityReport, require_equivalent, require_quality};

use super::summary::{Comparison, ConversionSummary, QualityComparison, RunOutcome, RunState};

/// Drives a single conversion through its stages.
pub struct Orchestrator<P, T, Q, M = StdFsMetadataProvider> {
    prober: P,
    engine: T,
    scorer: Q,
    metadata: M,
    config: Config,
    validator: EquivalenceValidator,
    gate: QualityGate,
    platform: Platform,
    force: bool,
}

/// Mutable bookkeeping of a run in progress.
struct RunProgress {
    state: RunState,
    output: Option<PathBuf>,
}

impl<P, T, Q> Orchestrator<P, T, Q, StdFsMetadataProvider>
where
    P: Prober,
    T: TranscodeEngine,
    Q: QualityScorer,
{
    /// Fails when the configured tolerance table does not compile.
    pub fn new(config: Config, prober: P, engine: T, scorer: Q) -> Result<Self> {
        let validator = config.validation.equivalence_validator()?;
        let gate = config.quality.gate();
        Ok(Self {
            prober,
            engine,
            scorer,
            metadata: StdFsMetadataProvider,
            config,
            validator,
            gate,
            platform: Platform::current(),
            force: false,
        })
    }
}

impl<P, T, Q, M> Orchestrator<P, T, Q, M>
where
    P: Prober,
    T: TranscodeEngine,
    Q: QualityScorer,
    M: FileMetadataProvider,
{
    pub fn with_metadata_provider<N: FileMetadataProvider>(self, metadata: N) -> Orchestrator<P, T, Q, N> {
        Orchestrator {
            prober: self.prober,
            engine: self.engine,
            scorer: self.scorer,
            metadata,
            config: self.config,
            validator: self.validator,
            gate: self.gate,
            platform: self.platform,
            force: self.force,
        }
    }

    pub fn with_platform(mut self, platform: Platform) -> Self {
        self.platform = platform;
        self
    }

    /// Convert even when the bit rate gate would skip the file.
    pub fn force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    fn synthesizer(&self) -> CommandSynthesizer {
        CommandSynthesizer::new(self.config.encoding.clone(), self.platform)
    }

    /// Converts `source` into `scratch_dir` and certifies the result.
    ///
    /// Never returns an error: failures are reported as
    /// [`RunOutcome::Rejected`], after the output file has been removed.
    pub fn run(&self, source: &Path, scratch_dir: &Path) -> RunOutcome {
        info!("Processing: {}", source.display());
        let mut progress = RunProgress {
            state: RunState::Started,
            output: None,
        };

        match self.execute(source, scratch_dir, &mut progress) {
            Ok(outcome) => outcome,
            Err(error) => {
                error!("Rejected {} after state '{}': {}", source.display(), progress.state, error);
                if let Some(output) = &progress.output {
                    remove_output(output);
                }
                RunOutcome::Rejected {
                    state: progress.state,
                    error,
                }
            }
        }
    }

    fn execute(&self, source: &Path, scratch_dir: &Path, progress: &mut RunProgress) -> Result<RunOutcome> {
        // ========================================================================
        // PROBE AND GATE
        // ========================================================================
        let probe = self.prober.probe(source, ProbeMode::Fast)?;
        progress.state = RunState::Probed;

        if let Some(reason) = self.skip_reason(&probe)? {
            info!("Skipping {}: {}", source.display(), reason);
            return Ok(RunOutcome::Skipped { reason });
        }

        // ========================================================================
        // PLAN
        // ========================================================================
        let plan = StreamPlanner::new().plan(&probe, source)?;
        let instructions = self.synthesizer().synthesize(&plan, source, scratch_dir)?;
        progress.state = RunState::PlanBuilt;

        // ========================================================================
        // CONVERT
        // ========================================================================
        fs::create_dir_all(scratch_dir).map_err(|e| {
            SqueezeError::Path(format!("Failed to create scratch directory '{}': {}", scratch_dir.display(), e))
        })?;
        // an output left by an earlier run is only ours to remove once overwritten
        let output = instructions.output_path.clone();
        if !output.exists() {
            progress.output = Some(output.clone());
        }

        let start = Instant::now();
        self.engine.transcode(&instructions)?;
        let encode_seconds = start.elapsed().as_secs_f64();
        progress.output = Some(output);
        progress.state = RunState::Converted;
        info!("Encoded in {}", format_duration(encode_seconds));

        // ========================================================================
        // REPROBE
        // ========================================================================
        let original = self.prober.probe(source, ProbeMode::Thorough)?;
        let converted = self.prober.probe(&instructions.output_path, ProbeMode::Thorough)?;
        progress.state = RunState::Reprobed;

        // ========================================================================
        // VALIDATE
        // ========================================================================
        require_equivalent(&self.validator, &original, &converted)?;
        info!("Converted file is equivalent to the original");

        let report = self.scorer.score(source, &instructions.output_path)?;
        require_quality(&self.gate, &report)?;
        progress.state = RunState::Validated;

        // ========================================================================
        // ACCEPT
        // ========================================================================
        let summary = self.summarize(source, &probe, plan, &instructions, encode_seconds, &report)?;
        info!(
            "Accepted: {} -> {} (reduced by {:.1}%)",
            format_bytes(summary.original_size),
            format_bytes(summary.converted_size),
            summary.size_reduction
        );
        Ok(RunOutcome::Accepted(summary))
    }

    /// Reason to leave the file alone, if any.
    fn skip_reason(&self, probe: &MediaProbe) -> Result<Option<String>> {
        if self.force {
            debug!("Bit rate gate bypassed");
            return Ok(None);
        }
        let bit_rate = probe
            .bit_rate()
            .ok_or_else(|| SqueezeError::MalformedProbe("format.bit_rate is missing or not a number".to_string()))?;
        let min_bitrate = self.config.selection.min_bitrate;
        if bit_rate < min_bitrate {
            return Ok(Some(format!(
                "bit rate {} kb/s is below the {} kb/s threshold",
                bit_rate / 1000,
                min_bitrate / 1000
            )));
        }
        Ok(None)
    }

    fn summarize(
        &self,
        source: &Path,
        probe: &MediaProbe,
        plan: ConversionPlan,
        instructions: &TranscodeInstructions,
        encode_seconds: f64,
        report: &QualityReport,
    ) -> Result<ConversionSummary> {
        let original_size = self.metadata.get_size(source)?;
        let converted_size = self.metadata.get_size(&instructions.output_path)?;
        let speed_ratio = match probe.duration() {
            Some(duration) if encode_seconds > 0.0 => Some(duration / encode_seconds),
            _ => None,
        };
        let quality_mean = report.metric(&self.gate.metric).map_or(f64::NAN, |m| m.mean);

        Ok(ConversionSummary {
            source: source.to_path_buf(),
            output: instructions.output_path.clone(),
            original_size,
            converted_size,
            size_reduction: calculate_size_reduction(original_size, converted_size),
            encode_seconds,
            speed_ratio,
            quality_metric: self.gate.metric.clone(),
            quality_mean,
            crf: self.config.encoding.crf,
            preset: self.config.encoding.preset.clone(),
            plan,
        })
    }

    /// Plans `source` and synthesizes its command without running anything.
    pub fn plan_only(&self, source: &Path, scratch_dir: &Path) -> Result<(ConversionPlan, TranscodeInstructions)> {
        let probe = self.prober.probe(source, ProbeMode::Fast)?;
        let plan = StreamPlanner::new().plan(&probe, source)?;
        let instructions = self.synthesizer().synthesize(&plan, source, scratch_dir)?;
        Ok((plan, instructions))
    }

    /// Checks an existing conversion against its original.
    ///
    /// Collaborator failures are errors; failed checks are reported in the
    /// returned verdicts.
    pub fn compare(&self, original: &Path, converted: &Path, score_quality: bool) -> Result<Comparison> {
        let original_probe = self.prober.probe(original, ProbeMode::Thorough)?;
        let converted_probe = self.prober.probe(converted, ProbeMode::Thorough)?;
        let equivalence = self.validator.validate(&original_probe, &converted_probe);

        let quality = if score_quality {
            let report = self.scorer.score(original, converted)?;
            let verdict = self.gate.evaluate(&report);
            Some(QualityComparison { report, verdict })
        } else {
            None
        };

        Ok(Comparison { equivalence, quality })
    }
}

fn remove_output(path: &Path) {
    if !path.exists() {
        return;
    }
    match fs::remove_file(path) {
        Ok(()) => info!("Removed rejected output {}", path.display()),
        Err(e) => warn!("Failed to remove rejected output {}: {}", path.display(), e),
    }
}
