// ============================================================================
// squeeze-core/src/external/ffmpeg_executor.rs
// ============================================================================
//
// FFMPEG EXECUTOR: FFmpeg Process Management and the Transcode Engine
//
// This module provides abstractions for spawning and interacting with FFmpeg
// processes, and the engine that runs synthesized transcode instructions.
//
// KEY COMPONENTS:
// - FfmpegProcess: Trait representing an active FFmpeg process
// - FfmpegSpawner: Trait for creating new FFmpeg processes
// - SidecarSpawner: Concrete implementation using ffmpeg-sidecar
// - TranscodeEngine / SidecarEngine: runs one TranscodeInstructions to completion

use std::process::ExitStatus;
use std::time::Duration;

use ffmpeg_sidecar::child::FfmpegChild as SidecarChild;
use ffmpeg_sidecar::command::FfmpegCommand;
use ffmpeg_sidecar::event::{FfmpegEvent, LogLevel};
use indicatif::{ProgressBar, ProgressStyle};

use crate::encoding::TranscodeInstructions;
use crate::error::{Result, collaborator_error};

// --- FFmpeg Execution Abstraction ---

/// Trait representing an active ffmpeg process instance.
pub trait FfmpegProcess {
    /// Processes events from the running command using a provided handler closure.
    fn handle_events<F>(&mut self, handler: F) -> Result<()>
    where
        F: FnMut(FfmpegEvent) -> Result<()>;

    /// Waits for the command to complete and returns its exit status.
    fn wait(&mut self) -> Result<ExitStatus>;
}

/// Trait representing something that can spawn an FfmpegProcess.
pub trait FfmpegSpawner {
    type Process: FfmpegProcess;
    /// Spawns the ffmpeg command, consuming the command object.
    fn spawn(&self, cmd: FfmpegCommand) -> Result<Self::Process>;
}

// --- Concrete Implementation using ffmpeg-sidecar ---

/// Wrapper around `ffmpeg_sidecar::child::FfmpegChild` implementing `FfmpegProcess`.
pub struct SidecarProcess(SidecarChild);

impl FfmpegProcess for SidecarProcess {
    fn handle_events<F>(&mut self, mut handler: F) -> Result<()>
    where
        F: FnMut(FfmpegEvent) -> Result<()>,
    {
        let iterator = self.0.iter().map_err(|e| {
            log::error!("Failed to get ffmpeg event iterator: {}", e);
            collaborator_error("ffmpeg", "could not read process output", e.to_string())
        })?;
        for event in iterator {
            handler(event)?;
        }
        Ok(())
    }

    fn wait(&mut self) -> Result<ExitStatus> {
        self.0
            .wait()
            .map_err(|e| collaborator_error("ffmpeg", format!("failed to wait for process: {e}"), ""))
    }
}

/// Concrete implementation of `FfmpegSpawner` using `ffmpeg-sidecar`.
#[derive(Debug, Clone, Default)]
pub struct SidecarSpawner;

impl FfmpegSpawner for SidecarSpawner {
    type Process = SidecarProcess;

    fn spawn(&self, mut cmd: FfmpegCommand) -> Result<Self::Process> {
        cmd.spawn()
            .map(SidecarProcess)
            .map_err(|e| collaborator_error("ffmpeg", format!("failed to start: {e}"), ""))
    }
}

/// Runs ffmpeg with `args`, collecting error output, and fails on a non-zero exit.
///
/// `on_event` sees every event before it is inspected for errors.
pub(crate) fn run_ffmpeg<S, F>(spawner: &S, ffmpeg: &str, args: &[String], mut on_event: F) -> Result<()>
where
    S: FfmpegSpawner,
    F: FnMut(&FfmpegEvent),
{
    let mut cmd = FfmpegCommand::new_with_path(ffmpeg);
    cmd.args(args);
    crate::external::log_command(cmd.as_inner());

    let mut process = spawner.spawn(cmd)?;
    let mut diagnostics = Vec::new();
    process.handle_events(|event| {
        on_event(&event);
        match event {
            FfmpegEvent::Log(LogLevel::Error | LogLevel::Fatal, line) | FfmpegEvent::Error(line) => {
                log::debug!("ffmpeg: {line}");
                diagnostics.push(line);
            }
            _ => {}
        }
        Ok(())
    })?;

    let status = process.wait()?;
    if !status.success() {
        log::error!("ffmpeg exited with {status}");
        return Err(collaborator_error("ffmpeg", format!("exited with {status}"), diagnostics.join("\n")));
    }
    Ok(())
}

// --- Transcode Engine ---

/// Runs a synthesized transcode.
pub trait TranscodeEngine {
    fn transcode(&self, instructions: &TranscodeInstructions) -> Result<()>;
}

/// [`TranscodeEngine`] that runs ffmpeg through ffmpeg-sidecar, showing a
/// spinner with the encoder's position and speed.
#[derive(Debug, Clone)]
pub struct SidecarEngine<S: FfmpegSpawner = SidecarSpawner> {
    ffmpeg: String,
    spawner: S,
    show_progress: bool,
}

impl SidecarEngine<SidecarSpawner> {
    pub fn new(ffmpeg: impl Into<String>) -> Self {
        Self::with_spawner(ffmpeg, SidecarSpawner)
    }
}

impl<S: FfmpegSpawner> SidecarEngine<S> {
    pub fn with_spawner(ffmpeg: impl Into<String>, spawner: S) -> Self {
        Self {
            ffmpeg: ffmpeg.into(),
            spawner,
            show_progress: true,
        }
    }

    pub fn show_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    fn progress_bar(&self) -> ProgressBar {
        if !self.show_progress {
            return ProgressBar::hidden();
        }
        let bar = ProgressBar::new_spinner();
        bar.set_style(
            ProgressStyle::with_template("{spinner:.green} [{elapsed_precise}] {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        bar.enable_steady_tick(Duration::from_millis(120));
        bar
    }
}

impl<S: FfmpegSpawner> TranscodeEngine for SidecarEngine<S> {
    fn transcode(&self, instructions: &TranscodeInstructions) -> Result<()> {
        log::info!("Encoding to {}", instructions.output_path.display());
        let bar = self.progress_bar();
        let result = run_ffmpeg(&self.spawner, &self.ffmpeg, &instructions.args, |event| {
            if let FfmpegEvent::Progress(progress) = event {
                bar.set_message(format!(
                    "time {} | frame {} | {:.1} fps | {:.2}x",
                    progress.time, progress.frame, progress.fps, progress.speed
                ));
            }
        });
        bar.finish_and_clear();
        result?;

        if !instructions.output_path.is_file() {
            return Err(collaborator_error(
                "ffmpeg",
                format!("no output written to {}", instructions.output_path.display()),
                "",
            ));
        }
        Ok(())
    }
}


#[cfg(all(test, unix))]
mod tests {
    use super::test_support::*;
    use super::*;
    use crate::error::SqueezeError;
    use std::path::PathBuf;

    fn instructions(output: PathBuf) -> TranscodeInstructions {
        TranscodeInstructions {
            args: vec!["-y".to_string(), "-i".to_string(), "in.mov".to_string(), output.to_string_lossy().into_owned()],
            output_path: output,
        }
    }

    #[test]
    fn test_transcode_passes_arguments_through() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("in.CONVERTED.mkv");
        let written = output.clone();
        let spawner = ScriptedSpawner::new(move |_: &[String]| {
            std::fs::write(&written, b"encoded").unwrap();
            ScriptedProcess { events: vec![FfmpegEvent::Done], exit_code: 0 }
        });
        let calls = spawner.calls.clone();

        let engine = SidecarEngine::with_spawner("ffmpeg", spawner).show_progress(false);
        engine.transcode(&instructions(output.clone())).unwrap();

        let calls = calls.borrow();
        assert_eq!(calls.len(), 1);
        assert!(calls[0].ends_with(&["-y".to_string(), "-i".to_string(), "in.mov".to_string(), output.to_string_lossy().into_owned()]));
    }

    #[test]
    fn test_non_zero_exit_carries_error_lines() {
        let dir = tempfile::tempdir().unwrap();
        let spawner = ScriptedSpawner::new(|_: &[String]| ScriptedProcess {
            events: vec![
                FfmpegEvent::Log(LogLevel::Info, "Stream mapping:".to_string()),
                FfmpegEvent::Log(LogLevel::Error, "Unknown encoder 'libx265'".to_string()),
                FfmpegEvent::Error("Conversion failed!".to_string()),
            ],
            exit_code: 1,
        });

        let engine = SidecarEngine::with_spawner("ffmpeg", spawner).show_progress(false);
        match engine.transcode(&instructions(dir.path().join("x.mkv"))) {
            Err(SqueezeError::CollaboratorInvocation { tool, diagnostics, .. }) => {
                assert_eq!(tool, "ffmpeg");
                assert!(diagnostics.contains("Unknown encoder 'libx265'"));
                assert!(diagnostics.contains("Conversion failed!"));
                assert!(!diagnostics.contains("Stream mapping"));
            }
            other => panic!("expected collaborator error, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_output_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let spawner = ScriptedSpawner::new(|_: &[String]| ScriptedProcess { events: Vec::new(), exit_code: 0 });
        let engine = SidecarEngine::with_spawner("ffmpeg", spawner).show_progress(false);
        assert!(engine.transcode(&instructions(dir.path().join("never.mkv"))).is_err());
    }
}
