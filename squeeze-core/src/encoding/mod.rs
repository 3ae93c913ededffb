//! Encoding module
//!
//! Turns a [`ConversionPlan`] into the exact ffmpeg arguments for one run.
//! Synthesis is pure: it neither checks that the source exists nor creates
//! the scratch directory.

pub mod audio;

use std::fmt;
use std::path::{Path, PathBuf};

use log::debug;
use serde::Serialize;

use crate::config::EncodingConfig;
use crate::error::Result;
use crate::planning::{ChangeDecision, ConversionPlan};
use crate::utils::get_file_stem_safe;

pub use audio::{AudioCodec, Platform};

/// Marker inserted between the source stem and the extension of the output
pub const CONVERTED_MARKER: &str = "CONVERTED";

pub const VIDEO_ENCODER: &str = "libx265";

/// Arguments for one ffmpeg run and the file it writes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TranscodeInstructions {
    /// Arguments after the program name
    pub args: Vec<String>,

    /// `<scratch>/<stem>.CONVERTED.<ext>`
    pub output_path: PathBuf,
}

impl TranscodeInstructions {
    /// Shell-like rendering for logs and dry runs.
    pub fn command_line(&self, program: &str) -> String {
        let mut line = program.to_string();
        for arg in &self.args {
            line.push(' ');
            if arg.is_empty() || arg.contains(char::is_whitespace) {
                line.push_str(&format!("\"{arg}\""));
            } else {
                line.push_str(arg);
            }
        }
        line
    }
}

impl fmt::Display for TranscodeInstructions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.command_line("ffmpeg"))
    }
}

/// Builds [`TranscodeInstructions`] from a plan.
#[derive(Debug, Clone)]
pub struct CommandSynthesizer {
    encoding: EncodingConfig,
    platform: Platform,
}

impl CommandSynthesizer {
    pub fn new(encoding: EncodingConfig, platform: Platform) -> Self {
        Self { encoding, platform }
    }

    /// Output path of a conversion of `source` into `scratch_dir`.
    pub fn output_path(&self, plan: &ConversionPlan, source: &Path, scratch_dir: &Path) -> Result<PathBuf> {
        let stem = get_file_stem_safe(source)?;
        Ok(scratch_dir.join(format!("{stem}.{CONVERTED_MARKER}.{}", plan.container().extension())))
    }

    pub fn synthesize(&self, plan: &ConversionPlan, source: &Path, scratch_dir: &Path) -> Result<TranscodeInstructions> {
        let output_path = self.output_path(plan, source, scratch_dir)?;

        let mut args: Vec<String> = vec![
            "-y".to_string(),
            "-i".to_string(),
            source.to_string_lossy().into_owned(),
        ];

        for stream in plan.decisions() {
            let i = stream.index;
            args.extend(["-map".to_string(), format!("0:{i}")]);
            match stream.decision {
                ChangeDecision::Copy | ChangeDecision::Unknown => {
                    args.extend([format!("-c:{i}"), "copy".to_string()]);
                }
                ChangeDecision::TranscodeVideo => {
                    args.extend([
                        format!("-c:{i}"),
                        VIDEO_ENCODER.to_string(),
                        format!("-crf:{i}"),
                        self.encoding.crf.to_string(),
                        format!("-preset:{i}"),
                        self.encoding.preset.clone(),
                    ]);
                }
                ChangeDecision::TranscodeAudio => {
                    let codec = AudioCodec::select(plan.container(), self.platform, &self.encoding)?;
                    args.extend(codec.stream_args(i));
                }
            }
        }

        if plan.has_video() {
            // keep source frame timing: no frame dropping or duplication, source time base
            args.extend([
                "-fps_mode".to_string(),
                "passthrough".to_string(),
                "-enc_time_base".to_string(),
                "-1".to_string(),
                "-video_track_timescale".to_string(),
                self.encoding.track_timescale.to_string(),
            ]);
        }

        args.extend([
            "-map_metadata".to_string(),
            "0".to_string(),
            "-map_chapters".to_string(),
            "0".to_string(),
        ]);
        args.push(output_path.to_string_lossy().into_owned());

        let instructions = TranscodeInstructions { args, output_path };
        debug!("Synthesized command: {}", instructions);
        Ok(instructions)
    }
}
