// squeeze-cli/src/cli.rs
//
// Defines the command-line argument structures using clap.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

// --- CLI Argument Definition ---

#[derive(Parser, Debug)]
#[command(
    author,
    version, // Reads from Cargo.toml via "cargo" feature in clap
    about = "Squeeze: re-encode media files and certify the result",
    long_about = "Re-encodes video with libx265 and raw audio with Opus or AAC, then accepts the \
                  output only if its metadata matches the original and its VMAF score clears the \
                  quality gate."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable debug logging (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// JSON configuration file
    #[arg(short, long, global = true, value_name = "FILE", env = "SQUEEZE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Print machine-readable JSON instead of the text report
    #[arg(long, global = true)]
    pub json: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Converts a file into the scratch directory and validates the result
    Convert(ConvertArgs),
    /// Shows the stream decisions and ffmpeg command without encoding
    Plan(PlanArgs),
    /// Validates an existing converted file against its original
    Compare(CompareArgs),
}

/// Encoder overrides shared by `convert` and `plan`.
#[derive(Args, Debug, Clone, Default)]
pub struct EncoderOverrides {
    /// Override the libx265 constant rate factor (0-51)
    #[arg(long, value_name = "CRF", value_parser = clap::value_parser!(u8).range(0..=51))]
    pub crf: Option<u8>,

    /// Override the libx265 preset (ultrafast ... placebo)
    #[arg(long, value_name = "PRESET")]
    pub preset: Option<String>,
}

#[derive(Args, Debug)]
pub struct ConvertArgs {
    /// Media file to convert
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Directory the converted file is written to
    #[arg(short, long, value_name = "DIR", env = "SQUEEZE_SCRATCH_DIR")]
    pub scratch_dir: Option<PathBuf>,

    /// Convert even if the bit rate is below the configured minimum
    #[arg(short, long)]
    pub force: bool,

    /// Hide the encode progress spinner
    #[arg(long)]
    pub no_progress: bool,

    #[command(flatten)]
    pub encoder: EncoderOverrides,
}

#[derive(Args, Debug)]
pub struct PlanArgs {
    /// Media file to plan
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Directory the converted file would be written to
    #[arg(short, long, value_name = "DIR", env = "SQUEEZE_SCRATCH_DIR")]
    pub scratch_dir: Option<PathBuf>,

    #[command(flatten)]
    pub encoder: EncoderOverrides,
}

#[derive(Args, Debug)]
pub struct CompareArgs {
    /// The original file
    #[arg(value_name = "ORIGINAL")]
    pub original: PathBuf,

    /// The converted file
    #[arg(value_name = "CONVERTED")]
    pub converted: PathBuf,

    /// Skip VMAF scoring and only check metadata equivalence
    #[arg(long)]
    pub no_quality: bool,
}
