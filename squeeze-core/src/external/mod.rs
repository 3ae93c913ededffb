// ============================================================================
// squeeze-core/src/external/mod.rs
// ============================================================================
//
// EXTERNAL TOOLS: Interactions with ffmpeg and the file system
//
// This module encapsulates every interaction with the outside world that the
// conversion needs besides probing: running the ffmpeg transcode, running the
// libvmaf scorer, and reading file sizes. Each is behind a trait so the
// orchestrator can be driven by fakes in tests.
//
// KEY COMPONENTS:
// - FfmpegSpawner / FfmpegProcess: spawning ffmpeg through ffmpeg-sidecar
// - TranscodeEngine / SidecarEngine: runs synthesized transcode instructions
// - QualityScorer / VmafScorer: pooled VMAF metrics for two files
// - FileMetadataProvider: file size access
// - Platform detection and command logging

use std::env;
use std::path::Path;
use std::process::Command;

use crate::error::Result;

pub mod ffmpeg_executor;
pub mod vmaf;

pub use ffmpeg_executor::{
    FfmpegProcess, FfmpegSpawner, SidecarEngine, SidecarProcess, SidecarSpawner, TranscodeEngine,
};
pub use vmaf::{QualityScorer, VmafScorer};

// ============================================================================
// COMMAND LOGGING
// ============================================================================

/// Logs a command line at debug level before it is executed.
pub fn log_command(cmd: &Command) {
    let program = cmd.get_program().to_string_lossy();
    let args: Vec<_> = cmd.get_args().map(|arg| arg.to_string_lossy()).collect();
    log::debug!("Executing command: {} {}", program, args.join(" "));
}

// ============================================================================
// FILE METADATA ACCESS
// ============================================================================

/// Trait for abstracting file metadata access operations.
///
/// # Examples
///
/// ```rust
/// use squeeze_core::external::FileMetadataProvider;
/// use squeeze_core::Result;
/// use std::path::Path;
///
/// struct FixedSize;
///
/// impl FileMetadataProvider for FixedSize {
///     fn get_size(&self, _path: &Path) -> Result<u64> {
///         Ok(1_000_000)
///     }
/// }
///
/// let size = FixedSize.get_size(Path::new("/fake/path")).unwrap();
/// assert_eq!(size, 1_000_000);
/// ```
pub trait FileMetadataProvider {
    /// Gets the size of the file at the given path in bytes.
    fn get_size(&self, path: &Path) -> Result<u64>;
}

/// [`FileMetadataProvider`] backed by `std::fs::metadata`.
#[derive(Debug, Clone, Default)]
pub struct StdFsMetadataProvider;

impl FileMetadataProvider for StdFsMetadataProvider {
    fn get_size(&self, path: &Path) -> Result<u64> {
        Ok(std::fs::metadata(path)?.len())
    }
}

// ============================================================================
// PLATFORM DETECTION
// ============================================================================

/// Checks if the current platform is macOS (AudioToolbox encoders available).
pub fn is_macos() -> bool {
    env::consts::OS == "macos"
}
