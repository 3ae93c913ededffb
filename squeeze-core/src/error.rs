use thiserror::Error;

use crate::validation::ValidationVerdict;

/// Errors produced while planning, converting or certifying a media file.
///
/// Every variant is terminal for the file being processed; nothing in the
/// crate retries or falls back to a different encode.
#[derive(Error, Debug)]
pub enum SqueezeError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// An external tool (ffprobe, ffmpeg, the VMAF scorer) could not be run,
    /// exited non-zero, or produced output we could not read.
    #[error("{tool} failed: {message}{}", format_diagnostics(.diagnostics))]
    CollaboratorInvocation {
        tool: String,
        message: String,
        diagnostics: String,
    },

    /// The probe tree does not have the shape a probe must have.
    #[error("Malformed probe output: {0}")]
    MalformedProbe(String),

    #[error("Unsupported stream layout: {0}")]
    UnsupportedLayout(String),

    #[error("Unsupported container: {0}")]
    UnsupportedContainer(String),

    #[error("Converted file is not equivalent to the original: {count} failure(s)\n{0}", count = .0.failures().len())]
    EquivalenceViolation(ValidationVerdict),

    #[error("Quality gate failed\n{0}")]
    QualityGateViolation(ValidationVerdict),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Path error: {0}")]
    Path(String),

    /// Failure reported by a front end, with its context prepended.
    #[error("{0}")]
    OperationFailed(String),
}

fn format_diagnostics(diagnostics: &str) -> String {
    let trimmed = diagnostics.trim();
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("\n{trimmed}")
    }
}

/// Builds a [`SqueezeError::CollaboratorInvocation`].
pub fn collaborator_error(
    tool: impl Into<String>,
    message: impl Into<String>,
    diagnostics: impl Into<String>,
) -> SqueezeError {
    SqueezeError::CollaboratorInvocation {
        tool: tool.into(),
        message: message.into(),
        diagnostics: diagnostics.into(),
    }
}

/// Result type for squeeze operations
pub type Result<T> = std::result::Result<T, SqueezeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collaborator_error_includes_diagnostics() {
        let err = collaborator_error("ffprobe", "exited with status 1", "  No such file\n");
        assert_eq!(err.to_string(), "ffprobe failed: exited with status 1\nNo such file");

        let err = collaborator_error("ffmpeg", "could not start", "");
        assert_eq!(err.to_string(), "ffmpeg failed: could not start");
    }
}
