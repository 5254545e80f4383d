//! Error types for the media tool module.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while talking to ffmpeg/ffprobe.
#[derive(Debug, Error)]
pub enum MediaError {
    /// Binary could not be spawned or failed its version probe.
    #[error("{tool} is not available at {path}: {reason}")]
    ToolUnavailable {
        tool: String,
        path: PathBuf,
        reason: String,
    },

    /// Input file not found.
    #[error("Input file not found: {path}")]
    InputNotFound { path: PathBuf },

    /// Failed to probe media file.
    #[error("Failed to probe media file: {reason}")]
    ProbeFailed { reason: String },

    /// Extraction process exited unsuccessfully.
    #[error("Extraction failed with exit code {exit_code:?}")]
    EncodeFailed {
        exit_code: Option<i32>,
        stderr: String,
    },

    /// A tool invocation ran past the configured timeout and was killed.
    #[error("Media tool timed out after {timeout_secs} seconds")]
    Timeout { timeout_secs: u64 },

    /// I/O error while running the tool.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl MediaError {
    /// Creates a new probe failed error.
    pub fn probe_failed(reason: impl Into<String>) -> Self {
        Self::ProbeFailed {
            reason: reason.into(),
        }
    }

    /// Creates a new encode failed error carrying the tool's stderr.
    pub fn encode_failed(exit_code: Option<i32>, stderr: impl Into<String>) -> Self {
        Self::EncodeFailed {
            exit_code,
            stderr: stderr.into(),
        }
    }

    /// Creates a new tool unavailable error.
    pub fn unavailable(tool: &str, path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::ToolUnavailable {
            tool: tool.to_string(),
            path: path.into(),
            reason: reason.into(),
        }
    }
}
