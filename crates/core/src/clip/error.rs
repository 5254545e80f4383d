//! Error types for the clip pipeline.

use std::path::PathBuf;
use thiserror::Error;

use crate::media::MediaError;

/// Errors that can occur while turning a request into a clip.
#[derive(Debug, Error)]
pub enum ClipError {
    /// The external media tool is missing or not executable.
    #[error("{tool} is not available at {path}: {reason}")]
    ToolUnavailable {
        tool: String,
        path: PathBuf,
        reason: String,
    },

    /// The request itself is unusable (wrong MIME type, oversized upload, missing file).
    #[error("Invalid input: {reason}")]
    InvalidInput { reason: String },

    /// The computed clip duration is not positive. `end` is the requested end.
    #[error(
        "Invalid time range: start {start:.3}s, end {end:.3}s (source is {source_duration:.3}s long)"
    )]
    InvalidRange {
        start: f64,
        end: f64,
        source_duration: f64,
    },

    /// The source video does not exist.
    #[error("Source video not found: {path}")]
    UnresolvedSource { path: PathBuf },

    /// Introspection of the source failed or returned nothing usable.
    #[error("Could not read video metadata: {reason}")]
    MetadataUnavailable { reason: String },

    /// The extraction subprocess failed.
    #[error("Encoding failed ({}): {stderr}", describe_exit(.exit_code))]
    EncodeFailed {
        exit_code: Option<i32>,
        stderr: String,
    },

    /// The extraction did not finish within the configured timeout.
    #[error("Encoding timed out after {timeout_secs} seconds")]
    Timeout { timeout_secs: u64 },

    /// The upload could not be received or stored.
    #[error("Upload failed: {reason}")]
    UploadTransport { reason: String },

    /// I/O error while preparing the job.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

fn describe_exit(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {}", code),
        None => "terminated by signal".to_string(),
    }
}

impl ClipError {
    /// Creates a new invalid input error.
    pub fn invalid_input(reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            reason: reason.into(),
        }
    }

    /// Creates a new upload transport error.
    pub fn upload_transport(reason: impl Into<String>) -> Self {
        Self::UploadTransport {
            reason: reason.into(),
        }
    }

    /// Stable machine-readable reason code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::ToolUnavailable { .. } => "tool_unavailable",
            Self::InvalidInput { .. } => "invalid_input",
            Self::InvalidRange { .. } => "invalid_range",
            Self::UnresolvedSource { .. } => "unresolved_source",
            Self::MetadataUnavailable { .. } => "metadata_unavailable",
            Self::EncodeFailed { .. } => "encode_failed",
            Self::Timeout { .. } => "timeout",
            Self::UploadTransport { .. } => "upload_transport_error",
            Self::Io(_) => "io_error",
        }
    }

    /// Whether the failure was caused by the request rather than the server.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidInput { .. }
                | Self::InvalidRange { .. }
                | Self::UnresolvedSource { .. }
                | Self::MetadataUnavailable { .. }
                | Self::UploadTransport { .. }
        )
    }
}

impl From<MediaError> for ClipError {
    fn from(err: MediaError) -> Self {
        match err {
            MediaError::ToolUnavailable { tool, path, reason } => {
                Self::ToolUnavailable { tool, path, reason }
            }
            MediaError::InputNotFound { path } => Self::UnresolvedSource { path },
            MediaError::ProbeFailed { reason } => Self::MetadataUnavailable { reason },
            MediaError::EncodeFailed { exit_code, stderr } => {
                Self::EncodeFailed { exit_code, stderr }
            }
            MediaError::Timeout { timeout_secs } => Self::Timeout { timeout_secs },
            MediaError::Io(e) => Self::Io(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_are_distinct_for_probe_and_encode() {
        let probe: ClipError = MediaError::probe_failed("empty output").into();
        let encode: ClipError = MediaError::encode_failed(Some(1), "Invalid argument").into();
        assert_eq!(probe.code(), "metadata_unavailable");
        assert_eq!(encode.code(), "encode_failed");
    }

    #[test]
    fn test_encode_failure_message_keeps_diagnostics() {
        let err = ClipError::EncodeFailed {
            exit_code: Some(234),
            stderr: "moov atom not found\n".to_string(),
        };
        let message = err.to_string();
        assert!(message.contains("234"));
        assert!(message.contains("moov atom not found"));
    }

    #[test]
    fn test_client_error_classification() {
        assert!(ClipError::InvalidRange {
            start: 3.0,
            end: 1.0,
            source_duration: 10.0,
        }.is_client_error());
        assert!(ClipError::invalid_input("bad mime").is_client_error());
        assert!(!ClipError::Timeout { timeout_secs: 5 }.is_client_error());
        assert!(!ClipError::ToolUnavailable {
            tool: "ffmpeg".to_string(),
            path: PathBuf::from("ffmpeg"),
            reason: "not found".to_string(),
        }
        .is_client_error());
    }
}
