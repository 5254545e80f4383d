//! Types for the media tool module.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Source metadata gathered by a single ffprobe run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaInfo {
    /// Path to the probed file.
    pub path: PathBuf,
    /// File size in bytes.
    pub size_bytes: u64,
    /// Duration in seconds.
    pub duration_secs: f64,
    /// Container format (first entry of ffprobe's `format_name`).
    pub format: String,
    /// Video codec name.
    pub video_codec: String,
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Video bitrate in kbps, falling back to the container bitrate.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bitrate_kbps: Option<u32>,
    /// Frames per second.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fps: Option<f32>,
    /// Whether the file carries an audio stream.
    pub has_audio: bool,
}

/// Outcome of a successful extraction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionResult {
    /// Path of the written clip.
    pub output_path: PathBuf,
    /// Size of the clip in bytes.
    pub output_size_bytes: u64,
    /// Wall-clock time spent in ffmpeg.
    pub elapsed_ms: u64,
}
