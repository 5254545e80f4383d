//! Types for the clip pipeline.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

use crate::media::MediaInfo;

/// Named encoder quality tier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Quality {
    Lowest,
    Low,
    #[default]
    Medium,
    High,
    Highest,
}

impl Quality {
    /// All tiers, lowest first.
    pub const ALL: [Quality; 5] = [
        Quality::Lowest,
        Quality::Low,
        Quality::Medium,
        Quality::High,
        Quality::Highest,
    ];

    /// Resolves a tier name. Unknown or empty names fall back to `Medium`.
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "lowest" => Self::Lowest,
            "low" => Self::Low,
            "high" => Self::High,
            "highest" => Self::Highest,
            _ => Self::Medium,
        }
    }

    /// Tier name as accepted by [`Quality::from_name`].
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Lowest => "lowest",
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Highest => "highest",
        }
    }

    /// Encoding parameters for this tier.
    pub fn preset(&self) -> QualityPreset {
        match self {
            Self::Lowest => QualityPreset {
                crf: 32,
                speed_preset: "ultrafast",
                size_multiplier: 0.2,
            },
            Self::Low => QualityPreset {
                crf: 28,
                speed_preset: "faster",
                size_multiplier: 0.4,
            },
            Self::Medium => QualityPreset {
                crf: 23,
                speed_preset: "medium",
                size_multiplier: 1.0,
            },
            Self::High => QualityPreset {
                crf: 18,
                speed_preset: "slow",
                size_multiplier: 1.5,
            },
            Self::Highest => QualityPreset {
                crf: 14,
                speed_preset: "veryslow",
                size_multiplier: 2.5,
            },
        }
    }
}

impl fmt::Display for Quality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// x264 parameters and size heuristic for one quality tier.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct QualityPreset {
    /// Constant Rate Factor (lower = better quality, larger file).
    pub crf: u8,
    /// x264 speed preset.
    pub speed_preset: &'static str,
    /// Multiplier applied by the size estimator.
    pub size_multiplier: f64,
}

/// Validated clip boundaries in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TimeRange {
    pub start: f64,
    pub end: f64,
}

impl TimeRange {
    /// Length of the range in seconds.
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }
}

/// Frame size in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl fmt::Display for Dimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Requested output geometry and quality.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OutputSpec {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    #[serde(default)]
    pub quality: Quality,
}

/// How the output frame size is derived from the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum ScaleDirective {
    /// Keep the source size.
    Source,
    /// Force an exact size; aspect ratio is not preserved.
    Exact { width: u32, height: u32 },
    /// Fixed width, height follows the source aspect ratio (even).
    FitWidth { width: u32 },
    /// Fixed height, width follows the source aspect ratio (even).
    FitHeight { height: u32 },
}

impl ScaleDirective {
    /// ffmpeg arguments for this directive.
    pub fn to_ffmpeg_args(&self) -> Vec<String> {
        match self {
            Self::Source => Vec::new(),
            Self::Exact { width, height } => {
                vec!["-s".to_string(), format!("{}x{}", width, height)]
            }
            Self::FitWidth { width } => {
                vec!["-vf".to_string(), format!("scale={}:-2", width)]
            }
            Self::FitHeight { height } => {
                vec!["-vf".to_string(), format!("scale=-2:{}", height)]
            }
        }
    }
}

/// A fully resolved extraction, ready for the media tool.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClipJob {
    pub source_path: PathBuf,
    pub destination_path: PathBuf,
    pub range: TimeRange,
    pub scale: ScaleDirective,
    pub quality: Quality,
    /// Expected output size, derived from the directive and the source.
    pub output_dimensions: Dimensions,
}

impl ClipJob {
    /// Encoding parameters for the job's quality tier.
    pub fn preset(&self) -> QualityPreset {
        self.quality.preset()
    }

    /// Builds the ffmpeg argument vector.
    ///
    /// The encode policy is fixed: H.264 main profile level 3.1, yuv420p,
    /// fast-start and no audio track.
    pub fn ffmpeg_args(&self, log_level: &str, extra_args: &[String]) -> Vec<String> {
        let preset = self.preset();
        let mut args = vec![
            "-hide_banner".to_string(),
            "-y".to_string(),
            "-ss".to_string(),
            format_seconds(self.range.start),
            "-i".to_string(),
            self.source_path.to_string_lossy().to_string(),
            "-t".to_string(),
            format_seconds(self.range.duration()),
        ];

        args.extend(self.scale.to_ffmpeg_args());

        args.extend([
            "-c:v".to_string(),
            "libx264".to_string(),
            "-profile:v".to_string(),
            "main".to_string(),
            "-level".to_string(),
            "3.1".to_string(),
            "-preset".to_string(),
            preset.speed_preset.to_string(),
            "-crf".to_string(),
            preset.crf.to_string(),
            "-pix_fmt".to_string(),
            "yuv420p".to_string(),
            "-movflags".to_string(),
            "+faststart".to_string(),
            "-an".to_string(),
            "-loglevel".to_string(),
            log_level.to_string(),
        ]);

        args.extend(extra_args.iter().cloned());

        args.push(self.destination_path.to_string_lossy().to_string());

        args
    }
}

/// Seconds with millisecond precision, as ffmpeg expects them.
fn format_seconds(secs: f64) -> String {
    format!("{:.3}", secs)
}

/// Everything a caller supplies for one clip.
#[derive(Debug, Clone, Default)]
pub struct ClipRequest {
    pub source_path: PathBuf,
    pub start_time: String,
    pub end_time: String,
    pub output: OutputSpec,
}

/// Success payload for a finished clip.
#[derive(Debug, Clone, Serialize)]
pub struct ClipReport {
    pub output_path: PathBuf,
    pub source_path: PathBuf,
    pub start: f64,
    pub end: f64,
    pub duration: f64,
    pub start_timecode: String,
    pub end_timecode: String,
    pub output_width: u32,
    pub output_height: u32,
    pub quality: Quality,
    pub estimated_size: String,
    pub output_size_bytes: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail_path: Option<PathBuf>,
    pub source: MediaInfo,
    pub elapsed_ms: u64,
}
