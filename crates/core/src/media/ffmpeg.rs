//! FFmpeg-based media tool implementation.

use async_trait::async_trait;
use serde::Deserialize;
use std::path::Path;
use std::process::{Output, Stdio};
use std::time::Instant;
use tokio::process::Command;
use tokio::time::{timeout, Duration};
use tracing::{debug, warn};

use super::error::MediaError;
use super::traits::MediaTool;
use super::types::{ExtractionResult, MediaInfo};
use crate::clip::ClipJob;
use crate::config::MediaToolConfig;

/// FFmpeg/FFprobe media tool.
pub struct FfmpegTool {
    config: MediaToolConfig,
}

impl FfmpegTool {
    /// Creates a new FFmpeg tool with the given configuration.
    pub fn new(config: MediaToolConfig) -> Self {
        Self { config }
    }

    /// Creates a tool with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(MediaToolConfig::default())
    }

    /// Returns the configuration in use.
    pub fn config(&self) -> &MediaToolConfig {
        &self.config
    }

    /// Spawns `command` and collects its output, honoring the configured timeout.
    ///
    /// A missing binary maps to `ToolUnavailable`.
    async fn run_with_timeout(
        &self,
        tool: &str,
        binary: &Path,
        mut command: Command,
    ) -> Result<Output, MediaError> {
        let child = command
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    MediaError::unavailable(tool, binary, e.to_string())
                } else {
                    MediaError::Io(e)
                }
            })?;

        // Dropping the wait future on timeout kills the child (kill_on_drop).
        let output = match self.config.timeout_secs {
            Some(timeout_secs) => timeout(
                Duration::from_secs(timeout_secs),
                child.wait_with_output(),
            )
            .await
            .map_err(|_| {
                warn!(tool, timeout_secs, "Media tool timed out, killing it");
                MediaError::Timeout { timeout_secs }
            })??,
            None => child.wait_with_output().await?,
        };

        Ok(output)
    }

    /// Runs `<binary> -version` and maps any failure other than a timeout to
    /// `ToolUnavailable`.
    async fn version_probe(&self, tool: &str, binary: &Path) -> Result<(), MediaError> {
        let mut command = Command::new(binary);
        command.arg("-version").stdout(Stdio::piped()).stderr(Stdio::null());

        let output = self
            .run_with_timeout(tool, binary, command)
            .await
            .map_err(|e| match e {
                MediaError::Timeout { .. } | MediaError::ToolUnavailable { .. } => e,
                other => MediaError::unavailable(tool, binary, other.to_string()),
            })?;

        if !output.status.success() {
            return Err(MediaError::unavailable(
                tool,
                binary,
                format!("version probe exited with {:?}", output.status.code()),
            ));
        }

        if let Some(first_line) = String::from_utf8_lossy(&output.stdout).lines().next() {
            debug!(tool, version = first_line, "Media tool available");
        }

        Ok(())
    }

    /// Builds ffmpeg arguments for a poster frame.
    fn build_thumbnail_args(&self, clip: &Path, at_secs: f64, destination: &Path) -> Vec<String> {
        vec![
            "-hide_banner".to_string(),
            "-y".to_string(),
            "-ss".to_string(),
            format!("{:.3}", at_secs.max(0.0)),
            "-i".to_string(),
            clip.to_string_lossy().to_string(),
            "-frames:v".to_string(),
            "1".to_string(),
            "-q:v".to_string(),
            "3".to_string(),
            "-loglevel".to_string(),
            self.config.ffmpeg_log_level.clone(),
            destination.to_string_lossy().to_string(),
        ]
    }

    /// Spawns ffmpeg with `args`, honoring the configured timeout.
    ///
    /// Returns the captured stderr on a zero exit status.
    async fn run_ffmpeg(&self, args: &[String]) -> Result<String, MediaError> {
        let mut command = Command::new(&self.config.ffmpeg_path);
        command
            .args(args)
            .stdout(Stdio::null())
            .stderr(Stdio::piped());

        let output = self
            .run_with_timeout("ffmpeg", &self.config.ffmpeg_path, command)
            .await?;

        let stderr = String::from_utf8_lossy(&output.stderr).to_string();

        if !output.status.success() {
            return Err(MediaError::encode_failed(output.status.code(), stderr));
        }

        Ok(stderr)
    }

    /// Parses ffprobe JSON output into MediaInfo.
    fn parse_probe_output(path: &Path, output: &str) -> Result<MediaInfo, MediaError> {
        #[derive(Deserialize)]
        struct ProbeOutput {
            format: Option<ProbeFormat>,
            #[serde(default)]
            streams: Vec<ProbeStream>,
        }

        #[derive(Deserialize)]
        struct ProbeFormat {
            format_name: Option<String>,
            duration: Option<String>,
            size: Option<String>,
            bit_rate: Option<String>,
        }

        #[derive(Deserialize)]
        struct ProbeStream {
            codec_type: Option<String>,
            codec_name: Option<String>,
            bit_rate: Option<String>,
            width: Option<u32>,
            height: Option<u32>,
            r_frame_rate: Option<String>,
            duration: Option<String>,
        }

        if output.trim().is_empty() {
            return Err(MediaError::probe_failed("ffprobe returned no output"));
        }

        let probe: ProbeOutput = serde_json::from_str(output)
            .map_err(|e| MediaError::probe_failed(format!("unparseable ffprobe output: {}", e)))?;

        let format = probe
            .format
            .ok_or_else(|| MediaError::probe_failed("ffprobe reported no container format"))?;

        let video = probe
            .streams
            .iter()
            .find(|s| s.codec_type.as_deref() == Some("video"))
            .ok_or_else(|| MediaError::probe_failed("no video stream found"))?;

        let has_audio = probe
            .streams
            .iter()
            .any(|s| s.codec_type.as_deref() == Some("audio"));

        let duration_secs = format
            .duration
            .as_deref()
            .or(video.duration.as_deref())
            .and_then(|d| d.parse::<f64>().ok())
            .filter(|d| d.is_finite() && *d > 0.0)
            .ok_or_else(|| MediaError::probe_failed("duration is missing or zero"))?;

        let (width, height) = match (video.width, video.height) {
            (Some(w), Some(h)) if w > 0 && h > 0 => (w, h),
            _ => return Err(MediaError::probe_failed("video dimensions are missing")),
        };

        let size_bytes = format
            .size
            .as_deref()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(0);

        let bitrate_kbps = video
            .bit_rate
            .as_deref()
            .or(format.bit_rate.as_deref())
            .and_then(|b| b.parse::<u64>().ok())
            .map(|b| (b / 1000) as u32);

        let format_name = format
            .format_name
            .as_deref()
            .and_then(|f| f.split(',').next())
            .unwrap_or("unknown");

        Ok(MediaInfo {
            path: path.to_path_buf(),
            size_bytes,
            duration_secs,
            format: format_name.to_string(),
            video_codec: video
                .codec_name
                .clone()
                .unwrap_or_else(|| "unknown".to_string()),
            width,
            height,
            bitrate_kbps,
            fps: video.r_frame_rate.as_deref().and_then(parse_frame_rate),
            has_audio,
        })
    }
}

/// Parses a frame rate like "24000/1001" or "30".
fn parse_frame_rate(rate: &str) -> Option<f32> {
    match rate.split_once('/') {
        Some((num, den)) => {
            let num = num.parse::<f32>().ok()?;
            let den = den.parse::<f32>().ok()?;
            if den > 0.0 {
                Some(num / den)
            } else {
                None
            }
        }
        None => rate.parse::<f32>().ok(),
    }
}

#[async_trait]
impl MediaTool for FfmpegTool {
    fn name(&self) -> &str {
        "ffmpeg"
    }

    async fn validate(&self) -> Result<(), MediaError> {
        self.version_probe("ffmpeg", &self.config.ffmpeg_path).await?;
        self.version_probe("ffprobe", &self.config.ffprobe_path)
            .await
    }

    async fn probe(&self, path: &Path) -> Result<MediaInfo, MediaError> {
        if !path.exists() {
            return Err(MediaError::InputNotFound {
                path: path.to_path_buf(),
            });
        }

        let mut command = Command::new(&self.config.ffprobe_path);
        command
            .args([
                "-v",
                "error",
                "-print_format",
                "json",
                "-show_format",
                "-show_streams",
            ])
            .arg(path)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        let output = self
            .run_with_timeout("ffprobe", &self.config.ffprobe_path, command)
            .await
            .map_err(|e| match e {
                MediaError::Io(io) => MediaError::probe_failed(io.to_string()),
                other => other,
            })?;

        if !output.status.success() {
            return Err(MediaError::probe_failed(format!(
                "ffprobe failed: {}",
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        Self::parse_probe_output(path, &stdout)
    }

    async fn extract(&self, job: &ClipJob) -> Result<ExtractionResult, MediaError> {
        let start = Instant::now();

        if let Some(parent) = job.destination_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let args = job.ffmpeg_args(
            &self.config.ffmpeg_log_level,
            &self.config.extra_ffmpeg_args,
        );
        debug!(args = ?args, "Running ffmpeg");

        let stderr = self.run_ffmpeg(&args).await?;
        if !stderr.trim().is_empty() {
            debug!(stderr = %stderr.trim(), "ffmpeg diagnostics");
        }

        let output_meta = tokio::fs::metadata(&job.destination_path)
            .await
            .map_err(|_| {
                MediaError::encode_failed(Some(0), format!("output file was not created\n{}", stderr))
            })?;

        Ok(ExtractionResult {
            output_path: job.destination_path.clone(),
            output_size_bytes: output_meta.len(),
            elapsed_ms: start.elapsed().as_millis() as u64,
        })
    }

    async fn thumbnail(
        &self,
        clip: &Path,
        at_secs: f64,
        destination: &Path,
    ) -> Result<(), MediaError> {
        let args = self.build_thumbnail_args(clip, at_secs, destination);
        self.run_ffmpeg(&args).await.map(|_| ())
    }
}
