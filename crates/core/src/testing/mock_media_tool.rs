//! Mock media tool for testing.

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::clip::ClipJob;
use crate::media::{ExtractionResult, MediaError, MediaInfo, MediaTool};

/// Bytes written to every fake clip.
const FAKE_CLIP: &[u8] = b"\x00\x00\x00\x18ftypmp42mock clip";

/// A recorded extraction for test assertions.
#[derive(Debug, Clone)]
pub struct RecordedExtraction {
    /// The job that was submitted.
    pub job: ClipJob,
    /// Whether the extraction succeeded.
    pub success: bool,
}

/// Mock implementation of the [`MediaTool`] trait.
///
/// Provides controllable behavior for testing:
/// - Track extraction jobs for assertions
/// - Simulate an unavailable toolchain
/// - Control probe results and probe/encode failures
///
/// Successful extractions write a small placeholder file at the job's
/// destination so callers can stat and serve it.
///
/// # Example
///
/// ```rust,ignore
/// use mp4trim_core::testing::{fixtures, MockMediaTool};
///
/// let tool = MockMediaTool::new();
/// tool.set_default_media_info(fixtures::media_info("/in.mp4", 10.0, 1920, 1080)).await;
///
/// let result = tool.extract(&job).await?;
///
/// let extractions = tool.recorded_extractions().await;
/// assert_eq!(extractions.len(), 1);
/// ```
#[derive(Debug)]
pub struct MockMediaTool {
    /// Recorded extractions.
    extractions: Arc<RwLock<Vec<RecordedExtraction>>>,
    /// Pre-configured probe results by path.
    probe_results: Arc<RwLock<HashMap<PathBuf, MediaInfo>>>,
    /// Default media info for probing unknown files.
    default_media_info: Arc<RwLock<Option<MediaInfo>>>,
    /// If set, the next validation will fail with this error.
    next_error: Arc<RwLock<Option<MediaError>>>,
    /// If set, every validation fails as if ffmpeg were missing.
    unavailable: Arc<RwLock<bool>>,
    /// If set, the next probe fails with this reason.
    probe_error: Arc<RwLock<Option<String>>>,
    /// If set, the next extraction fails with this exit code and stderr.
    extract_error: Arc<RwLock<Option<(Option<i32>, String)>>>,
    /// Simulated extraction duration.
    extract_delay: Arc<RwLock<Duration>>,
    /// If set, the next thumbnail fails with this reason.
    thumbnail_error: Arc<RwLock<Option<String>>>,
}

impl Default for MockMediaTool {
    fn default() -> Self {
        Self::new()
    }
}

impl MockMediaTool {
    /// Create a new mock media tool.
    pub fn new() -> Self {
        Self {
            extractions: Arc::new(RwLock::new(Vec::new())),
            probe_results: Arc::new(RwLock::new(HashMap::new())),
            default_media_info: Arc::new(RwLock::new(None)),
            next_error: Arc::new(RwLock::new(None)),
            unavailable: Arc::new(RwLock::new(false)),
            probe_error: Arc::new(RwLock::new(None)),
            extract_error: Arc::new(RwLock::new(None)),
            extract_delay: Arc::new(RwLock::new(Duration::ZERO)),
            thumbnail_error: Arc::new(RwLock::new(None)),
        }
    }

    /// Get all recorded extractions.
    pub async fn recorded_extractions(&self) -> Vec<RecordedExtraction> {
        self.extractions.read().await.clone()
    }

    /// Get the number of extractions attempted.
    pub async fn extraction_count(&self) -> usize {
        self.extractions.read().await.len()
    }

    /// Clear recorded extractions.
    pub async fn clear_recorded(&self) {
        self.extractions.write().await.clear();
    }

    /// Set a probe result for a specific path.
    pub async fn set_probe_result(&self, path: impl AsRef<Path>, info: MediaInfo) {
        self.probe_results
            .write()
            .await
            .insert(path.as_ref().to_path_buf(), info);
    }

    /// Set the default media info for probing unknown files.
    pub async fn set_default_media_info(&self, info: MediaInfo) {
        *self.default_media_info.write().await = Some(info);
    }

    /// Configure the next validation to fail with the given error.
    pub async fn set_next_error(&self, error: MediaError) {
        *self.next_error.write().await = Some(error);
    }

    /// Make every validation fail until reset.
    pub async fn set_unavailable(&self, unavailable: bool) {
        *self.unavailable.write().await = unavailable;
    }

    /// Configure the next probe to fail.
    pub async fn fail_probe_with(&self, reason: impl Into<String>) {
        *self.probe_error.write().await = Some(reason.into());
    }

    /// Configure the next extraction to fail like a non-zero ffmpeg exit.
    pub async fn fail_extract_with(&self, exit_code: Option<i32>, stderr: impl Into<String>) {
        *self.extract_error.write().await = Some((exit_code, stderr.into()));
    }

    /// Set the simulated extraction duration.
    pub async fn set_extract_delay(&self, delay: Duration) {
        *self.extract_delay.write().await = delay;
    }

    /// Configure the next thumbnail to fail like a non-zero ffmpeg exit.
    pub async fn fail_thumbnail_with(&self, stderr: impl Into<String>) {
        *self.thumbnail_error.write().await = Some(stderr.into());
    }

    fn create_default_info(path: &Path) -> MediaInfo {
        MediaInfo {
            path: path.to_path_buf(),
            size_bytes: 25 * 1024 * 1024,
            duration_secs: 60.0,
            format: "mov".to_string(),
            video_codec: "h264".to_string(),
            width: 1920,
            height: 1080,
            bitrate_kbps: Some(3_500),
            fps: Some(30.0),
            has_audio: true,
        }
    }
}

#[async_trait]
impl MediaTool for MockMediaTool {
    fn name(&self) -> &str {
        "mock"
    }

    async fn validate(&self) -> Result<(), MediaError> {
        if let Some(err) = self.next_error.write().await.take() {
            return Err(err);
        }
        if *self.unavailable.read().await {
            return Err(MediaError::unavailable(
                "ffmpeg",
                "ffmpeg",
                "No such file or directory",
            ));
        }
        Ok(())
    }

    async fn probe(&self, path: &Path) -> Result<MediaInfo, MediaError> {
        if let Some(reason) = self.probe_error.write().await.take() {
            return Err(MediaError::probe_failed(reason));
        }

        if let Some(info) = self.probe_results.read().await.get(path) {
            return Ok(info.clone());
        }

        if let Some(info) = self.default_media_info.read().await.as_ref() {
            let mut info = info.clone();
            info.path = path.to_path_buf();
            return Ok(info);
        }

        Ok(Self::create_default_info(path))
    }

    async fn extract(&self, job: &ClipJob) -> Result<ExtractionResult, MediaError> {
        if let Some((exit_code, stderr)) = self.extract_error.write().await.take() {
            self.extractions.write().await.push(RecordedExtraction {
                job: job.clone(),
                success: false,
            });
            return Err(MediaError::encode_failed(exit_code, stderr));
        }

        let delay = *self.extract_delay.read().await;
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        if let Some(parent) = job.destination_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&job.destination_path, FAKE_CLIP).await?;

        self.extractions.write().await.push(RecordedExtraction {
            job: job.clone(),
            success: true,
        });

        Ok(ExtractionResult {
            output_path: job.destination_path.clone(),
            output_size_bytes: FAKE_CLIP.len() as u64,
            elapsed_ms: delay.as_millis() as u64,
        })
    }

    async fn thumbnail(
        &self,
        _clip: &Path,
        _at_secs: f64,
        destination: &Path,
    ) -> Result<(), MediaError> {
        if let Some(stderr) = self.thumbnail_error.write().await.take() {
            return Err(MediaError::encode_failed(Some(1), stderr));
        }
        tokio::fs::write(destination, b"\xff\xd8\xff\xd9").await?;
        Ok(())
    }
}
