//! Request pipeline: preflight, probe, build, extract, report.

use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

use super::builder::build_clip_job;
use super::error::ClipError;
use super::estimate::estimate_size;
use super::types::{ClipReport, ClipRequest};
use crate::media::MediaTool;
use crate::storage::StorageLayout;
use crate::timecode::format_time;

/// Produces clips from stored source videos.
///
/// Every call runs to completion before returning; there is no queue.
pub struct ClipService {
    tool: Arc<dyn MediaTool>,
    layout: StorageLayout,
    generate_thumbnails: bool,
}

impl ClipService {
    /// Creates a new clip service.
    pub fn new(tool: Arc<dyn MediaTool>, layout: StorageLayout) -> Self {
        Self {
            tool,
            layout,
            generate_thumbnails: false,
        }
    }

    /// Enables writing a poster frame for every clip.
    pub fn with_thumbnails(mut self, enabled: bool) -> Self {
        self.generate_thumbnails = enabled;
        self
    }

    pub fn layout(&self) -> &StorageLayout {
        &self.layout
    }

    pub fn tool(&self) -> &dyn MediaTool {
        self.tool.as_ref()
    }

    /// Runs one clip request.
    pub async fn process(&self, request: ClipRequest) -> Result<ClipReport, ClipError> {
        let started = Instant::now();

        self.tool.validate().await?;

        if !request.source_path.is_file() {
            return Err(ClipError::UnresolvedSource {
                path: request.source_path.clone(),
            });
        }

        let source = self.tool.probe(&request.source_path).await?;
        info!(
            source = %request.source_path.display(),
            duration = source.duration_secs,
            width = source.width,
            height = source.height,
            codec = %source.video_codec,
            "Probed source video"
        );

        let destination = self.layout.allocate_clip_path().await?;
        let job = build_clip_job(&request, &source, destination)?;

        info!(
            start = job.range.start,
            end = job.range.end,
            quality = %job.quality,
            output = %job.output_dimensions,
            "Extracting clip"
        );

        let extraction = self.tool.extract(&job).await?;

        let thumbnail_path = if self.generate_thumbnails {
            self.write_thumbnail(&extraction.output_path, job.range.duration())
                .await
        } else {
            None
        };

        let duration = job.range.duration();
        let report = ClipReport {
            output_path: extraction.output_path,
            source_path: request.source_path,
            start: job.range.start,
            end: job.range.end,
            duration,
            start_timecode: format_time(job.range.start),
            end_timecode: format_time(job.range.end),
            output_width: job.output_dimensions.width,
            output_height: job.output_dimensions.height,
            quality: job.quality,
            estimated_size: estimate_size(
                duration,
                job.output_dimensions.width,
                job.output_dimensions.height,
                job.quality,
            ),
            output_size_bytes: extraction.output_size_bytes,
            thumbnail_path,
            source,
            elapsed_ms: started.elapsed().as_millis() as u64,
        };

        info!(
            output = %report.output_path.display(),
            size_bytes = report.output_size_bytes,
            elapsed_ms = report.elapsed_ms,
            "Clip ready"
        );

        Ok(report)
    }

    async fn write_thumbnail(
        &self,
        clip: &std::path::Path,
        clip_duration: f64,
    ) -> Option<std::path::PathBuf> {
        let destination = match self.layout.allocate_thumbnail_path().await {
            Ok(path) => path,
            Err(e) => {
                warn!(error = %e, "Could not prepare thumbnail directory");
                return None;
            }
        };

        match self
            .tool
            .thumbnail(clip, clip_duration / 2.0, &destination)
            .await
        {
            Ok(()) => Some(destination),
            Err(e) => {
                warn!(
                    clip = %clip.display(),
                    tool = self.tool.name(),
                    error = %e,
                    "Thumbnail generation failed, continuing without it"
                );
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clip::{OutputSpec, Quality};
    use crate::media::MediaError;
    use crate::testing::{fixtures, MockMediaTool};
    use std::path::PathBuf;
    use tempfile::TempDir;

    struct Setup {
        _temp: TempDir,
        tool: Arc<MockMediaTool>,
        service: ClipService,
        source: PathBuf,
    }

    async fn setup() -> Setup {
        let temp = TempDir::new().unwrap();
        let layout = StorageLayout::new(temp.path());
        layout.ensure_all().await.unwrap();

        let source = layout.uploads_dir().join("1700000000_1234_source.mp4");
        std::fs::write(&source, b"not really a video").unwrap();

        let tool = Arc::new(MockMediaTool::new());
        tool.set_default_media_info(fixtures::media_info(&source, 10.0, 1920, 1080))
            .await;

        let service = ClipService::new(Arc::clone(&tool) as Arc<dyn MediaTool>, layout);

        Setup {
            _temp: temp,
            tool,
            service,
            source,
        }
    }

    fn request(source: &PathBuf, start: &str, end: &str, output: OutputSpec) -> ClipRequest {
        ClipRequest {
            source_path: source.clone(),
            start_time: start.to_string(),
            end_time: end.to_string(),
            output,
        }
    }

    #[tokio::test]
    async fn test_process_success() {
        let setup = setup().await;
        let report = setup
            .service
            .process(request(
                &setup.source,
                "00:00:02",
                "00:00:05",
                OutputSpec {
                    quality: Quality::Low,
                    ..Default::default()
                },
            ))
            .await
            .unwrap();

        assert!((report.duration - 3.0).abs() < 1e-9);
        assert_eq!(report.start_timecode, "00:00:02");
        assert_eq!(report.end_timecode, "00:00:05");
        assert_eq!((report.output_width, report.output_height), (1920, 1080));
        assert_eq!(report.quality, Quality::Low);
        assert!(report.output_path.exists());
        assert!(report
            .output_path
            .starts_with(setup.service.layout().clips_dir()));
        assert!(report.thumbnail_path.is_none());

        let jobs = setup.tool.recorded_extractions().await;
        assert_eq!(jobs.len(), 1);
        assert!(jobs[0].success);
        assert_eq!(jobs[0].job.preset().crf, 28);
    }

    #[tokio::test]
    async fn test_process_with_thumbnail() {
        let setup = setup().await;
        let service = setup.service.with_thumbnails(true);
        let report = service
            .process(request(&setup.source, "0", "4", OutputSpec::default()))
            .await
            .unwrap();

        let thumb = report.thumbnail_path.unwrap();
        assert!(thumb.exists());
        assert!(thumb.starts_with(service.layout().thumbnails_dir()));
    }

    #[tokio::test]
    async fn test_thumbnail_failure_keeps_the_clip() {
        let setup = setup().await;
        setup.tool.fail_thumbnail_with("could not seek").await;
        let service = setup.service.with_thumbnails(true);

        let report = service
            .process(request(&setup.source, "0", "4", OutputSpec::default()))
            .await
            .unwrap();

        assert!(report.output_path.exists());
        assert!(report.thumbnail_path.is_none());
    }

    #[tokio::test]
    async fn test_slow_extraction_counts_toward_elapsed() {
        let setup = setup().await;
        setup
            .tool
            .set_extract_delay(std::time::Duration::from_millis(40))
            .await;

        let report = setup
            .service
            .process(request(&setup.source, "1", "3", OutputSpec::default()))
            .await
            .unwrap();
        assert!(report.elapsed_ms >= 40);

        setup.tool.clear_recorded().await;
        setup
            .service
            .process(request(&setup.source, "3", "6", OutputSpec::default()))
            .await
            .unwrap();
        let jobs = setup.tool.recorded_extractions().await;
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].job.range.start, 3.0);
    }

    #[tokio::test]
    async fn test_tool_unavailable_fails_before_any_work() {
        let setup = setup().await;
        setup
            .tool
            .set_next_error(MediaError::unavailable("ffmpeg", "ffmpeg", "not found"))
            .await;

        let err = setup
            .service
            .process(request(&setup.source, "0", "4", OutputSpec::default()))
            .await
            .unwrap_err();

        assert_eq!(err.code(), "tool_unavailable");
        assert_eq!(setup.tool.extraction_count().await, 0);
    }

    #[tokio::test]
    async fn test_missing_source() {
        let setup = setup().await;
        let missing = setup.source.with_file_name("gone.mp4");
        let err = setup
            .service
            .process(request(&missing, "0", "4", OutputSpec::default()))
            .await
            .unwrap_err();
        assert!(matches!(err, ClipError::UnresolvedSource { .. }));
    }

    #[tokio::test]
    async fn test_invalid_range_does_not_extract() {
        let setup = setup().await;
        let err = setup
            .service
            .process(request(&setup.source, "5", "2", OutputSpec::default()))
            .await
            .unwrap_err();
        assert!(matches!(err, ClipError::InvalidRange { .. }));
        assert_eq!(setup.tool.extraction_count().await, 0);
    }

    #[tokio::test]
    async fn test_probe_failure_is_metadata_unavailable() {
        let setup = setup().await;
        setup.tool.fail_probe_with("moov atom not found").await;
        let err = setup
            .service
            .process(request(&setup.source, "0", "4", OutputSpec::default()))
            .await
            .unwrap_err();
        assert_eq!(err.code(), "metadata_unavailable");
        assert_eq!(setup.tool.extraction_count().await, 0);
    }

    #[tokio::test]
    async fn test_encode_failure_carries_stderr() {
        let setup = setup().await;
        setup
            .tool
            .fail_extract_with(Some(1), "Error opening output file")
            .await;
        let err = setup
            .service
            .process(request(&setup.source, "0", "4", OutputSpec::default()))
            .await
            .unwrap_err();
        assert_eq!(err.code(), "encode_failed");
        assert!(err.to_string().contains("Error opening output file"));
    }
}
