//! End-to-end clip extraction with the real ffmpeg/ffprobe binaries.
//!
//! Each test generates its own source with the `lavfi` test pattern and is
//! skipped when ffmpeg (with libx264) is not installed.

use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::Arc;

use tempfile::TempDir;

use mp4trim_core::{
    clip::{ClipRequest, OutputSpec, Quality},
    media::MediaTool,
    ClipService, FfmpegTool, StorageLayout,
};

fn ffmpeg_with_x264() -> bool {
    let probe_ok = Command::new("ffprobe")
        .arg("-version")
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false);

    let encoders = Command::new("ffmpeg")
        .args(["-hide_banner", "-encoders"])
        .output();

    probe_ok
        && matches!(encoders, Ok(ref o) if o.status.success()
            && String::from_utf8_lossy(&o.stdout).contains("libx264"))
}

/// 10 s, 1920x1080, 30 fps test pattern with a sine audio track.
fn generate_source(dir: &Path) -> PathBuf {
    let path = dir.join("source.mp4");
    let status = Command::new("ffmpeg")
        .args([
            "-hide_banner",
            "-loglevel",
            "error",
            "-y",
            "-f",
            "lavfi",
            "-i",
            "testsrc=duration=10:size=1920x1080:rate=30",
            "-f",
            "lavfi",
            "-i",
            "sine=frequency=440:duration=10",
            "-c:v",
            "libx264",
            "-preset",
            "ultrafast",
            "-pix_fmt",
            "yuv420p",
            "-c:a",
            "aac",
            "-shortest",
        ])
        .arg(&path)
        .status()
        .expect("Failed to run ffmpeg");
    assert!(status.success(), "could not generate the test source");
    path
}

async fn setup() -> Option<(TempDir, ClipService, Arc<FfmpegTool>, PathBuf)> {
    if !ffmpeg_with_x264() {
        eprintln!("skipping: ffmpeg with libx264 not available");
        return None;
    }

    let temp = TempDir::new().unwrap();
    let layout = StorageLayout::new(temp.path().join("media"));
    layout.ensure_all().await.unwrap();
    let source = generate_source(&layout.uploads_dir());

    let tool = Arc::new(FfmpegTool::with_defaults());
    let service = ClipService::new(Arc::clone(&tool) as Arc<dyn MediaTool>, layout);
    Some((temp, service, tool, source))
}

#[tokio::test]
async fn test_real_clip_matches_request() {
    let Some((_temp, service, tool, source)) = setup().await else {
        return;
    };

    let report = service
        .process(ClipRequest {
            source_path: source,
            start_time: "00:00:02".to_string(),
            end_time: "00:00:05".to_string(),
            output: OutputSpec {
                quality: Quality::Low,
                ..Default::default()
            },
        })
        .await
        .expect("clip should succeed");

    assert!((report.duration - 3.0).abs() < 1e-9);
    assert_eq!((report.output_width, report.output_height), (1920, 1080));
    assert!(report.output_path.exists());
    assert!(report.source.has_audio);

    let clip = tool.probe(&report.output_path).await.unwrap();
    assert_eq!((clip.width, clip.height), (1920, 1080));
    assert_eq!(clip.video_codec, "h264");
    assert!(!clip.has_audio, "clips are encoded without audio");
    assert!(
        (clip.duration_secs - 3.0).abs() < 0.2,
        "duration was {}",
        clip.duration_secs
    );
}

#[tokio::test]
async fn test_real_clip_fit_width() {
    let Some((_temp, service, tool, source)) = setup().await else {
        return;
    };

    let report = service
        .process(ClipRequest {
            source_path: source,
            start_time: "1".to_string(),
            end_time: "2.5".to_string(),
            output: OutputSpec {
                width: Some(640),
                height: None,
                quality: Quality::Lowest,
            },
        })
        .await
        .expect("clip should succeed");

    let clip = tool.probe(&report.output_path).await.unwrap();
    assert_eq!((clip.width, clip.height), (640, 360));
    assert_eq!((report.output_width, report.output_height), (640, 360));
}

#[tokio::test]
async fn test_real_invalid_range() {
    let Some((_temp, service, _tool, source)) = setup().await else {
        return;
    };

    let err = service
        .process(ClipRequest {
            source_path: source,
            start_time: "00:00:12".to_string(),
            end_time: "00:00:15".to_string(),
            output: OutputSpec::default(),
        })
        .await
        .unwrap_err();

    assert_eq!(err.code(), "invalid_range");
}
