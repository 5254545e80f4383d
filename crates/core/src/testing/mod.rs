//! Testing utilities and mock implementations.
//!
//! This module provides a mock [`MediaTool`](crate::media::MediaTool) so the
//! clip pipeline and HTTP surface can be exercised without ffmpeg installed.
//!
//! # Example
//!
//! ```rust,ignore
//! use mp4trim_core::testing::{fixtures, MockMediaTool};
//!
//! let tool = MockMediaTool::new();
//! tool.set_default_media_info(fixtures::media_info("/in.mp4", 10.0, 1920, 1080)).await;
//! tool.fail_extract_with(Some(1), "Conversion failed!").await;
//!
//! // Use in AppState...
//! ```

mod mock_media_tool;

pub use mock_media_tool::{MockMediaTool, RecordedExtraction};

/// Test fixtures and helper functions.
pub mod fixtures {
    use std::path::Path;

    use crate::media::MediaInfo;

    /// Create probe metadata for an H.264 MP4 with reasonable defaults.
    pub fn media_info(
        path: impl AsRef<Path>,
        duration_secs: f64,
        width: u32,
        height: u32,
    ) -> MediaInfo {
        MediaInfo {
            path: path.as_ref().to_path_buf(),
            size_bytes: 8 * 1024 * 1024,
            duration_secs,
            format: "mov".to_string(),
            video_codec: "h264".to_string(),
            width,
            height,
            bitrate_kbps: Some(4_000),
            fps: Some(30.0),
            has_audio: true,
        }
    }
}
