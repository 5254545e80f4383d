//! External media tool integration.
//!
//! All decoding and encoding is delegated to ffmpeg and ffprobe, spawned as
//! subprocesses with an explicit argument vector (never through a shell).
//!
//! # Example
//!
//! ```ignore
//! use mp4trim_core::media::{FfmpegTool, MediaTool};
//!
//! let tool = FfmpegTool::with_defaults();
//! tool.validate().await?;
//!
//! let info = tool.probe(Path::new("/path/to/video.mp4")).await?;
//! println!("{}x{}, {} seconds", info.width, info.height, info.duration_secs);
//! ```

mod error;
mod ffmpeg;
mod traits;
mod types;

pub use error::MediaError;
pub use ffmpeg::FfmpegTool;
pub use traits::MediaTool;
pub use types::{ExtractionResult, MediaInfo};
