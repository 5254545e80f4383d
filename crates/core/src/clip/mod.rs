//! Clip pipeline for turning an uploaded MP4 into a web-optimized segment.
//!
//! This module owns the parameter side of the work: time range validation,
//! dimension and quality resolution, the ffmpeg argument vector, the size
//! estimate shown to users, and the [`ClipService`] that runs a request end
//! to end against a [`MediaTool`](crate::media::MediaTool).
//!
//! # Example
//!
//! ```ignore
//! use mp4trim_core::clip::{ClipRequest, ClipService, OutputSpec, Quality};
//!
//! let service = ClipService::new(tool, layout);
//! let report = service
//!     .process(ClipRequest {
//!         source_path: PathBuf::from("media/uploads/1700000000_1234_talk.mp4"),
//!         start_time: "00:00:02".to_string(),
//!         end_time: "00:00:05".to_string(),
//!         output: OutputSpec {
//!             width: Some(960),
//!             height: None,
//!             quality: Quality::Low,
//!         },
//!     })
//!     .await?;
//! println!("{} ({})", report.output_path.display(), report.estimated_size);
//! ```

mod builder;
mod error;
mod estimate;
mod service;
mod types;

pub use builder::{build_clip_job, resolve_range, resolve_scale};
pub use error::ClipError;
pub use estimate::{estimate_bytes, estimate_size, format_size};
pub use service::ClipService;
pub use types::{
    ClipJob, ClipReport, ClipRequest, Dimensions, OutputSpec, Quality, QualityPreset,
    ScaleDirective, TimeRange,
};
