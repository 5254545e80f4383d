//! Trait definitions for the media tool module.

use async_trait::async_trait;
use std::path::Path;

use super::error::MediaError;
use super::types::{ExtractionResult, MediaInfo};
use crate::clip::ClipJob;

/// An external tool that can inspect videos and cut clips out of them.
#[async_trait]
pub trait MediaTool: Send + Sync {
    /// Returns the name of this implementation.
    fn name(&self) -> &str;

    /// Confirms the tool is reachable before any work is attempted.
    async fn validate(&self) -> Result<(), MediaError>;

    /// Probes a video for duration, dimensions, codec and bitrate.
    async fn probe(&self, path: &Path) -> Result<MediaInfo, MediaError>;

    /// Runs the extraction described by `job`. One attempt, no retry.
    async fn extract(&self, job: &ClipJob) -> Result<ExtractionResult, MediaError>;

    /// Writes a single still frame taken at `at_secs` into `destination`.
    async fn thumbnail(
        &self,
        clip: &Path,
        at_secs: f64,
        destination: &Path,
    ) -> Result<(), MediaError>;
}
