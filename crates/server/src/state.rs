use std::sync::Arc;

use mp4trim_core::{
    ClipService, Config, MediaTool, RetentionSweeper, SanitizedConfig, StorageLayout, SweepStats,
};
use tracing::{debug, warn};

use crate::metrics;

/// Shared application state
pub struct AppState {
    config: Config,
    layout: StorageLayout,
    clips: ClipService,
    sweeper: RetentionSweeper,
}

impl AppState {
    pub fn new(config: Config, tool: Arc<dyn MediaTool>) -> Self {
        let layout = StorageLayout::new(config.storage.root.clone());
        let clips = ClipService::new(tool, layout.clone())
            .with_thumbnails(config.media.generate_thumbnails);
        let sweeper = RetentionSweeper::from_config(layout.managed_dirs(), &config.retention);

        Self {
            config,
            layout,
            clips,
            sweeper,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn sanitized_config(&self) -> SanitizedConfig {
        SanitizedConfig::from(&self.config)
    }

    pub fn layout(&self) -> &StorageLayout {
        &self.layout
    }

    pub fn clips(&self) -> &ClipService {
        &self.clips
    }

    /// Runs one retention sweep off the async runtime.
    pub async fn sweep(&self) -> SweepStats {
        let sweeper = self.sweeper.clone();
        match tokio::task::spawn_blocking(move || sweeper.sweep()).await {
            Ok(stats) => {
                debug!(
                    processed = stats.processed,
                    deleted = stats.deleted,
                    "Retention sweep finished"
                );
                metrics::record_sweep(stats);
                stats
            }
            Err(e) => {
                warn!(error = %e, "Retention sweep task failed");
                SweepStats::default()
            }
        }
    }
}
