//! Age-based cleanup of managed directories.

use rand::seq::SliceRandom;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use tracing::debug;

use crate::config::RetentionConfig;

/// Aggregate counts of one sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SweepStats {
    /// Files whose age was evaluated.
    pub processed: usize,
    /// Files removed.
    pub deleted: usize,
}

/// Deletes files older than a threshold from a fixed set of directories.
///
/// Best-effort: unreadable directories, stat failures and unlink failures
/// are skipped silently. There is no locking, so concurrent sweeps may race
/// on the same file.
#[derive(Debug, Clone)]
pub struct RetentionSweeper {
    dirs: Vec<PathBuf>,
    threshold: Duration,
    max_files_per_run: usize,
}

impl RetentionSweeper {
    /// Creates a sweeper over `dirs`.
    pub fn new(dirs: Vec<PathBuf>, threshold: Duration, max_files_per_run: usize) -> Self {
        Self {
            dirs,
            threshold,
            max_files_per_run,
        }
    }

    /// Creates a sweeper from the retention configuration.
    pub fn from_config(dirs: Vec<PathBuf>, config: &RetentionConfig) -> Self {
        Self::new(
            dirs,
            Duration::from_secs(config.threshold_secs),
            config.max_files_per_run,
        )
    }

    pub fn dirs(&self) -> &[PathBuf] {
        &self.dirs
    }

    pub fn threshold(&self) -> Duration {
        self.threshold
    }

    /// Sweeps using the current time.
    pub fn sweep(&self) -> SweepStats {
        self.sweep_at(SystemTime::now())
    }

    /// Sweeps as if the current time were `now`.
    pub fn sweep_at(&self, now: SystemTime) -> SweepStats {
        let mut stats = SweepStats::default();
        let mut rng = rand::rng();

        'dirs: for dir in &self.dirs {
            let mut entries = match list_dir(dir) {
                Some(entries) => entries,
                None => continue,
            };
            entries.shuffle(&mut rng);

            for entry in entries {
                if stats.processed >= self.max_files_per_run {
                    break 'dirs;
                }

                let metadata = match fs::symlink_metadata(&entry) {
                    Ok(m) => m,
                    Err(e) => {
                        debug!(path = %entry.display(), error = %e, "Skipping unreadable entry");
                        continue;
                    }
                };

                if metadata.is_dir() {
                    continue;
                }

                stats.processed += 1;

                let modified = match metadata.modified() {
                    Ok(t) => t,
                    Err(_) => continue,
                };

                // Files stamped in the future have age zero.
                let age = now.duration_since(modified).unwrap_or_default();
                if age > self.threshold {
                    match fs::remove_file(&entry) {
                        Ok(()) => stats.deleted += 1,
                        Err(e) => {
                            debug!(path = %entry.display(), error = %e, "Failed to delete expired file");
                        }
                    }
                }
            }
        }

        stats
    }
}

fn list_dir(dir: &Path) -> Option<Vec<PathBuf>> {
    match fs::read_dir(dir) {
        Ok(read_dir) => Some(read_dir.filter_map(|e| e.ok()).map(|e| e.path()).collect()),
        Err(e) => {
            debug!(dir = %dir.display(), error = %e, "Skipping unreadable directory");
            None
        }
    }
}
