//! Retention sweeping of uploaded sources, produced clips and thumbnails.
//!
//! Files are deleted once their modification time is older than the
//! configured threshold. Each run evaluates at most `max_files_per_run`
//! files in total, visiting each directory in random order so a small budget
//! does not always favor the same files.
//!
//! # Example
//!
//! ```ignore
//! use mp4trim_core::retention::RetentionSweeper;
//!
//! let sweeper = RetentionSweeper::from_config(layout.managed_dirs(), &config.retention);
//! let stats = sweeper.sweep();
//! println!("{} evaluated, {} deleted", stats.processed, stats.deleted);
//! ```

mod sweeper;

pub use sweeper::{RetentionSweeper, SweepStats};
