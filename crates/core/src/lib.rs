pub mod clip;
pub mod config;
pub mod media;
pub mod retention;
pub mod storage;
pub mod testing;
pub mod timecode;

pub use clip::{
    ClipError, ClipJob, ClipReport, ClipRequest, ClipService, Dimensions, OutputSpec, Quality,
};
pub use config::{
    load_config, load_config_from_str, validate_config, Config, ConfigError, SanitizedConfig,
};
pub use media::{FfmpegTool, MediaError, MediaInfo, MediaTool};
pub use retention::{RetentionSweeper, SweepStats};
pub use storage::{StorageArea, StorageLayout};
pub use timecode::{format_time, parse_time};
