use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::path::PathBuf;

/// Root configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub upload: UploadConfig,
    #[serde(default)]
    pub media: MediaToolConfig,
    #[serde(default)]
    pub retention: RetentionConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> IpAddr {
    IpAddr::from([0, 0, 0, 0])
}

fn default_port() -> u16 {
    8080
}

/// Storage configuration.
///
/// Uploads, clips and thumbnails live in sibling directories below `root`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
    #[serde(default = "default_storage_root")]
    pub root: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            root: default_storage_root(),
        }
    }
}

fn default_storage_root() -> PathBuf {
    PathBuf::from("media")
}

/// Upload limits
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UploadConfig {
    /// Maximum accepted size of an uploaded video in bytes (default: 500 MiB)
    #[serde(default = "default_max_upload_bytes")]
    pub max_bytes: u64,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_bytes: default_max_upload_bytes(),
        }
    }
}

fn default_max_upload_bytes() -> u64 {
    500 * 1024 * 1024
}

/// External media tool configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MediaToolConfig {
    /// Path to ffmpeg binary.
    #[serde(default = "default_ffmpeg_path")]
    pub ffmpeg_path: PathBuf,

    /// Path to ffprobe binary.
    #[serde(default = "default_ffprobe_path")]
    pub ffprobe_path: PathBuf,

    /// FFmpeg log level (quiet, panic, fatal, error, warning, info, verbose, debug, trace).
    #[serde(default = "default_log_level")]
    pub ffmpeg_log_level: String,

    /// Timeout for each ffmpeg/ffprobe invocation in seconds. Unset waits indefinitely.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,

    /// Additional ffmpeg arguments inserted before the output path.
    #[serde(default)]
    pub extra_ffmpeg_args: Vec<String>,

    /// Write a poster frame of every clip to the thumbnails directory.
    #[serde(default)]
    pub generate_thumbnails: bool,
}

fn default_ffmpeg_path() -> PathBuf {
    PathBuf::from("ffmpeg")
}

fn default_ffprobe_path() -> PathBuf {
    PathBuf::from("ffprobe")
}

fn default_log_level() -> String {
    "error".to_string()
}

impl Default for MediaToolConfig {
    fn default() -> Self {
        Self {
            ffmpeg_path: default_ffmpeg_path(),
            ffprobe_path: default_ffprobe_path(),
            ffmpeg_log_level: default_log_level(),
            timeout_secs: None,
            extra_ffmpeg_args: Vec::new(),
            generate_thumbnails: false,
        }
    }
}

impl MediaToolConfig {
    /// Creates a new config with custom ffmpeg/ffprobe paths.
    pub fn with_paths(ffmpeg_path: PathBuf, ffprobe_path: PathBuf) -> Self {
        Self {
            ffmpeg_path,
            ffprobe_path,
            ..Default::default()
        }
    }

    /// Sets the per-invocation timeout in seconds.
    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = Some(timeout_secs);
        self
    }
}

/// Retention sweep configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RetentionConfig {
    /// Files older than this many seconds are deleted (default: 10 minutes)
    #[serde(default = "default_threshold_secs")]
    pub threshold_secs: u64,
    /// Upper bound on files evaluated by one sweep, across all directories
    #[serde(default = "default_max_files_per_run")]
    pub max_files_per_run: usize,
    /// Run a sweep at the start of every clip request
    #[serde(default = "default_true")]
    pub sweep_on_request: bool,
    /// Additionally sweep on a fixed interval (seconds). Disabled when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interval_secs: Option<u64>,
}

impl Default for RetentionConfig {
    fn default() -> Self {
        Self {
            threshold_secs: default_threshold_secs(),
            max_files_per_run: default_max_files_per_run(),
            sweep_on_request: true,
            interval_secs: None,
        }
    }
}

fn default_threshold_secs() -> u64 {
    600
}

fn default_max_files_per_run() -> usize {
    100
}

fn default_true() -> bool {
    true
}

/// Sanitized config for API responses (binary paths reduced to their names)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub server: ServerConfig,
    pub upload: UploadConfig,
    pub media: SanitizedMediaConfig,
    pub retention: RetentionConfig,
}

#[derive(Debug, Clone, Serialize)]
pub struct SanitizedMediaConfig {
    pub ffmpeg: String,
    pub ffprobe: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
    pub generate_thumbnails: bool,
}

fn binary_name(path: &std::path::Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        Self {
            server: config.server.clone(),
            upload: config.upload.clone(),
            media: SanitizedMediaConfig {
                ffmpeg: binary_name(&config.media.ffmpeg_path),
                ffprobe: binary_name(&config.media.ffprobe_path),
                timeout_secs: config.media.timeout_secs,
                generate_thumbnails: config.media.generate_thumbnails,
            },
            retention: config.retention.clone(),
        }
    }
}
