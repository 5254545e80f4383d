//! Storage layout for uploads, clips and thumbnails.
//!
//! All managed files live in three sibling directories below a common root.
//! Directories are created on demand (mode `0o755` on unix). Generated
//! filenames combine a unix timestamp with a random four digit suffix so
//! concurrent requests never collide.

use once_cell::sync::Lazy;
use rand::Rng;
use regex_lite::Regex;
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::clip::ClipError;

/// Which managed directory a file belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageArea {
    Uploads,
    Clips,
    Thumbnails,
}

impl StorageArea {
    /// Directory name below the storage root.
    pub fn dir_name(&self) -> &'static str {
        match self {
            Self::Uploads => "uploads",
            Self::Clips => "clips",
            Self::Thumbnails => "thumbnails",
        }
    }
}

static UNSAFE_CHARS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^A-Za-z0-9._-]").expect("valid regex"));

/// Paths of the managed directories.
#[derive(Debug, Clone)]
pub struct StorageLayout {
    root: PathBuf,
}

impl StorageLayout {
    /// Creates a layout rooted at `root`. Nothing is created until needed.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory for `area`.
    pub fn dir(&self, area: StorageArea) -> PathBuf {
        self.root.join(area.dir_name())
    }

    pub fn uploads_dir(&self) -> PathBuf {
        self.dir(StorageArea::Uploads)
    }

    pub fn clips_dir(&self) -> PathBuf {
        self.dir(StorageArea::Clips)
    }

    pub fn thumbnails_dir(&self) -> PathBuf {
        self.dir(StorageArea::Thumbnails)
    }

    /// All managed directories, in sweep order.
    pub fn managed_dirs(&self) -> Vec<PathBuf> {
        vec![self.uploads_dir(), self.clips_dir(), self.thumbnails_dir()]
    }

    /// Creates the directory for `area` if missing and returns its path.
    pub async fn ensure_dir(&self, area: StorageArea) -> Result<PathBuf, ClipError> {
        let dir = self.dir(area);
        if !dir.is_dir() {
            let mut builder = fs::DirBuilder::new();
            builder.recursive(true);
            #[cfg(unix)]
            builder.mode(0o755);
            builder.create(&dir).await?;
        }
        Ok(dir)
    }

    /// Creates every managed directory.
    pub async fn ensure_all(&self) -> Result<(), ClipError> {
        for area in [
            StorageArea::Uploads,
            StorageArea::Clips,
            StorageArea::Thumbnails,
        ] {
            self.ensure_dir(area).await?;
        }
        Ok(())
    }

    /// Fresh path for an upload named `original_name` by the client.
    pub async fn allocate_upload_path(&self, original_name: &str) -> Result<PathBuf, ClipError> {
        let dir = self.ensure_dir(StorageArea::Uploads).await?;
        Ok(dir.join(upload_file_name(original_name)))
    }

    /// Fresh path for a produced clip.
    pub async fn allocate_clip_path(&self) -> Result<PathBuf, ClipError> {
        let dir = self.ensure_dir(StorageArea::Clips).await?;
        Ok(dir.join(generated_file_name("clip", "mp4")))
    }

    /// Fresh path for a clip thumbnail.
    pub async fn allocate_thumbnail_path(&self) -> Result<PathBuf, ClipError> {
        let dir = self.ensure_dir(StorageArea::Thumbnails).await?;
        Ok(dir.join(generated_file_name("thumb", "jpg")))
    }

    /// Resolves a previously uploaded file by name.
    ///
    /// Only the final path component of `name` is used, so the lookup cannot
    /// leave the uploads directory.
    pub fn resolve_upload(&self, name: &str) -> Result<PathBuf, ClipError> {
        let file_name = Path::new(name.trim())
            .file_name()
            .filter(|n| !n.is_empty())
            .ok_or_else(|| ClipError::invalid_input("keep_video does not name a file"))?;

        let path = self.uploads_dir().join(file_name);
        if !path.is_file() {
            return Err(ClipError::UnresolvedSource { path });
        }
        Ok(path)
    }

    /// Path of `file` relative to the storage root, with forward slashes.
    ///
    /// Returns `None` for files outside the root.
    pub fn public_path(&self, file: &Path) -> Option<String> {
        let relative = file.strip_prefix(&self.root).ok()?;
        let parts: Vec<String> = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy().to_string())
            .collect();
        Some(parts.join("/"))
    }
}

/// Replaces anything outside `[A-Za-z0-9._-]` with `_`.
pub fn sanitize_file_name(name: &str) -> String {
    let base = Path::new(name)
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    let cleaned = UNSAFE_CHARS.replace_all(&base, "_").to_string();
    if cleaned.trim_matches(|c| c == '.' || c == '_').is_empty() {
        "video.mp4".to_string()
    } else {
        cleaned
    }
}

fn random_suffix() -> u32 {
    rand::rng().random_range(1000..10000)
}

fn unix_timestamp() -> i64 {
    chrono::Utc::now().timestamp()
}

/// `{timestamp}_{rand4}_{sanitized name}`
pub fn upload_file_name(original_name: &str) -> String {
    format!(
        "{}_{}_{}",
        unix_timestamp(),
        random_suffix(),
        sanitize_file_name(original_name)
    )
}

/// `{prefix}_{timestamp}_{rand4}.{extension}`
pub fn generated_file_name(prefix: &str, extension: &str) -> String {
    format!(
        "{}_{}_{}.{}",
        prefix,
        unix_timestamp(),
        random_suffix(),
        extension
    )
}
