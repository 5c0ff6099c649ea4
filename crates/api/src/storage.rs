//! On-disk storage for uploaded images.
//!
//! Layout: `{root}/{analysis_id}/{position}/{sequence}.{ext}`.

use std::path::{Path, PathBuf};

use autocheck_core::analysis::PhotoPosition;
use autocheck_core::types::DbId;

/// Writes and removes image files under a fixed root.
#[derive(Debug, Clone)]
pub struct ImageStorage {
    root: PathBuf,
}

impl ImageStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of one stored image.
    pub fn image_path(
        &self,
        analysis_id: DbId,
        position: PhotoPosition,
        sequence: i32,
        extension: &str,
    ) -> PathBuf {
        self.root
            .join(analysis_id.to_string())
            .join(position.as_str())
            .join(format!("{sequence}.{extension}"))
    }

    /// Write `data` to `path`, creating parent directories.
    pub async fn write(&self, path: &Path, data: &[u8]) -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(path, data).await
    }

    /// Remove files written by a failed upload. Failures are only logged.
    pub async fn discard(&self, paths: &[PathBuf]) {
        for path in paths {
            if let Err(e) = tokio::fs::remove_file(path).await {
                tracing::warn!(path = %path.display(), error = %e, "Failed to remove orphaned image");
            }
        }
    }
}
