//! Filesystem utilities for removing transient job files.
//!
//! Removal of something that is already gone is a success, so every helper
//! here is idempotent. Callers log the returned [`CleanupError`] and move on.

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tokio::fs;

/// A path that could not be removed.
#[derive(Debug, Error)]
#[error("Failed to remove {}: {source}", path.display())]
pub struct CleanupError {
    pub path: PathBuf,
    #[source]
    pub source: io::Error,
}

impl CleanupError {
    fn new(path: &Path, source: io::Error) -> Self {
        Self {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Remove a directory tree. Returns whether anything was removed.
pub async fn remove_dir_if_exists(path: impl AsRef<Path>) -> Result<bool, CleanupError> {
    let path = path.as_ref();
    match fs::remove_dir_all(path).await {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(CleanupError::new(path, e)),
    }
}

/// Remove a single file. Returns whether anything was removed.
pub async fn remove_file_if_exists(path: impl AsRef<Path>) -> Result<bool, CleanupError> {
    let path = path.as_ref();
    match fs::remove_file(path).await {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(CleanupError::new(path, e)),
    }
}

/// Blocking removal of a file or directory tree.
///
/// For use where no runtime is available to await on, such as `Drop`.
pub fn remove_path_blocking(path: &Path) -> Result<bool, CleanupError> {
    let metadata = match std::fs::symlink_metadata(path) {
        Ok(m) => m,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(false),
        Err(e) => return Err(CleanupError::new(path, e)),
    };

    let result = if metadata.is_dir() {
        std::fs::remove_dir_all(path)
    } else {
        std::fs::remove_file(path)
    };

    match result {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(CleanupError::new(path, e)),
    }
}
