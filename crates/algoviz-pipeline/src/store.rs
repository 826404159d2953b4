//! Published video tree.

use std::io;
use std::path::PathBuf;

use algoviz_media::fs_utils::remove_dir_if_exists;
use algoviz_models::RenderId;
use tracing::{info, warn};

use crate::error::PipelineResult;
use crate::metrics;

/// Explicit purging of published videos.
#[derive(Debug, Clone)]
pub struct PublishedStore {
    root: PathBuf,
}

impl PublishedStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Remove one published directory. Returns `false` if it did not exist.
    pub async fn remove(&self, id: &RenderId) -> PipelineResult<bool> {
        let removed = remove_dir_if_exists(self.root.join(id.as_str())).await?;
        if removed {
            info!(render_id = %id, "Removed published video");
        }
        Ok(removed)
    }

    /// Remove every published directory and return how many were removed.
    ///
    /// A directory that cannot be removed is logged and skipped.
    pub async fn remove_all(&self) -> PipelineResult<usize> {
        let mut reader = match tokio::fs::read_dir(&self.root).await {
            Ok(reader) => reader,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(0),
            Err(e) => return Err(e.into()),
        };

        let mut count = 0;
        while let Some(entry) = reader.next_entry().await? {
            if !entry.file_type().await?.is_dir() {
                continue;
            }
            match remove_dir_if_exists(entry.path()).await {
                Ok(true) => count += 1,
                Ok(false) => {}
                Err(e) => {
                    metrics::record_cleanup_failure();
                    warn!(error = %e, "Failed to remove published video");
                }
            }
        }

        info!(count, "Removed all published videos");
        Ok(count)
    }
}
