//! On-disk layout of transient and published files.
//!
//! ```text
//! <data_dir>/renders/<id>/animation.py                  transient
//! <data_dir>/audio/<id>.mp3                             transient
//! <data_dir>/videos/<id>/<basename>_with_audio.mp4      published
//! ```

use std::io;
use std::path::{Path, PathBuf};

use algoviz_models::RenderId;

/// URL prefix the published tree is served under.
pub const VIDEOS_URL_PREFIX: &str = "/videos";

/// Suffix appended to the rendered video's stem when publishing.
pub const PUBLISHED_SUFFIX: &str = "_with_audio";

#[derive(Debug, Clone)]
pub struct StorageLayout {
    renders_root: PathBuf,
    audio_root: PathBuf,
    videos_root: PathBuf,
}

impl StorageLayout {
    pub fn new(data_dir: impl AsRef<Path>) -> Self {
        let data_dir = data_dir.as_ref();
        Self {
            renders_root: data_dir.join("renders"),
            audio_root: data_dir.join("audio"),
            videos_root: data_dir.join("videos"),
        }
    }

    pub fn renders_root(&self) -> &Path {
        &self.renders_root
    }

    pub fn audio_root(&self) -> &Path {
        &self.audio_root
    }

    pub fn videos_root(&self) -> &Path {
        &self.videos_root
    }

    /// Transient working directory of one job.
    pub fn work_dir(&self, id: &RenderId) -> PathBuf {
        self.renders_root.join(id.as_str())
    }

    /// Published directory of one job.
    pub fn published_dir(&self, id: &RenderId) -> PathBuf {
        self.videos_root.join(id.as_str())
    }

    /// File name a rendered video is published under.
    pub fn published_name(basename: &str, extension: &str) -> String {
        format!("{}{}.{}", basename, PUBLISHED_SUFFIX, extension)
    }

    /// Public URL of a published file.
    pub fn video_url(id: &RenderId, file_name: &str) -> String {
        format!("{}/{}/{}", VIDEOS_URL_PREFIX, id, file_name)
    }

    /// Create the three roots.
    pub async fn ensure_roots(&self) -> io::Result<()> {
        for root in self.roots() {
            tokio::fs::create_dir_all(root).await?;
        }
        Ok(())
    }

    /// Check that a file can be created in each root.
    pub fn check_writable(&self) -> Result<(), (PathBuf, io::Error)> {
        for root in self.roots() {
            tempfile::tempfile_in(root).map_err(|e| (root.to_path_buf(), e))?;
        }
        Ok(())
    }

    fn roots(&self) -> [&Path; 3] {
        [&self.renders_root, &self.audio_root, &self.videos_root]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths() {
        let layout = StorageLayout::new("/data");
        let id = RenderId::parse("3f2b").unwrap();

        assert_eq!(layout.work_dir(&id), PathBuf::from("/data/renders/3f2b"));
        assert_eq!(layout.published_dir(&id), PathBuf::from("/data/videos/3f2b"));
        assert_eq!(layout.audio_root(), Path::new("/data/audio"));
        assert_eq!(
            StorageLayout::published_name("AlgorithmDemo", "mp4"),
            "AlgorithmDemo_with_audio.mp4"
        );
        assert_eq!(
            StorageLayout::video_url(&id, "AlgorithmDemo_with_audio.mp4"),
            "/videos/3f2b/AlgorithmDemo_with_audio.mp4"
        );
    }

    #[tokio::test]
    async fn test_ensure_roots_then_writable() {
        let dir = tempfile::TempDir::new().unwrap();
        let layout = StorageLayout::new(dir.path());

        assert!(layout.check_writable().is_err());
        layout.ensure_roots().await.unwrap();
        assert!(layout.check_writable().is_ok());
        assert!(dir.path().join("videos").is_dir());
    }
}
