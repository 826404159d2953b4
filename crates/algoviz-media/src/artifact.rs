//! Locating the file an external renderer produced.
//!
//! Renderers bury their output under tool-specific directory trees. The
//! search here is depth-first and shallowest-first: a matching file directly
//! in a directory beats anything in its subdirectories.

use std::collections::BTreeSet;
use std::io;
use std::path::{Path, PathBuf};

use async_trait::async_trait;

/// One directory entry as seen by [`DirectoryReader`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntryInfo {
    pub path: PathBuf,
    pub is_dir: bool,
}

/// Read-only directory listing.
#[async_trait]
pub trait DirectoryReader: Send + Sync {
    /// List the direct children of `dir` in listing order.
    async fn read_dir(&self, dir: &Path) -> io::Result<Vec<DirEntryInfo>>;
}

/// The local filesystem. Entries are sorted by file name.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFs;

#[async_trait]
impl DirectoryReader for LocalFs {
    async fn read_dir(&self, dir: &Path) -> io::Result<Vec<DirEntryInfo>> {
        let mut entries = Vec::new();
        let mut reader = tokio::fs::read_dir(dir).await?;
        while let Some(entry) = reader.next_entry().await? {
            entries.push(DirEntryInfo {
                path: entry.path(),
                is_dir: entry.file_type().await?.is_dir(),
            });
        }
        entries.sort_by(|a, b| a.path.file_name().cmp(&b.path.file_name()));
        Ok(entries)
    }
}

/// An in-memory tree built from a set of file paths.
///
/// Directories are implied by the file paths. Listing a directory that does
/// not exist yields no entries.
#[derive(Debug, Clone, Default)]
pub struct MemoryFs {
    files: BTreeSet<PathBuf>,
}

impl MemoryFs {
    pub fn with_files<I, P>(files: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            files: files.into_iter().map(Into::into).collect(),
        }
    }
}

#[async_trait]
impl DirectoryReader for MemoryFs {
    async fn read_dir(&self, dir: &Path) -> io::Result<Vec<DirEntryInfo>> {
        let mut entries: Vec<DirEntryInfo> = Vec::new();
        for file in &self.files {
            let Ok(rest) = file.strip_prefix(dir) else {
                continue;
            };
            let mut components = rest.components();
            let Some(first) = components.next() else {
                continue;
            };
            let entry = DirEntryInfo {
                path: dir.join(first),
                is_dir: components.next().is_some(),
            };
            if !entries.contains(&entry) {
                entries.push(entry);
            }
        }
        entries.sort_by(|a, b| a.path.file_name().cmp(&b.path.file_name()));
        Ok(entries)
    }
}

/// Find the first file under `root` with the given extension.
///
/// Files directly in a directory are checked before any of its
/// subdirectories are entered; subdirectories are visited in listing order.
pub async fn locate_artifact(
    fs: &dyn DirectoryReader,
    root: &Path,
    extension: &str,
) -> io::Result<Option<PathBuf>> {
    let mut pending = vec![root.to_path_buf()];

    while let Some(dir) = pending.pop() {
        let entries = fs.read_dir(&dir).await?;

        if let Some(hit) = entries
            .iter()
            .find(|e| !e.is_dir && has_extension(&e.path, extension))
        {
            return Ok(Some(hit.path.clone()));
        }

        // Reversed so the first subdirectory is popped next.
        pending.extend(
            entries
                .into_iter()
                .filter(|e| e.is_dir)
                .map(|e| e.path)
                .rev(),
        );
    }

    Ok(None)
}

fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(extension))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manim_tree() -> MemoryFs {
        MemoryFs::with_files([
            "r/animation.py",
            "r/media/videos/animation/480p15/AlgorithmDemo.mp4",
            "r/media/videos/animation/480p15/partial_movie_files/AlgorithmDemo/0001.mp4",
            "r/media/texts/abc.svg",
        ])
    }

    #[tokio::test]
    async fn test_finds_nested_video() {
        let found = locate_artifact(&manim_tree(), Path::new("r"), "mp4")
            .await
            .unwrap();
        assert_eq!(
            found,
            Some(PathBuf::from("r/media/videos/animation/480p15/AlgorithmDemo.mp4"))
        );
    }

    #[tokio::test]
    async fn test_shallow_file_beats_earlier_subdirectory() {
        let fs = MemoryFs::with_files(["r/a/deep.mp4", "r/z.mp4"]);
        let found = locate_artifact(&fs, Path::new("r"), "mp4").await.unwrap();
        assert_eq!(found, Some(PathBuf::from("r/z.mp4")));
    }

    #[tokio::test]
    async fn test_first_subdirectory_searched_fully_first() {
        let fs = MemoryFs::with_files(["r/a/x/one.mp4", "r/b/two.mp4"]);
        let found = locate_artifact(&fs, Path::new("r"), "mp4").await.unwrap();
        assert_eq!(found, Some(PathBuf::from("r/a/x/one.mp4")));
    }

    #[tokio::test]
    async fn test_not_found() {
        let fs = MemoryFs::with_files(["r/animation.py", "r/media/images/frame.png"]);
        assert_eq!(locate_artifact(&fs, Path::new("r"), "mp4").await.unwrap(), None);
        assert_eq!(
            locate_artifact(&MemoryFs::default(), Path::new("r"), "mp4")
                .await
                .unwrap(),
            None
        );
    }

    #[tokio::test]
    async fn test_local_fs_matches_memory_fs() {
        let dir = tempfile::TempDir::new().unwrap();
        let nested = dir.path().join("media/videos/animation/480p15");
        std::fs::create_dir_all(nested.join("partial_movie_files")).unwrap();
        std::fs::write(nested.join("partial_movie_files/0001.mp4"), b"p").unwrap();
        std::fs::write(nested.join("AlgorithmDemo.MP4"), b"v").unwrap();
        std::fs::write(dir.path().join("animation.py"), b"s").unwrap();

        let found = locate_artifact(&LocalFs, dir.path(), "mp4").await.unwrap();
        assert_eq!(found, Some(nested.join("AlgorithmDemo.MP4")));
    }

    #[tokio::test]
    async fn test_local_fs_missing_root_is_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let result = locate_artifact(&LocalFs, &dir.path().join("gone"), "mp4").await;
        assert_eq!(result.unwrap_err().kind(), io::ErrorKind::NotFound);
    }
}
