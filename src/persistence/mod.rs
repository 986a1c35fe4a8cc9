//! File persistence
//!
//! Downloaded and uploaded payloads are written through a [`FileStore`] so
//! callers can decide where bytes land. [`DirectoryFileStore`] writes into a
//! single directory with `tokio::fs`.

use crate::error::{Result, UrlManagerError};
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// Persists bytes under a suggested file name and returns where they went.
#[async_trait]
pub trait FileStore: Send + Sync {
    async fn save(&self, bytes: &[u8], suggested_name: &str) -> Result<PathBuf>;
}

/// Writes files into one root directory, created on first use.
#[derive(Debug, Clone)]
pub struct DirectoryFileStore {
    root: PathBuf,
}

impl DirectoryFileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Store rooted in the system temporary directory.
    pub fn in_temp_dir() -> Self {
        Self::new(std::env::temp_dir())
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

/// Keep only the final path component so names cannot escape the root.
fn sanitize_name(suggested_name: &str) -> Option<&str> {
    Path::new(suggested_name)
        .file_name()
        .and_then(|n| n.to_str())
        .filter(|n| !n.is_empty())
}

#[async_trait]
impl FileStore for DirectoryFileStore {
    async fn save(&self, bytes: &[u8], suggested_name: &str) -> Result<PathBuf> {
        let name = sanitize_name(suggested_name).ok_or_else(|| {
            UrlManagerError::Io(format!("invalid file name: {suggested_name:?}"))
        })?;
        tokio::fs::create_dir_all(&self.root).await?;
        let path = self.root.join(name);
        tokio::fs::write(&path, bytes).await?;
        tracing::debug!(target: "url_manager::persistence", path=%path.display(), bytes=bytes.len(), "file saved");
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn saves_into_root() {
        let dir = tempfile::tempdir().unwrap();
        let store = DirectoryFileStore::new(dir.path().join("downloads"));

        let path = store.save(b"%PDF-1.4", "report.pdf").await.unwrap();
        assert_eq!(path, dir.path().join("downloads").join("report.pdf"));
        assert_eq!(tokio::fs::read(&path).await.unwrap(), b"%PDF-1.4");
    }

    #[tokio::test]
    async fn overwrites_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = DirectoryFileStore::new(dir.path());
        store.save(b"one", "a.txt").await.unwrap();
        let path = store.save(b"two", "a.txt").await.unwrap();
        assert_eq!(tokio::fs::read(&path).await.unwrap(), b"two");
    }

    #[tokio::test]
    async fn strips_directories_from_name() {
        let dir = tempfile::tempdir().unwrap();
        let store = DirectoryFileStore::new(dir.path());
        let path = store.save(b"x", "../../etc/passwd").await.unwrap();
        assert_eq!(path, dir.path().join("passwd"));
    }

    #[tokio::test]
    async fn rejects_empty_name() {
        let dir = tempfile::tempdir().unwrap();
        let store = DirectoryFileStore::new(dir.path());
        assert!(matches!(store.save(b"x", "").await, Err(UrlManagerError::Io(_))));
        assert!(matches!(store.save(b"x", "..").await, Err(UrlManagerError::Io(_))));
    }
}
