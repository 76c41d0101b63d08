//! Scratch storage
//!
//! Each user gets `<root>/user_<id>` for the duration of one request. The
//! directory is created on demand and removed recursively when the request
//! ends, whatever the outcome.

use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Root of the per-user scratch directories
#[derive(Debug, Clone)]
pub struct ScratchSpace {
    root: PathBuf,
}

impl ScratchSpace {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Create the root directory
    pub async fn init(&self) -> io::Result<()> {
        tokio::fs::create_dir_all(&self.root).await
    }

    /// Scratch directory path for a user; not created
    pub fn user_dir(&self, user_id: u64) -> PathBuf {
        self.root.join(format!("user_{}", user_id))
    }

    /// Create the user's scratch directory and return its path
    pub async fn prepare(&self, user_id: u64) -> io::Result<PathBuf> {
        let dir = self.user_dir(user_id);
        tokio::fs::create_dir_all(&dir).await?;
        debug!("Prepared scratch directory {}", dir.display());
        Ok(dir)
    }

    /// Remove the user's scratch directory and everything in it.
    ///
    /// A directory that is already gone is fine; other failures are logged.
    pub async fn release(&self, user_id: u64) {
        let dir = self.user_dir(user_id);
        match tokio::fs::remove_dir_all(&dir).await {
            Ok(()) => debug!("Removed scratch directory {}", dir.display()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => warn!("Failed to remove scratch directory {}: {}", dir.display(), e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_prepare_and_release() {
        let root = tempfile::tempdir().unwrap();
        let scratch = ScratchSpace::new(root.path().join("downloads"));
        scratch.init().await.unwrap();

        let dir = scratch.prepare(42).await.unwrap();
        assert_eq!(dir, root.path().join("downloads").join("user_42"));
        assert!(dir.is_dir());

        tokio::fs::create_dir_all(dir.join("nested")).await.unwrap();
        tokio::fs::write(dir.join("nested/file.mp3"), b"id3").await.unwrap();

        scratch.release(42).await;
        assert!(!dir.exists());
        assert!(scratch.root().is_dir());
    }

    #[tokio::test]
    async fn test_release_missing_directory() {
        let root = tempfile::tempdir().unwrap();
        let scratch = ScratchSpace::new(root.path());
        scratch.release(7).await;
        assert!(!scratch.user_dir(7).exists());
    }
}
