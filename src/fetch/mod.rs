//! Fetch module
//!
//! Downloads and transcodes the chosen candidate into the user's scratch
//! directory, then works out which file the engine produced.

use crate::engines::{EngineError, FetchRequest, MediaEngine};
use crate::search::Candidate;
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;
use tracing::{debug, info, warn};

static FS_SPECIAL: Lazy<Regex> = Lazy::new(|| Regex::new(r#"[<>:"/\\|?*]"#).unwrap());

/// Download or post-processing failure
#[derive(Debug, Error)]
pub enum FetchError {
    #[error(transparent)]
    Engine(#[from] EngineError),
    #[error("no .{extension} file found in {}", .dir.display())]
    OutputMissing { dir: PathBuf, extension: String },
    #[error("{} was not created", .0.display())]
    FileNotCreated(PathBuf),
    #[error("scratch storage error: {0}")]
    Io(#[from] std::io::Error),
}

/// A transcoded file in scratch storage
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedAsset {
    pub path: PathBuf,
    pub size_bytes: u64,
}

impl FetchedAsset {
    /// Size in MiB
    pub fn size_mb(&self) -> f64 {
        crate::error::bytes_to_mb(self.size_bytes)
    }
}

/// Fetch adapter around the media engine
pub struct Fetcher {
    engine: Arc<dyn MediaEngine>,
}

impl Fetcher {
    pub fn new(engine: Arc<dyn MediaEngine>) -> Self {
        Self { engine }
    }

    /// Download `candidate` into `dest_dir` and locate the produced file
    pub async fn fetch(
        &self,
        candidate: &Candidate,
        dest_dir: &Path,
    ) -> Result<FetchedAsset, FetchError> {
        let start = Instant::now();
        let file_stem = sanitize_filename(&candidate.title);
        let request = FetchRequest {
            locator: &candidate.locator,
            dest_dir,
            file_stem: &file_stem,
        };

        let reported = self.engine.fetch(request).await?;
        debug!(
            "Engine {} finished in {:?}, reported {:?}",
            self.engine.name(),
            start.elapsed(),
            reported
        );

        let path =
            resolve_output(reported, dest_dir, self.engine.output_extension()).await?;

        let metadata = match tokio::fs::metadata(&path).await {
            Ok(metadata) if metadata.is_file() => metadata,
            _ => return Err(FetchError::FileNotCreated(path)),
        };

        info!("Final file: {} ({} bytes)", path.display(), metadata.len());
        Ok(FetchedAsset {
            path,
            size_bytes: metadata.len(),
        })
    }
}

/// Replace characters that are special on common filesystems with `_`
pub fn sanitize_filename(name: &str) -> String {
    let cleaned = FS_SPECIAL.replace_all(name, "_");
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        "audio".to_string()
    } else {
        cleaned.to_string()
    }
}

/// Pick the produced file.
///
/// The engine's reported path wins when it exists. Otherwise the first file in
/// `dir` with the target extension, in file-name order, is taken; this is a
/// last-resort guess when several files could match.
pub async fn resolve_output(
    reported: Option<PathBuf>,
    dir: &Path,
    extension: &str,
) -> Result<PathBuf, FetchError> {
    if let Some(path) = reported {
        if tokio::fs::try_exists(&path).await.unwrap_or(false) {
            return Ok(path);
        }
        warn!(
            "Reported file {} does not exist, scanning {}",
            path.display(),
            dir.display()
        );
    }

    let mut matches = Vec::new();
    let mut entries = tokio::fs::read_dir(dir).await?;
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        let is_match = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.eq_ignore_ascii_case(extension))
            .unwrap_or(false);
        if is_match {
            matches.push(path);
        }
    }
    matches.sort();

    match matches.into_iter().next() {
        Some(path) => {
            warn!("Using fallback: found {}", path.display());
            Ok(path)
        }
        None => Err(FetchError::OutputMissing {
            dir: dir.to_path_buf(),
            extension: extension.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("AC/DC: Back In Black?"), "AC_DC_ Back In Black_");
        assert_eq!(sanitize_filename(r#"a<b>c"d\e|f*g"#), "a_b_c_d_e_f_g");
        assert_eq!(sanitize_filename("  Houdini  "), "Houdini");
        assert_eq!(sanitize_filename("   "), "audio");
    }

    #[tokio::test]
    async fn test_resolve_prefers_reported_path() {
        let dir = tempfile::tempdir().unwrap();
        let reported = dir.path().join("Song.mp3");
        tokio::fs::write(&reported, b"id3").await.unwrap();
        tokio::fs::write(dir.path().join("Another.mp3"), b"id3").await.unwrap();

        let path = resolve_output(Some(reported.clone()), dir.path(), "mp3")
            .await
            .unwrap();
        assert_eq!(path, reported);
    }

    #[tokio::test]
    async fn test_resolve_falls_back_to_scan() {
        let dir = tempfile::tempdir().unwrap();
        tokio::fs::write(dir.path().join("b.mp3"), b"id3").await.unwrap();
        tokio::fs::write(dir.path().join("a.webm"), b"raw").await.unwrap();
        tokio::fs::write(dir.path().join("a.mp3"), b"id3").await.unwrap();

        let path = resolve_output(None, dir.path(), "mp3").await.unwrap();
        assert_eq!(path, dir.path().join("a.mp3"));

        let missing = dir.path().join("gone.mp3");
        let path = resolve_output(Some(missing), dir.path(), "mp3").await.unwrap();
        assert_eq!(path, dir.path().join("a.mp3"));
    }

    #[tokio::test]
    async fn test_resolve_reports_missing_output() {
        let dir = tempfile::tempdir().unwrap();
        tokio::fs::write(dir.path().join("a.webm"), b"raw").await.unwrap();

        let err = resolve_output(None, dir.path(), "mp3").await.unwrap_err();
        assert!(matches!(err, FetchError::OutputMissing { .. }));
    }
}
