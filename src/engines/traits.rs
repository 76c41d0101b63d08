//! Engine traits and types

use crate::search::Candidate;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Failure talking to the external media engine
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("failed to start {binary}: {source}")]
    Spawn {
        binary: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{binary} exited with {status}: {stderr}")]
    Exited {
        binary: String,
        status: String,
        stderr: String,
    },
    #[error("could not parse engine output: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Where and under what name a fetched file should land
#[derive(Debug, Clone, Copy)]
pub struct FetchRequest<'a> {
    /// Locator taken from the chosen candidate
    pub locator: &'a str,
    /// Per-user scratch directory
    pub dest_dir: &'a Path,
    /// File name without extension, already sanitized
    pub file_stem: &'a str,
}

/// Main trait for the external search/extract/transcode engine
#[async_trait]
pub trait MediaEngine: Send + Sync {
    /// Engine name
    fn name(&self) -> &str;

    /// Extension of the files produced by [`MediaEngine::fetch`]
    fn output_extension(&self) -> &str;

    /// Metadata-only search, returning at most `limit` candidates in provider order
    async fn search(&self, query: &str, limit: u32) -> Result<Vec<Candidate>, EngineError>;

    /// Download and transcode a candidate.
    ///
    /// Returns the path of the produced file when the engine reports one.
    async fn fetch(&self, request: FetchRequest<'_>) -> Result<Option<PathBuf>, EngineError>;
}
