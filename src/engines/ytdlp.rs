//! yt-dlp engine implementation
//!
//! Runs the `yt-dlp` executable as a subprocess: a flat JSON search for
//! metadata, then a download with audio extraction for the chosen candidate.

use super::traits::*;
use crate::config::{FetchSettings, SearchSettings};
use crate::search::Candidate;
use async_trait::async_trait;
use serde::Deserialize;
use std::path::PathBuf;
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

/// Longest stderr excerpt kept in an [`EngineError::Exited`]
const STDERR_EXCERPT: usize = 500;

/// yt-dlp subprocess engine
pub struct YtDlp {
    search: SearchSettings,
    fetch: FetchSettings,
}

impl YtDlp {
    pub fn new(search: &SearchSettings, fetch: &FetchSettings) -> Self {
        Self {
            search: search.clone(),
            fetch: fetch.clone(),
        }
    }

    /// Installed yt-dlp version, `None` when the executable cannot be run
    pub async fn version(&self) -> Option<String> {
        let stdout = run(&self.search.binary, &["--version".to_string()])
            .await
            .ok()?;
        let version = String::from_utf8_lossy(&stdout).trim().to_string();
        if version.is_empty() {
            None
        } else {
            Some(version)
        }
    }

    /// Arguments for a metadata-only search
    fn search_args(&self, query: &str, limit: u32) -> Vec<String> {
        let mut args = vec!["--dump-single-json".to_string()];
        if self.search.extract_flat {
            args.push("--flat-playlist".to_string());
        }
        if self.search.quiet {
            args.push("--quiet".to_string());
        }
        if self.search.no_warnings {
            args.push("--no-warnings".to_string());
        }
        args.push("--default-search".to_string());
        args.push(self.search.default_search.clone());
        args.push(format!("{}{}:{}", self.search.default_search, limit, query));
        args
    }

    /// Arguments for download plus transcode
    fn fetch_args(&self, request: &FetchRequest<'_>) -> Vec<String> {
        let template = request
            .dest_dir
            .join(format!("{}.%(ext)s", request.file_stem));

        let mut args = vec![
            "-f".to_string(),
            self.fetch.format.clone(),
            "--extract-audio".to_string(),
            "--audio-format".to_string(),
            self.fetch.codec.clone(),
            "--audio-quality".to_string(),
            self.fetch.quality.clone(),
            "-o".to_string(),
            template.to_string_lossy().into_owned(),
            "--no-playlist".to_string(),
        ];
        if self.fetch.embed_metadata {
            args.extend([
                "--embed-metadata".to_string(),
                "--parse-metadata".to_string(),
                "title:%(track)s".to_string(),
                "--parse-metadata".to_string(),
                "uploader:%(artist)s".to_string(),
            ]);
        }
        if self.fetch.embed_thumbnail {
            args.push("--embed-thumbnail".to_string());
        }
        if self.fetch.continue_downloads {
            args.push("--continue".to_string());
        }
        if self.fetch.restrict_filenames {
            args.push("--restrict-filenames".to_string());
        }
        if self.fetch.quiet {
            args.extend(["--quiet".to_string(), "--no-warnings".to_string()]);
        }
        // Report the final path once post-processing has moved the file into place
        args.extend([
            "--no-simulate".to_string(),
            "--print".to_string(),
            "after_move:filepath".to_string(),
        ]);
        args.push("--".to_string());
        args.push(request.locator.to_string());
        args
    }
}

#[async_trait]
impl MediaEngine for YtDlp {
    fn name(&self) -> &str {
        "yt-dlp"
    }

    fn output_extension(&self) -> &str {
        &self.fetch.codec
    }

    async fn search(&self, query: &str, limit: u32) -> Result<Vec<Candidate>, EngineError> {
        let args = self.search_args(query, limit);
        debug!("Running {} {:?}", self.search.binary, args);
        let stdout = run(&self.search.binary, &args).await?;
        parse_search(&stdout, limit as usize)
    }

    async fn fetch(&self, request: FetchRequest<'_>) -> Result<Option<PathBuf>, EngineError> {
        let args = self.fetch_args(&request);
        debug!("Running {} {:?}", self.fetch.binary, args);
        let stdout = run(&self.fetch.binary, &args).await?;
        Ok(reported_path(&String::from_utf8_lossy(&stdout)))
    }
}

/// Run the executable to completion and return its stdout
async fn run(binary: &str, args: &[String]) -> Result<Vec<u8>, EngineError> {
    let output = Command::new(binary)
        .args(args)
        .stdin(Stdio::null())
        .kill_on_drop(true)
        .output()
        .await
        .map_err(|source| EngineError::Spawn {
            binary: binary.to_string(),
            source,
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(EngineError::Exited {
            binary: binary.to_string(),
            status: output.status.to_string(),
            stderr: excerpt(stderr.trim(), STDERR_EXCERPT),
        });
    }

    Ok(output.stdout)
}

/// Keep the tail of long engine output, where yt-dlp puts the error
fn excerpt(text: &str, max_chars: usize) -> String {
    let count = text.chars().count();
    if count <= max_chars {
        return text.to_string();
    }
    text.chars().skip(count - max_chars).collect()
}

/// Last non-empty stdout line, which `--print after_move:filepath` writes
fn reported_path(stdout: &str) -> Option<PathBuf> {
    stdout
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && *line != "NA")
        .last()
        .map(PathBuf::from)
}

#[derive(Debug, Deserialize)]
struct FlatPlaylist {
    #[serde(default)]
    entries: Option<Vec<FlatEntry>>,
}

#[derive(Debug, Deserialize)]
struct FlatEntry {
    id: Option<String>,
    url: Option<String>,
    webpage_url: Option<String>,
    title: Option<String>,
    uploader: Option<String>,
    channel: Option<String>,
    duration: Option<f64>,
    thumbnails: Option<Vec<FlatThumbnail>>,
    thumbnail: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FlatThumbnail {
    url: Option<String>,
}

impl FlatEntry {
    fn into_candidate(self) -> Option<Candidate> {
        let locator = self
            .url
            .or(self.webpage_url)
            .or_else(|| {
                self.id
                    .as_ref()
                    .map(|id| format!("https://www.youtube.com/watch?v={}", id))
            })?;

        let title = self
            .title
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| "Unknown title".to_string());
        let uploader = self
            .uploader
            .or(self.channel)
            .filter(|u| !u.trim().is_empty())
            .unwrap_or_else(|| "Unknown artist".to_string());
        let thumbnail = self
            .thumbnails
            .unwrap_or_default()
            .into_iter()
            .next()
            .and_then(|t| t.url)
            .or(self.thumbnail);

        let mut candidate = Candidate::new(locator, title).with_uploader(uploader);
        candidate.duration = self.duration;
        candidate.thumbnail = thumbnail;
        Some(candidate)
    }
}

/// Parse the single JSON document printed by a flat search
fn parse_search(stdout: &[u8], limit: usize) -> Result<Vec<Candidate>, EngineError> {
    let playlist: FlatPlaylist = serde_json::from_slice(stdout)?;
    Ok(playlist
        .entries
        .unwrap_or_default()
        .into_iter()
        .filter_map(FlatEntry::into_candidate)
        .take(limit)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn engine() -> YtDlp {
        YtDlp::new(&SearchSettings::default(), &FetchSettings::default())
    }

    #[test]
    fn test_search_args() {
        let args = engine().search_args("dua lipa houdini", 3);
        assert!(args.contains(&"--flat-playlist".to_string()));
        assert!(args.contains(&"--dump-single-json".to_string()));
        assert!(args.contains(&"--no-warnings".to_string()));
        assert_eq!(args.last().unwrap(), "ytsearch3:dua lipa houdini");
    }

    #[test]
    fn test_fetch_args() {
        let dir = Path::new("downloads/user_42");
        let request = FetchRequest {
            locator: "https://www.youtube.com/watch?v=abc",
            dest_dir: dir,
            file_stem: "Houdini",
        };
        let args = engine().fetch_args(&request);

        let joined = args.join(" ");
        assert!(joined.contains("-f bestaudio/best"));
        assert!(joined.contains("--audio-format mp3"));
        assert!(joined.contains("--audio-quality 0"));
        assert!(joined.contains("--embed-thumbnail"));
        assert!(joined.contains("--restrict-filenames"));
        assert!(joined.contains("--print after_move:filepath"));
        assert!(args.contains(&dir.join("Houdini.%(ext)s").to_string_lossy().into_owned()));
        assert_eq!(args.last().unwrap(), "https://www.youtube.com/watch?v=abc");
    }

    #[test]
    fn test_parse_search() {
        let json = br#"{
            "_type": "playlist",
            "entries": [
                {
                    "id": "abc",
                    "url": "https://www.youtube.com/watch?v=abc",
                    "title": "Dua Lipa - Houdini",
                    "channel": "Dua Lipa",
                    "duration": 188.0,
                    "thumbnails": [{"url": "https://i.ytimg.com/vi/abc/hq720.jpg"}]
                },
                {"id": "def", "title": null, "uploader": null},
                {"title": "no locator"},
                {"id": "ghi", "title": "Third"}
            ]
        }"#;

        let candidates = parse_search(json, 3).unwrap();
        assert_eq!(candidates.len(), 3);

        let first = &candidates[0];
        assert_eq!(first.title, "Dua Lipa - Houdini");
        assert_eq!(first.uploader, "Dua Lipa");
        assert_eq!(first.duration, Some(188.0));
        assert_eq!(
            first.thumbnail.as_deref(),
            Some("https://i.ytimg.com/vi/abc/hq720.jpg")
        );

        let second = &candidates[1];
        assert_eq!(second.locator, "https://www.youtube.com/watch?v=def");
        assert_eq!(second.title, "Unknown title");
        assert_eq!(second.uploader, "Unknown artist");

        assert_eq!(candidates[2].title, "Third");
    }

    #[test]
    fn test_parse_empty_search() {
        assert!(parse_search(br#"{"entries": []}"#, 3).unwrap().is_empty());
        assert!(parse_search(br#"{"_type": "playlist"}"#, 3).unwrap().is_empty());
        assert!(parse_search(b"not json", 3).is_err());
    }

    #[test]
    fn test_reported_path() {
        assert_eq!(
            reported_path("downloads/user_1/Song.mp3\n\n"),
            Some(PathBuf::from("downloads/user_1/Song.mp3"))
        );
        assert_eq!(reported_path("  \nNA\n"), None);
        assert_eq!(reported_path(""), None);
    }

    #[test]
    fn test_excerpt_keeps_tail() {
        assert_eq!(excerpt("short", 10), "short");
        assert_eq!(excerpt("0123456789", 4), "6789");
    }
}
