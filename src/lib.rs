//! tunefetch: a Telegram bot that finds a song by free-text query and sends
//! it back as mp3.
//!
//! Search, download and transcoding are delegated to `yt-dlp`; this crate
//! validates the request, sequences the calls, enforces the upload limit and
//! cleans up per-user scratch storage.

pub mod bot;
pub mod config;
pub mod delivery;
pub mod engines;
pub mod error;
pub mod fetch;
pub mod flow;
pub mod locales;
pub mod network;
pub mod query;
pub mod search;
pub mod session;
pub mod storage;
pub mod transport;

pub use config::Settings;
pub use engines::MediaEngine;
pub use error::FlowError;
pub use flow::{Flow, Inbound, Outcome};
pub use transport::Transport;

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Minimum query length in characters
pub const QUERY_MIN_LEN: usize = 3;

/// Maximum query length in characters
pub const QUERY_MAX_LEN: usize = 100;

/// Number of candidates requested from the search engine
pub const SEARCH_LIMIT: u32 = 3;

/// Largest file sent to users, in MiB
pub const MAX_FILE_SIZE_MB: f64 = 48.0;

/// Error details shown to users are cut to this many characters
pub const ERROR_MESSAGE_LIMIT: usize = 200;
