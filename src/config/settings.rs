//! Settings structures for tunefetch configuration

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main settings structure matching `tunefetch.yml`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub limits: LimitSettings,
    pub search: SearchSettings,
    pub fetch: FetchSettings,
    pub storage: StorageSettings,
    pub session: SessionSettings,
    pub outgoing: OutgoingSettings,
}

impl Settings {
    /// Load settings from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let settings: Settings = serde_yaml::from_str(&content)?;
        Ok(settings)
    }

    /// Merge with environment variables (`BOT_TOKEN` and the `TUNEFETCH_*` prefix)
    pub fn merge_env(&mut self) {
        if let Ok(val) = std::env::var("BOT_TOKEN") {
            if !val.trim().is_empty() {
                self.general.bot_token = Some(val.trim().to_string());
            }
        }
        if let Ok(val) = std::env::var("TUNEFETCH_DEBUG") {
            self.general.debug = val.parse().unwrap_or(false);
        }
        if let Ok(val) = std::env::var("TUNEFETCH_LOCALE") {
            self.general.locale = val;
        }
        if let Ok(val) = std::env::var("TUNEFETCH_DOWNLOAD_DIR") {
            self.storage.download_dir = PathBuf::from(val);
        }
        if let Ok(val) = std::env::var("TUNEFETCH_YTDLP_PATH") {
            self.search.binary = val.clone();
            self.fetch.binary = val;
        }
    }

    /// Check that the settings can run a bot
    pub fn validate(&self) -> Result<()> {
        if self.bot_token().is_none() {
            bail!("BOT_TOKEN is not set (environment, .env or general.bot_token)");
        }
        if self.limits.query_min_len == 0 {
            bail!("limits.query_min_len must be at least 1");
        }
        if self.limits.query_min_len > self.limits.query_max_len {
            bail!(
                "limits.query_min_len ({}) exceeds limits.query_max_len ({})",
                self.limits.query_min_len,
                self.limits.query_max_len
            );
        }
        if self.search.result_limit == 0 {
            bail!("search.result_limit must be at least 1");
        }
        if self.fetch.codec.is_empty() {
            bail!("fetch.codec must not be empty");
        }
        for (name, secs) in [
            ("outgoing.request_timeout", self.outgoing.request_timeout),
            ("outgoing.connect_timeout", self.outgoing.connect_timeout),
        ] {
            if !secs.is_finite() || secs <= 0.0 {
                bail!("{} must be a positive number of seconds, got {}", name, secs);
            }
        }
        Ok(())
    }

    /// Bot access token, if one was configured
    pub fn bot_token(&self) -> Option<&str> {
        self.general
            .bot_token
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }
}

/// General settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Enable debug logging
    pub debug: bool,
    /// Language of user-facing messages (`en`, `uk`)
    pub locale: String,
    /// Bot access token; usually supplied through `BOT_TOKEN`
    #[serde(skip_serializing)]
    pub bot_token: Option<String>,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            debug: false,
            locale: "en".to_string(),
            bot_token: None,
        }
    }
}

/// Request limits
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitSettings {
    /// Minimum query length in characters
    pub query_min_len: usize,
    /// Maximum query length in characters
    pub query_max_len: usize,
    /// Largest file that may be delivered, in MiB
    pub max_file_size_mb: f64,
    /// Error details shown to users are cut to this many characters
    pub error_message_limit: usize,
}

impl Default for LimitSettings {
    fn default() -> Self {
        Self {
            query_min_len: crate::QUERY_MIN_LEN,
            query_max_len: crate::QUERY_MAX_LEN,
            max_file_size_mb: crate::MAX_FILE_SIZE_MB,
            error_message_limit: crate::ERROR_MESSAGE_LIMIT,
        }
    }
}

/// Search engine settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchSettings {
    /// yt-dlp executable
    pub binary: String,
    /// Search prefix understood by the engine (`ytsearch`, `scsearch`, ...)
    pub default_search: String,
    /// Number of candidates requested from the engine
    pub result_limit: u32,
    /// Metadata-only search
    pub extract_flat: bool,
    /// Suppress engine output
    pub quiet: bool,
    pub no_warnings: bool,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            binary: "yt-dlp".to_string(),
            default_search: "ytsearch".to_string(),
            result_limit: crate::SEARCH_LIMIT,
            extract_flat: true,
            quiet: true,
            no_warnings: true,
        }
    }
}

/// Download and transcode settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchSettings {
    /// yt-dlp executable
    pub binary: String,
    /// Format selector
    pub format: String,
    /// Target audio codec; also the extension of the produced file
    pub codec: String,
    /// Audio quality passed to the transcoder, `0` is best
    pub quality: String,
    pub embed_metadata: bool,
    pub embed_thumbnail: bool,
    /// Resume partially downloaded files
    pub continue_downloads: bool,
    /// Restrict file names to ASCII
    pub restrict_filenames: bool,
    pub quiet: bool,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            binary: "yt-dlp".to_string(),
            format: "bestaudio/best".to_string(),
            codec: "mp3".to_string(),
            quality: "0".to_string(),
            embed_metadata: true,
            embed_thumbnail: true,
            continue_downloads: true,
            restrict_filenames: true,
            quiet: true,
        }
    }
}

/// Scratch storage settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    /// Root of the per-user scratch directories
    pub download_dir: PathBuf,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            download_dir: PathBuf::from("downloads"),
        }
    }
}

/// Conversation state settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionSettings {
    /// Idle sessions are forgotten after this many seconds
    pub idle_timeout: u64,
    /// Maximum number of tracked sessions
    pub max_capacity: u64,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            idle_timeout: 3600,
            max_capacity: 10_000,
        }
    }
}

/// Outgoing request settings for the bot API client
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutgoingSettings {
    /// Request timeout in seconds; uploads need a generous value
    pub request_timeout: f64,
    /// Connect timeout in seconds
    pub connect_timeout: f64,
    /// Proxy settings
    pub proxies: ProxySettings,
}

impl Default for OutgoingSettings {
    fn default() -> Self {
        Self {
            request_timeout: 300.0,
            connect_timeout: 10.0,
            proxies: ProxySettings::default(),
        }
    }
}

/// Proxy settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProxySettings {
    pub http: Option<String>,
    pub https: Option<String>,
    pub all: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.limits.query_min_len, 3);
        assert_eq!(settings.limits.query_max_len, 100);
        assert_eq!(settings.limits.max_file_size_mb, 48.0);
        assert_eq!(settings.search.result_limit, 3);
        assert_eq!(settings.search.default_search, "ytsearch");
        assert_eq!(settings.fetch.codec, "mp3");
        assert!(!settings.general.debug);
    }

    #[test]
    fn test_missing_token_is_rejected() {
        let settings = Settings::default();
        assert!(settings.validate().is_err());

        let mut settings = Settings::default();
        settings.general.bot_token = Some("   ".to_string());
        assert!(settings.validate().is_err());

        settings.general.bot_token = Some("123:abc".to_string());
        assert!(settings.validate().is_ok());
        assert_eq!(settings.bot_token(), Some("123:abc"));
    }

    #[test]
    fn test_inconsistent_limits_are_rejected() {
        let mut settings = Settings::default();
        settings.general.bot_token = Some("123:abc".to_string());
        settings.limits.query_min_len = 50;
        settings.limits.query_max_len = 10;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_bad_timeouts_are_rejected() {
        let mut settings = Settings::default();
        settings.general.bot_token = Some("123:abc".to_string());
        settings.outgoing.request_timeout = -1.0;
        assert!(settings.validate().is_err());

        settings.outgoing.request_timeout = 300.0;
        settings.outgoing.connect_timeout = f64::NAN;
        assert!(settings.validate().is_err());

        settings.outgoing.connect_timeout = 10.0;
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_partial_yaml() {
        let yaml = "general:\n  locale: uk\nlimits:\n  max_file_size_mb: 20\n";
        let settings: Settings = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(settings.general.locale, "uk");
        assert_eq!(settings.limits.max_file_size_mb, 20.0);
        assert_eq!(settings.limits.query_max_len, 100);
        assert_eq!(settings.storage.download_dir, PathBuf::from("downloads"));
    }
}
