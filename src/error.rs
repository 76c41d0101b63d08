//! Request error taxonomy
//!
//! Every failure of a request ends up as a [`FlowError`], which the flow logs
//! and renders for the user. None of them is fatal to the process.

use crate::fetch::FetchError;
use crate::locales::Catalog;
use crate::query::ValidationError;
use crate::transport::TransportError;
use thiserror::Error;

/// Terminal failure of a single request
#[derive(Debug, Error)]
pub enum FlowError {
    #[error("invalid query: {0}")]
    Validation(#[from] ValidationError),
    #[error("nothing found")]
    NotFound {
        /// Engine failure behind the miss; `None` for an empty result set
        cause: Option<String>,
    },
    #[error("fetch failed: {0}")]
    Fetch(#[from] FetchError),
    #[error("file is too large: {size_bytes} bytes exceeds {limit_mb} MB")]
    SizeLimit { size_bytes: u64, limit_mb: f64 },
    #[error("delivery failed: {0}")]
    Delivery(String),
    #[error("{0}")]
    Unknown(String),
}

impl From<TransportError> for FlowError {
    fn from(err: TransportError) -> Self {
        FlowError::Delivery(err.to_string())
    }
}

impl From<std::io::Error> for FlowError {
    fn from(err: std::io::Error) -> Self {
        FlowError::Unknown(err.to_string())
    }
}

impl FlowError {
    /// Short message for the chat user; error details are cut to `limit` characters
    pub fn user_message(&self, catalog: &Catalog, limit: usize) -> String {
        match self {
            FlowError::Validation(ValidationError::TooShort { min }) => catalog.too_short(*min),
            FlowError::Validation(ValidationError::TooLong { .. }) => {
                catalog.too_long().to_string()
            }
            FlowError::Validation(ValidationError::LooksLikeUrl) => {
                catalog.text_only().to_string()
            }
            FlowError::NotFound { cause: Some(_) } => catalog.search_failed().to_string(),
            FlowError::NotFound { cause: None } => catalog.nothing_found().to_string(),
            FlowError::Fetch(FetchError::OutputMissing { .. }) => {
                catalog.output_missing().to_string()
            }
            FlowError::Fetch(FetchError::FileNotCreated(_)) => {
                catalog.file_not_created().to_string()
            }
            FlowError::SizeLimit {
                size_bytes,
                limit_mb,
            } => catalog.oversized(bytes_to_mb(*size_bytes), *limit_mb),
            other => catalog.error(&truncate(&other.to_string(), limit)),
        }
    }

    /// Whether this is an expected outcome rather than a malfunction
    pub fn is_expected(&self) -> bool {
        matches!(
            self,
            FlowError::Validation(_) | FlowError::NotFound { cause: None } | FlowError::SizeLimit { .. }
        )
    }
}

/// Convert bytes to MiB
pub fn bytes_to_mb(bytes: u64) -> f64 {
    bytes as f64 / (1024.0 * 1024.0)
}

/// First `limit` characters of `text`
pub fn truncate(text: &str, limit: usize) -> String {
    text.chars().take(limit).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engines::EngineError;
    use crate::locales::Lang;
    use std::path::PathBuf;

    fn catalog() -> Catalog {
        Catalog::new(Lang::En)
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("hello", 10), "hello");
        assert_eq!(truncate("hello", 2), "he");
        assert_eq!(truncate("привіт", 3), "при");
    }

    #[test]
    fn test_validation_messages() {
        let err = FlowError::from(ValidationError::TooShort { min: 3 });
        assert!(err.user_message(&catalog(), 200).contains("too short"));

        let err = FlowError::from(ValidationError::LooksLikeUrl);
        assert!(err.user_message(&catalog(), 200).contains("text queries"));
    }

    #[test]
    fn test_not_found_messages_differ() {
        let failed = FlowError::NotFound {
            cause: Some("exit 1".to_string()),
        };
        let empty = FlowError::NotFound { cause: None };
        assert_eq!(failed.user_message(&catalog(), 200), catalog().search_failed());
        assert_eq!(empty.user_message(&catalog(), 200), catalog().nothing_found());
        assert!(empty.is_expected());
        assert!(!failed.is_expected());
    }

    #[test]
    fn test_generic_message_is_truncated() {
        let err = FlowError::Fetch(FetchError::Engine(EngineError::Exited {
            binary: "yt-dlp".to_string(),
            status: "exit status: 1".to_string(),
            stderr: "x".repeat(1000),
        }));
        let message = err.user_message(&catalog(), 200);
        assert!(message.starts_with("Something went wrong: fetch failed"));
        assert!(message.ends_with("..."));
        assert!(message.chars().count() < 250);
    }

    #[test]
    fn test_fetch_specific_messages() {
        let err = FlowError::Fetch(FetchError::FileNotCreated(PathBuf::from("x.mp3")));
        assert_eq!(err.user_message(&catalog(), 200), catalog().file_not_created());
    }

    #[test]
    fn test_size_limit_message() {
        let err = FlowError::SizeLimit {
            size_bytes: 60 * 1024 * 1024,
            limit_mb: 48.0,
        };
        assert!(err.user_message(&catalog(), 200).contains("60.0 MB > 48 MB"));
    }
}
