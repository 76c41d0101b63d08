//! Query validation
//!
//! Turns raw chat text into a [`Query`] the search step accepts. Text is
//! trimmed, then checked for anything that looks like a link and for length.

use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;
use thiserror::Error;

static URL_SCHEME: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)https?://").unwrap());

/// Reasons a query is refused before searching
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("query is shorter than {min} characters")]
    TooShort { min: usize },
    #[error("query is longer than {max} characters")]
    TooLong { max: usize },
    #[error("query looks like a link")]
    LooksLikeUrl,
}

/// A validated free-text search query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query(String);

impl Query {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Query {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Length and shape checks for incoming queries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryValidator {
    min_len: usize,
    max_len: usize,
}

impl QueryValidator {
    pub fn new(min_len: usize, max_len: usize) -> Self {
        Self { min_len, max_len }
    }

    /// Validate raw text. Checks run in order: link, too short, too long.
    pub fn validate(&self, raw: &str) -> Result<Query, ValidationError> {
        let text = raw.trim();
        if looks_like_url(text) {
            return Err(ValidationError::LooksLikeUrl);
        }

        let len = text.chars().count();
        if len < self.min_len {
            return Err(ValidationError::TooShort { min: self.min_len });
        }
        if len > self.max_len {
            return Err(ValidationError::TooLong { max: self.max_len });
        }

        Ok(Query(text.to_string()))
    }
}

impl Default for QueryValidator {
    fn default() -> Self {
        Self::new(crate::QUERY_MIN_LEN, crate::QUERY_MAX_LEN)
    }
}

/// Whether text contains an `http://` or `https://` scheme anywhere
pub fn looks_like_url(text: &str) -> bool {
    URL_SCHEME.is_match(text)
}
