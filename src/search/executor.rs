//! Search execution

use super::models::Candidate;
use crate::engines::MediaEngine;
use crate::error::FlowError;
use crate::query::Query;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Search adapter that asks the engine for a few candidates and keeps the first
pub struct Search {
    /// Media engine
    engine: Arc<dyn MediaEngine>,
    /// Number of candidates requested
    limit: u32,
}

impl Search {
    /// Create a new search adapter
    pub fn new(engine: Arc<dyn MediaEngine>) -> Self {
        Self {
            engine,
            limit: crate::SEARCH_LIMIT,
        }
    }

    /// Set the number of candidates requested from the engine
    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = limit.max(1);
        self
    }

    /// Resolve a query to the provider's first candidate.
    ///
    /// Engine failures and empty result sets both end in [`FlowError::NotFound`];
    /// later candidates are never used as a fallback.
    pub async fn first_candidate(&self, query: &Query) -> Result<Candidate, FlowError> {
        let start = Instant::now();

        let candidates = match self.engine.search(query.as_str(), self.limit).await {
            Ok(candidates) => candidates,
            Err(e) => {
                warn!("Search on {} failed for '{}': {}", self.engine.name(), query, e);
                return Err(FlowError::NotFound {
                    cause: Some(e.to_string()),
                });
            }
        };

        debug!(
            "Engine {} returned {} candidates in {:?}",
            self.engine.name(),
            candidates.len(),
            start.elapsed()
        );

        let candidate = candidates
            .into_iter()
            .next()
            .ok_or(FlowError::NotFound { cause: None })?;

        info!("Query '{}' resolved to '{}'", query, candidate.title);
        Ok(candidate)
    }
}
