//! Conversation state
//!
//! A user is either idle or expected to send a search query next. State is
//! kept behind [`SessionStore`] so the in-memory backend can be replaced by a
//! persistent one without touching the flow.

use crate::config::SessionSettings;
use async_trait::async_trait;
use moka::future::Cache;
use std::time::Duration;

/// Conversation state of one user
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SessionState {
    /// Free text is treated as a query; `/search` moves to `AwaitingQuery`
    #[default]
    Idle,
    /// `/search` was sent and the next text is the query
    AwaitingQuery,
}

/// Key-value store for session state, keyed by user id
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Current state; users without an entry are idle
    async fn get(&self, user_id: u64) -> SessionState;

    async fn set(&self, user_id: u64, state: SessionState);

    /// Return the user to `Idle`
    async fn clear(&self, user_id: u64);
}

/// In-memory session store; idle entries expire
pub struct MemorySessionStore {
    cache: Cache<u64, SessionState>,
}

impl MemorySessionStore {
    /// Create a store that forgets a session after `idle_timeout` seconds without access
    pub fn new(idle_timeout: u64, max_capacity: u64) -> Self {
        let cache = Cache::builder()
            .time_to_idle(Duration::from_secs(idle_timeout))
            .max_capacity(max_capacity)
            .build();

        Self { cache }
    }

    pub fn with_settings(settings: &SessionSettings) -> Self {
        Self::new(settings.idle_timeout, settings.max_capacity)
    }
}

impl Default for MemorySessionStore {
    fn default() -> Self {
        Self::with_settings(&SessionSettings::default())
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn get(&self, user_id: u64) -> SessionState {
        self.cache.get(&user_id).await.unwrap_or_default()
    }

    async fn set(&self, user_id: u64, state: SessionState) {
        match state {
            SessionState::Idle => self.cache.invalidate(&user_id).await,
            other => self.cache.insert(user_id, other).await,
        }
    }

    async fn clear(&self, user_id: u64) {
        self.cache.invalidate(&user_id).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_store() {
        let store = MemorySessionStore::default();
        assert_eq!(store.get(1).await, SessionState::Idle);

        store.set(1, SessionState::AwaitingQuery).await;
        assert_eq!(store.get(1).await, SessionState::AwaitingQuery);
        assert_eq!(store.get(2).await, SessionState::Idle);

        store.clear(1).await;
        assert_eq!(store.get(1).await, SessionState::Idle);
    }

    #[tokio::test]
    async fn test_setting_idle_removes_entry() {
        let store = MemorySessionStore::default();
        store.set(5, SessionState::AwaitingQuery).await;
        store.set(5, SessionState::Idle).await;
        assert_eq!(store.get(5).await, SessionState::Idle);
    }
}
