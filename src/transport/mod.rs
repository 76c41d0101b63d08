//! Chat transport
//!
//! The flow talks to the chat platform only through [`Transport`]. The
//! Telegram implementation lives in [`telegram`].

pub mod telegram;

pub use telegram::TelegramTransport;

use async_trait::async_trait;
use std::path::PathBuf;
use thiserror::Error;

/// Chat a reply goes to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChatRef(pub i64);

/// A message the bot sent earlier and may edit or delete
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageRef {
    pub chat: ChatRef,
    pub id: i32,
}

/// Audio file with the metadata shown by the chat client
#[derive(Debug, Clone, PartialEq)]
pub struct AudioUpload {
    pub path: PathBuf,
    pub title: String,
    pub performer: String,
    /// Whole seconds
    pub duration: Option<u32>,
    /// Thumbnail URL
    pub thumbnail: Option<String>,
    /// HTML caption
    pub caption: String,
}

/// Transport failure
#[derive(Debug, Error)]
pub enum TransportError {
    #[error(transparent)]
    Telegram(#[from] teloxide::RequestError),
    #[error("{0}")]
    Other(String),
}

/// Outbound side of the chat platform. Texts use HTML markup.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send_text(&self, chat: ChatRef, text: &str) -> Result<MessageRef, TransportError>;

    async fn edit_text(&self, message: MessageRef, text: &str) -> Result<(), TransportError>;

    async fn delete(&self, message: MessageRef) -> Result<(), TransportError>;

    async fn send_audio(&self, chat: ChatRef, audio: AudioUpload) -> Result<(), TransportError>;
}
