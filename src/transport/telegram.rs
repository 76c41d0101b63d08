//! Telegram transport built on teloxide

use super::{AudioUpload, ChatRef, MessageRef, Transport, TransportError};
use async_trait::async_trait;
use teloxide::prelude::*;
use teloxide::types::{InputFile, MessageId, ParseMode};
use tracing::warn;
use url::Url;

pub struct TelegramTransport {
    bot: Bot,
}

impl TelegramTransport {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }
}

#[async_trait]
impl Transport for TelegramTransport {
    async fn send_text(&self, chat: ChatRef, text: &str) -> Result<MessageRef, TransportError> {
        let sent = self
            .bot
            .send_message(ChatId(chat.0), text)
            .parse_mode(ParseMode::Html)
            .await?;
        Ok(MessageRef {
            chat,
            id: sent.id.0,
        })
    }

    async fn edit_text(&self, message: MessageRef, text: &str) -> Result<(), TransportError> {
        self.bot
            .edit_message_text(ChatId(message.chat.0), MessageId(message.id), text)
            .parse_mode(ParseMode::Html)
            .await?;
        Ok(())
    }

    async fn delete(&self, message: MessageRef) -> Result<(), TransportError> {
        self.bot
            .delete_message(ChatId(message.chat.0), MessageId(message.id))
            .await?;
        Ok(())
    }

    async fn send_audio(&self, chat: ChatRef, audio: AudioUpload) -> Result<(), TransportError> {
        let mut request = self
            .bot
            .send_audio(ChatId(chat.0), InputFile::file(audio.path))
            .caption(audio.caption)
            .parse_mode(ParseMode::Html)
            .title(audio.title)
            .performer(audio.performer);

        if let Some(duration) = audio.duration {
            request = request.duration(duration);
        }

        if let Some(thumbnail) = audio.thumbnail {
            match Url::parse(&thumbnail) {
                Ok(url) => request = request.thumbnail(InputFile::url(url)),
                Err(e) => warn!("Ignoring invalid thumbnail URL {}: {}", thumbnail, e),
            }
        }

        request.await?;
        Ok(())
    }
}
