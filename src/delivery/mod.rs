//! Result delivery
//!
//! Enforces the upload size limit and sends the audio with its caption.

use crate::error::FlowError;
use crate::fetch::FetchedAsset;
use crate::locales::Catalog;
use crate::query::Query;
use crate::search::Candidate;
use crate::transport::{AudioUpload, ChatRef, Transport};
use teloxide::utils::html::escape;
use tracing::{info, warn};

/// The bot's own identity, resolved once at startup
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BotIdentity {
    username: Option<String>,
}

impl BotIdentity {
    pub fn new(username: Option<String>) -> Self {
        Self {
            username: username.filter(|u| !u.is_empty()),
        }
    }

    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    /// `@username` tag appended to captions
    pub fn tag(&self) -> Option<String> {
        self.username.as_ref().map(|u| format!("@{}", u))
    }
}

/// Size check and upload of a fetched asset
#[derive(Debug, Clone)]
pub struct Delivery {
    identity: BotIdentity,
    max_file_size_mb: f64,
}

impl Delivery {
    pub fn new(identity: BotIdentity, max_file_size_mb: f64) -> Self {
        Self {
            identity,
            max_file_size_mb,
        }
    }

    /// Reject assets above the limit, deleting the file
    pub async fn enforce_size_limit(&self, asset: &FetchedAsset) -> Result<(), FlowError> {
        if asset.size_mb() <= self.max_file_size_mb {
            return Ok(());
        }

        info!(
            "File {} is {:.1} MB, limit is {} MB",
            asset.path.display(),
            asset.size_mb(),
            self.max_file_size_mb
        );
        if let Err(e) = tokio::fs::remove_file(&asset.path).await {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!("Failed to delete {}: {}", asset.path.display(), e);
            }
        }

        Err(FlowError::SizeLimit {
            size_bytes: asset.size_bytes,
            limit_mb: self.max_file_size_mb,
        })
    }

    /// HTML caption for the audio message
    pub fn caption(&self, catalog: &Catalog, candidate: &Candidate, query: &Query) -> String {
        let (artist, duration, query_label) = catalog.caption_labels();
        let mut caption = format!(
            "<b>{}</b>\n{}: {}\n{}: {}\n{}: {}",
            escape(&candidate.title),
            artist,
            escape(&candidate.uploader),
            duration,
            candidate.display_duration(),
            query_label,
            escape(query.as_str()),
        );
        if let Some(tag) = self.identity.tag() {
            caption.push('\n');
            caption.push_str(&tag);
        }
        caption
    }

    /// Send the asset through the transport
    pub async fn deliver(
        &self,
        transport: &dyn Transport,
        chat: ChatRef,
        catalog: &Catalog,
        asset: &FetchedAsset,
        candidate: &Candidate,
        query: &Query,
    ) -> Result<(), FlowError> {
        let upload = AudioUpload {
            path: asset.path.clone(),
            title: candidate.title.clone(),
            performer: candidate.uploader.clone(),
            duration: candidate.duration_secs(),
            thumbnail: candidate.thumbnail.clone(),
            caption: self.caption(catalog, candidate, query),
        };

        transport
            .send_audio(chat, upload)
            .await
            .map_err(|e| FlowError::Delivery(e.to_string()))?;

        info!("Delivered '{}' ({} bytes)", candidate.title, asset.size_bytes);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::locales::Lang;
    use crate::query::QueryValidator;

    fn candidate() -> Candidate {
        Candidate::new("https://www.youtube.com/watch?v=abc", "Houdini <Official>")
            .with_uploader("Dua Lipa")
            .with_duration(188.0)
    }

    #[test]
    fn test_caption_with_identity() {
        let delivery = Delivery::new(BotIdentity::new(Some("tunefetch_bot".to_string())), 48.0);
        let query = QueryValidator::default().validate("dua lipa houdini").unwrap();
        let caption = delivery.caption(&Catalog::new(Lang::En), &candidate(), &query);

        assert_eq!(
            caption,
            "<b>Houdini &lt;Official&gt;</b>\nArtist: Dua Lipa\nDuration: 03:08\nQuery: dua lipa houdini\n@tunefetch_bot"
        );
    }

    #[test]
    fn test_caption_without_identity() {
        let delivery = Delivery::new(BotIdentity::new(None), 48.0);
        let query = QueryValidator::default().validate("dua lipa houdini").unwrap();
        let caption = delivery.caption(&Catalog::new(Lang::Uk), &candidate(), &query);

        assert!(caption.contains("Виконавець: Dua Lipa"));
        assert!(!caption.contains('@'));
    }

    #[tokio::test]
    async fn test_size_limit_deletes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("big.mp3");
        let file = std::fs::File::create(&path).unwrap();
        file.set_len(60 * 1024 * 1024).unwrap();

        let asset = FetchedAsset {
            path: path.clone(),
            size_bytes: 60 * 1024 * 1024,
        };
        let delivery = Delivery::new(BotIdentity::default(), 48.0);
        let err = delivery.enforce_size_limit(&asset).await.unwrap_err();

        assert!(matches!(err, FlowError::SizeLimit { .. }));
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_size_limit_boundary() {
        let delivery = Delivery::new(BotIdentity::default(), 48.0);
        let asset = FetchedAsset {
            path: "unused.mp3".into(),
            size_bytes: 48 * 1024 * 1024,
        };
        assert!(delivery.enforce_size_limit(&asset).await.is_ok());
    }
}
