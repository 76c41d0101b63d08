//! Request flow
//!
//! Sequences one request: validate, search, fetch, check size, deliver. Every
//! terminal branch ends in the same finalizer, which removes the user's
//! scratch directory and returns the conversation to idle.

use crate::config::Settings;
use crate::delivery::{BotIdentity, Delivery};
use crate::engines::MediaEngine;
use crate::error::FlowError;
use crate::fetch::Fetcher;
use crate::locales::{self, Catalog};
use crate::query::{Query, QueryValidator, ValidationError};
use crate::search::Search;
use crate::session::{SessionState, SessionStore};
use crate::storage::ScratchSpace;
use crate::transport::{ChatRef, MessageRef, Transport, TransportError};
use std::sync::Arc;
use tracing::{debug, error, info, info_span, warn, Instrument};
use uuid::Uuid;

/// An inbound text message, stripped of transport details
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Inbound {
    pub user_id: u64,
    pub chat: ChatRef,
    pub text: String,
    /// Sender's client language, e.g. `uk`
    pub language_code: Option<String>,
}

impl Inbound {
    pub fn new(user_id: u64, chat: ChatRef, text: impl Into<String>) -> Self {
        Self {
            user_id,
            chat,
            text: text.into(),
            language_code: None,
        }
    }

    pub fn with_language(mut self, code: impl Into<String>) -> Self {
        self.language_code = Some(code.into());
        self
    }
}

/// Terminal branch a request ended in
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Refused before searching
    Rejected(ValidationError),
    NotFound,
    /// Fetched file exceeded the size limit
    Oversized,
    Delivered,
    Failed,
}

impl From<&FlowError> for Outcome {
    fn from(err: &FlowError) -> Self {
        match err {
            FlowError::Validation(e) => Outcome::Rejected(e.clone()),
            FlowError::NotFound { .. } => Outcome::NotFound,
            FlowError::SizeLimit { .. } => Outcome::Oversized,
            _ => Outcome::Failed,
        }
    }
}

/// Flow controller shared by all update handlers
pub struct Flow {
    transport: Arc<dyn Transport>,
    sessions: Arc<dyn SessionStore>,
    validator: QueryValidator,
    search: Search,
    fetcher: Fetcher,
    delivery: Delivery,
    scratch: ScratchSpace,
    default_locale: String,
    error_message_limit: usize,
}

impl Flow {
    /// Build the flow from settings and its collaborators
    pub fn new(
        settings: &Settings,
        engine: Arc<dyn MediaEngine>,
        transport: Arc<dyn Transport>,
        sessions: Arc<dyn SessionStore>,
        identity: BotIdentity,
    ) -> Self {
        let limits = &settings.limits;
        Self {
            transport,
            sessions,
            validator: QueryValidator::new(limits.query_min_len, limits.query_max_len),
            search: Search::new(engine.clone()).with_limit(settings.search.result_limit),
            fetcher: Fetcher::new(engine),
            delivery: Delivery::new(identity, limits.max_file_size_mb),
            scratch: ScratchSpace::new(&settings.storage.download_dir),
            default_locale: settings.general.locale.clone(),
            error_message_limit: limits.error_message_limit,
        }
    }

    pub fn scratch(&self) -> &ScratchSpace {
        &self.scratch
    }

    /// Create the scratch root; call once before handling requests
    pub async fn prepare_storage(&self) -> std::io::Result<()> {
        self.scratch.init().await
    }

    /// Current conversation state of a user
    pub async fn session_state(&self, user_id: u64) -> SessionState {
        self.sessions.get(user_id).await
    }

    fn catalog_for(&self, inbound: &Inbound) -> Catalog {
        Catalog::new(locales::pick(
            inbound.language_code.as_deref(),
            &self.default_locale,
        ))
    }

    /// `/start`: welcome text, state unchanged
    pub async fn start(&self, inbound: &Inbound) -> Result<(), TransportError> {
        let catalog = self.catalog_for(inbound);
        self.transport
            .send_text(inbound.chat, catalog.welcome())
            .await?;
        Ok(())
    }

    /// `/search`: prompt for a query and wait for it
    pub async fn prompt_search(&self, inbound: &Inbound) -> Result<(), TransportError> {
        let catalog = self.catalog_for(inbound);
        self.transport
            .send_text(inbound.chat, catalog.search_prompt())
            .await?;
        self.sessions
            .set(inbound.user_id, SessionState::AwaitingQuery)
            .await;
        debug!("User {} is awaiting a query", inbound.user_id);
        Ok(())
    }

    /// Free text: run one complete request
    pub async fn handle_text(&self, inbound: &Inbound) -> Outcome {
        let request_id = Uuid::new_v4();
        let span = info_span!("request", user_id = inbound.user_id, %request_id);
        self.run(inbound).instrument(span).await
    }

    async fn run(&self, inbound: &Inbound) -> Outcome {
        let catalog = self.catalog_for(inbound);
        let state = self.sessions.get(inbound.user_id).await;
        debug!(?state, "Handling text message");

        let query = match self.validator.validate(&inbound.text) {
            Ok(query) => query,
            Err(e) => {
                info!("Rejected query: {}", e);
                let err = FlowError::from(e);
                self.report(inbound.chat, &catalog, None, &err).await;
                self.sessions.clear(inbound.user_id).await;
                return Outcome::from(&err);
            }
        };

        let mut status = None;
        let result = self
            .process(inbound, &query, &catalog, &mut status)
            .await;

        let outcome = match result {
            Ok(()) => Outcome::Delivered,
            Err(err) => {
                self.report(inbound.chat, &catalog, status, &err).await;
                Outcome::from(&err)
            }
        };

        self.scratch.release(inbound.user_id).await;
        self.sessions.clear(inbound.user_id).await;
        debug!(?outcome, "Request finished");
        outcome
    }

    async fn process(
        &self,
        inbound: &Inbound,
        query: &Query,
        catalog: &Catalog,
        status: &mut Option<MessageRef>,
    ) -> Result<(), FlowError> {
        let dir = self.scratch.prepare(inbound.user_id).await?;

        let message = self
            .transport
            .send_text(inbound.chat, catalog.searching())
            .await?;
        *status = Some(message);

        let candidate = self.search.first_candidate(query).await?;

        self.transport
            .edit_text(
                message,
                &catalog.downloading(
                    &candidate.title,
                    &candidate.uploader,
                    &candidate.display_duration(),
                ),
            )
            .await?;

        let asset = self.fetcher.fetch(&candidate, &dir).await?;
        self.delivery.enforce_size_limit(&asset).await?;

        self.transport.edit_text(message, catalog.sending()).await?;
        self.delivery
            .deliver(
                self.transport.as_ref(),
                inbound.chat,
                catalog,
                &asset,
                &candidate,
                query,
            )
            .await?;

        if let Err(e) = self.transport.delete(message).await {
            warn!("Failed to delete status message: {}", e);
        }
        *status = None;
        Ok(())
    }

    /// Log a failure and tell the user, editing the status message when there is one
    async fn report(
        &self,
        chat: ChatRef,
        catalog: &Catalog,
        status: Option<MessageRef>,
        err: &FlowError,
    ) {
        if err.is_expected() {
            info!("Request ended: {}", err);
        } else {
            error!("Request failed: {:?}", err);
        }

        let text = err.user_message(catalog, self.error_message_limit);

        if let Some(message) = status {
            match self.transport.edit_text(message, &text).await {
                Ok(()) => return,
                Err(e) => warn!("Failed to edit status message: {}", e),
            }
        }

        if let Err(e) = self.transport.send_text(chat, &text).await {
            error!("Failed to send error message: {}", e);
        }
    }
}
