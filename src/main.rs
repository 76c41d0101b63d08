//! tunefetch: a Telegram bot that finds songs and sends them as mp3
//!
//! This is the main entry point for the application.

use anyhow::{Context, Result};
use std::sync::Arc;
use teloxide::Bot;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};
use tunefetch::{
    bot,
    config,
    engines::{MediaEngine, YtDlp},
    network,
    session::MemorySessionStore,
    transport::TelegramTransport,
    Flow,
};

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env file is fine
    let _ = dotenvy::dotenv();

    let (settings, source) = config::load()?;

    // Initialize logging
    let default_level = if settings.general.debug { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    info!("Starting tunefetch v{}", tunefetch::VERSION);
    match source {
        Some(path) => info!("Loaded settings from: {}", path.display()),
        None => info!("No settings file found, using defaults"),
    }

    settings.validate()?;
    let token = settings
        .bot_token()
        .context("BOT_TOKEN is not set")?
        .to_string();

    // Initialize HTTP client
    let client = network::build_client(&settings.outgoing)?;
    let bot = Bot::with_client(token, client);

    let identity = bot::resolve_identity(&bot).await;

    let engine = YtDlp::new(&settings.search, &settings.fetch);
    match engine.version().await {
        Some(version) => info!("Using {} {}", engine.name(), version),
        None => warn!(
            "{} could not be run; searches will fail until it is installed",
            settings.search.binary
        ),
    }

    let flow = Flow::new(
        &settings,
        Arc::new(engine),
        Arc::new(TelegramTransport::new(bot.clone())),
        Arc::new(MemorySessionStore::with_settings(&settings.session)),
        identity,
    );
    flow.prepare_storage().await.with_context(|| {
        format!(
            "cannot create download directory {}",
            settings.storage.download_dir.display()
        )
    })?;
    info!("Scratch storage at {}", flow.scratch().root().display());

    bot::run(bot, Arc::new(flow)).await;

    info!("Stopped");
    Ok(())
}
