//! Telegram front end
//!
//! Routes updates to the [`Flow`]: `/start` and `/search` commands, then any
//! other text message as a query.

use crate::delivery::BotIdentity;
use crate::flow::{Flow, Inbound};
use crate::transport::ChatRef;
use std::sync::Arc;
use teloxide::prelude::*;
use teloxide::utils::command::BotCommands;
use tracing::{error, info, warn};

/// Supported bot commands
#[derive(BotCommands, Clone, Debug, PartialEq, Eq)]
#[command(rename_rule = "lowercase", description = "Supported commands:")]
pub enum Command {
    #[command(description = "show the welcome message")]
    Start,
    #[command(description = "search for a song")]
    Search,
}

/// Resolve the bot's username once; captions go without a tag when this fails
pub async fn resolve_identity(bot: &Bot) -> BotIdentity {
    match bot.get_me().await {
        Ok(me) => {
            let identity = BotIdentity::new(me.user.username.clone());
            if let Some(username) = identity.username() {
                info!("Bot is running as @{}", username);
            }
            identity
        }
        Err(e) => {
            error!("Could not get the bot username: {}", e);
            BotIdentity::default()
        }
    }
}

/// Register the command list and dispatch updates until Ctrl-C
pub async fn run(bot: Bot, flow: Arc<Flow>) {
    if let Err(e) = bot.set_my_commands(Command::bot_commands()).await {
        warn!("Failed to register bot commands: {}", e);
    }

    let handler = Update::filter_message()
        .branch(
            dptree::entry()
                .filter_command::<Command>()
                .endpoint(on_command),
        )
        .branch(dptree::endpoint(on_text));

    info!("Polling for updates");
    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![flow])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;
}

/// Map a Telegram message to the flow's view of it
fn inbound(msg: &Message) -> Option<Inbound> {
    let text = msg.text()?;
    let user = msg.from.as_ref()?;
    let mut inbound = Inbound::new(user.id.0, ChatRef(msg.chat.id.0), text);
    inbound.language_code = user.language_code.clone();
    Some(inbound)
}

async fn on_command(msg: Message, cmd: Command, flow: Arc<Flow>) -> ResponseResult<()> {
    let Some(inbound) = inbound(&msg) else {
        return Ok(());
    };

    let result = match cmd {
        Command::Start => flow.start(&inbound).await,
        Command::Search => flow.prompt_search(&inbound).await,
    };
    if let Err(e) = result {
        error!("Failed to answer {:?} for chat {}: {}", cmd, msg.chat.id, e);
    }
    Ok(())
}

async fn on_text(msg: Message, flow: Arc<Flow>) -> ResponseResult<()> {
    if let Some(inbound) = inbound(&msg) {
        flow.handle_text(&inbound).await;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_commands() {
        assert_eq!(Command::parse("/start", "tunefetch_bot").unwrap(), Command::Start);
        assert_eq!(
            Command::parse("/search@tunefetch_bot", "tunefetch_bot").unwrap(),
            Command::Search
        );
        assert!(Command::parse("/download", "tunefetch_bot").is_err());
        assert!(Command::parse("dua lipa houdini", "tunefetch_bot").is_err());
    }
}
