use crate::bot::resilient::send_message_resilient;
use crate::bot::TelegramReplier;
use anyhow::Result;
use media_relay_core::extractor::YtdlpExtractor;
use media_relay_core::handler::MessageHandler;
use media_relay_core::messages::usage_text;
use std::sync::Arc;
use teloxide::{prelude::*, utils::command::BotCommands};
use tracing::info;

/// Message handler wired to the yt-dlp extractor
pub type RelayHandler = MessageHandler<YtdlpExtractor>;

// Helper function to get user name from Message
fn get_user_name(msg: &Message) -> String {
    if let Some(ref user) = msg.from {
        if let Some(ref username) = user.username {
            return username.clone();
        }
        if !user.first_name.is_empty() {
            return user.first_name.clone();
        }
    }
    "Unknown".to_string()
}

/// Safe extraction of user ID from a message.
/// Returns 0 if the user information is missing.
pub fn get_user_id_safe(msg: &Message) -> i64 {
    msg.from.as_ref().map_or(0, |u| u.id.0.cast_signed())
}

/// Returns true if the text should be handled as a media request.
///
/// Anything starting with `/` is a command; unknown commands are ignored.
///
/// # Examples
///
/// ```
/// use media_relay_transport_telegram::bot::handlers::is_media_request_text;
/// assert!(is_media_request_text("mp3 https://example.com/clip"));
/// assert!(!is_media_request_text("/unknown"));
/// ```
#[must_use]
pub fn is_media_request_text(text: &str) -> bool {
    !text.starts_with('/')
}

/// Supported commands for the bot
#[derive(BotCommands, Clone, Debug, PartialEq, Eq)]
#[command(rename_rule = "lowercase", description = "Supported commands:")]
pub enum Command {
    /// Show usage instructions
    #[command(description = "Show usage instructions.")]
    Start,
    /// List supported commands
    #[command(description = "List supported commands.")]
    Help,
}

/// Start handler
///
/// # Errors
///
/// Returns an error if the usage message cannot be sent.
pub async fn start(bot: Bot, msg: Message) -> Result<()> {
    let user_id = get_user_id_safe(&msg);
    let user_name = get_user_name(&msg);

    info!("User {user_id} ({user_name}) initiated /start command.");

    send_message_resilient(&bot, msg.chat.id, usage_text(), None).await?;
    Ok(())
}

/// Help handler
///
/// # Errors
///
/// Returns an error if the command list cannot be sent.
pub async fn help(bot: Bot, msg: Message) -> Result<()> {
    send_message_resilient(&bot, msg.chat.id, Command::descriptions().to_string(), None).await?;
    Ok(())
}

/// Media request handler for plain text messages
///
/// # Errors
///
/// Never fails on its own; failures are reported to the chat by the message handler.
pub async fn handle_text(bot: Bot, msg: Message, handler: Arc<RelayHandler>) -> Result<()> {
    let Some(text) = msg.text() else {
        return Ok(());
    };
    let user_id = get_user_id_safe(&msg);

    let replier = TelegramReplier::new(bot, msg.chat.id);
    let outcome = handler.handle(text, &replier).await;

    info!(
        user_id,
        chat_id = %msg.chat.id,
        ?outcome,
        "Media request finished"
    );
    Ok(())
}
