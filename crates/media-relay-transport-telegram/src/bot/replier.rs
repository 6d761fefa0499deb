use crate::bot::resilient::send_message_resilient;
use async_trait::async_trait;
use media_relay_core::error::RelayError;
use media_relay_core::handler::{ChatReplier, TextFormat};
use std::path::Path;
use teloxide::prelude::*;
use teloxide::types::{ChatId, InputFile, ParseMode};
use tracing::{debug, warn};

/// Replies to one Telegram chat.
pub struct TelegramReplier {
    bot: Bot,
    chat_id: ChatId,
}

impl TelegramReplier {
    /// Create a replier bound to `chat_id`.
    pub const fn new(bot: Bot, chat_id: ChatId) -> Self {
        Self { bot, chat_id }
    }
}

/// Telegram parse mode for a reply format
#[must_use]
pub const fn parse_mode_for(format: TextFormat) -> Option<ParseMode> {
    match format {
        TextFormat::Plain => None,
        TextFormat::Html => Some(ParseMode::Html),
    }
}

#[async_trait]
impl ChatReplier for TelegramReplier {
    async fn reply_text(&self, text: &str, format: TextFormat) -> Result<(), RelayError> {
        send_message_resilient(&self.bot, self.chat_id, text, parse_mode_for(format))
            .await
            .map(|_| ())
            .map_err(|e| RelayError::Transport(e.to_string()))
    }

    async fn reply_audio(&self, path: &Path) -> Result<(), RelayError> {
        debug!(chat_id = %self.chat_id, path = %path.display(), "Uploading audio");
        self.bot
            .send_audio(self.chat_id, InputFile::file(path.to_path_buf()))
            .await
            .map(|_| ())
            .map_err(|e| {
                warn!(path = %path.display(), error = %e, "Failed to send audio");
                RelayError::Transport(e.to_string())
            })
    }

    async fn reply_video(&self, path: &Path) -> Result<(), RelayError> {
        debug!(chat_id = %self.chat_id, path = %path.display(), "Uploading video");
        self.bot
            .send_video(self.chat_id, InputFile::file(path.to_path_buf()))
            .await
            .map(|_| ())
            .map_err(|e| {
                warn!(path = %path.display(), error = %e, "Failed to send video");
                RelayError::Transport(e.to_string())
            })
    }
}
