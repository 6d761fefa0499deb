//! Resilient messaging utilities with automatic retry for Telegram API operations.
//!
//! Text replies go through here and are retried on transient network failures
//! using exponential backoff with jitter. Media uploads are sent once.
//!
//! # Usage
//!
//! ```ignore
//! use media_relay_transport_telegram::bot::resilient::send_message_resilient;
//!
//! let msg = send_message_resilient(&bot, chat_id, "Hello!", Some(ParseMode::Html)).await?;
//! ```

use anyhow::Result;
use teloxide::prelude::*;
use teloxide::types::{ChatId, Message, ParseMode};
use teloxide::RequestError;

/// Returns true for Telegram failures that may succeed on another attempt.
///
/// API rejections (bad markup, blocked chat, ...) are permanent and sent once.
#[must_use]
pub const fn is_transient_request_error(error: &RequestError) -> bool {
    matches!(
        error,
        RequestError::Network(_) | RequestError::RetryAfter(_) | RequestError::Io(_)
    )
}

/// Send a message with automatic retry on network failures.
///
/// Uses [`media_relay_core::utils::retry_transport_operation`] with exponential backoff
/// to handle transient network errors. Other errors fail on the first attempt.
///
/// # Arguments
///
/// * `bot` - The Telegram bot instance
/// * `chat_id` - Target chat ID
/// * `text` - Message text to send
/// * `parse_mode` - Optional parse mode (HTML, Markdown, etc.)
///
/// # Errors
///
/// Returns the first permanent error, or the last error after all retries are exhausted.
pub async fn send_message_resilient(
    bot: &Bot,
    chat_id: ChatId,
    text: impl Into<String>,
    parse_mode: Option<ParseMode>,
) -> Result<Message> {
    let text = text.into();
    media_relay_core::utils::retry_transport_operation(
        || async {
            let mut req = bot.send_message(chat_id, text.clone());
            if let Some(pm) = parse_mode {
                req = req.parse_mode(pm);
            }
            req.await
        },
        is_transient_request_error,
    )
    .await
    .map_err(|e| anyhow::anyhow!("Telegram send error: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use teloxide::types::Seconds;
    use teloxide::ApiError;

    #[test]
    fn test_api_errors_are_not_retried() {
        let parse_failure =
            RequestError::Api(ApiError::Unknown("Bad Request: can't parse entities".to_string()));
        assert!(!is_transient_request_error(&parse_failure));
        assert!(!is_transient_request_error(&RequestError::Api(
            ApiError::BotBlocked
        )));
        assert!(!is_transient_request_error(&RequestError::MigrateToChatId(
            ChatId(-100)
        )));
    }

    #[test]
    fn test_rate_limit_is_retried() {
        let error = RequestError::RetryAfter(Seconds::from_seconds(3));
        assert!(is_transient_request_error(&error));
    }
}
