//! Telegram transport settings.

use config::ConfigError;
use media_relay_core::config::MediaSettings;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Telegram transport settings loaded from environment variables.
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct TelegramSettings {
    /// Telegram Bot API token (`TELEGRAM_TOKEN`, or `BOT_TOKEN`).
    #[serde(alias = "bot_token")]
    pub telegram_token: String,
}

impl TelegramSettings {
    /// Create new settings by loading from environment and files.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if loading fails or no token is configured.
    pub fn new() -> Result<Self, ConfigError> {
        Self::from_config(media_relay_core::config::build_config()?)
    }

    /// Deserialize settings from an already built configuration.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the token is missing or blank.
    pub fn from_config(source: config::Config) -> Result<Self, ConfigError> {
        let settings: Self = source.try_deserialize()?;
        if settings.telegram_token.trim().is_empty() {
            return Err(ConfigError::Message(
                "TELEGRAM_TOKEN (or BOT_TOKEN) is empty".to_string(),
            ));
        }
        Ok(settings)
    }
}

/// Combined settings used by the Telegram transport layer.
#[derive(Clone)]
pub struct BotSettings {
    /// Media handling settings shared across handlers.
    pub media: Arc<MediaSettings>,
    /// Telegram-specific settings.
    pub telegram: Arc<TelegramSettings>,
}

impl BotSettings {
    /// Create a new combined settings bundle.
    #[must_use]
    pub fn new(media: MediaSettings, telegram: TelegramSettings) -> Self {
        Self {
            media: Arc::new(media),
            telegram: Arc::new(telegram),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::TelegramSettings;
    use config::{Config, File, FileFormat};

    fn load(toml: &str) -> Result<TelegramSettings, config::ConfigError> {
        let source = Config::builder()
            .add_source(File::from_str(toml, FileFormat::Toml))
            .build()?;
        TelegramSettings::from_config(source)
    }

    #[test]
    fn test_token_key() {
        let settings = load("telegram_token = \"123:abc\"").expect("token is set");
        assert_eq!(settings.telegram_token, "123:abc");
    }

    #[test]
    fn test_bot_token_alias() {
        let settings = load("bot_token = \"456:def\"").expect("alias is accepted");
        assert_eq!(settings.telegram_token, "456:def");
    }

    #[test]
    fn test_missing_or_blank_token_fails() {
        assert!(load("").is_err());
        assert!(load("telegram_token = \"  \"").is_err());
    }
}
