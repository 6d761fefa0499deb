//! Configuration and settings management
//!
//! Loads settings from configuration files and environment variables and
//! defines the transfer and retry constants.

use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Telegram Bot API upload ceiling for bots (50 MiB)
pub const DEFAULT_MAX_FILE_SIZE: u64 = 50 * 1024 * 1024;
/// Directory for transient downloads
pub const DEFAULT_DOWNLOAD_DIR: &str = "downloads";
/// Cookie file handed to the extractor for recognised domains
pub const DEFAULT_COOKIE_FILE: &str = "cookies.txt";
/// Hosts that receive the cookie file
pub const DEFAULT_COOKIE_DOMAINS: &str = "youtube.com,youtu.be";
/// Extractor executable
pub const DEFAULT_YTDLP_BINARY: &str = "yt-dlp";
/// Codec used for audio-only requests
pub const DEFAULT_AUDIO_CODEC: &str = "mp3";
/// Bitrate used for audio-only requests
pub const DEFAULT_AUDIO_BITRATE_KBPS: u32 = 192;
/// Maximum characters kept from a title when building a filename
pub const MAX_FILENAME_CHARS: usize = 150;
/// Maximum bytes of a filename stem, leaving room for the extension and temporary suffixes
pub const MAX_FILENAME_BYTES: usize = 200;

// Telegram transport retry configuration
/// Initial backoff for transient Telegram API failures
pub const TELEGRAM_API_INITIAL_BACKOFF_MS: u64 = 500;
/// Maximum backoff for transient Telegram API failures
pub const TELEGRAM_API_MAX_BACKOFF_MS: u64 = 4000;
/// Attempts for a single Telegram API operation
pub const TELEGRAM_API_MAX_RETRIES: usize = 3;

/// Build the layered configuration source shared by all settings structs.
///
/// Sources, lowest priority first: `config/default`, `config/{RUN_MODE}`,
/// `config/local`, `APP__*` environment variables, plain environment variables.
///
/// # Errors
///
/// Returns a `ConfigError` if any source fails to load.
pub fn build_config() -> Result<Config, ConfigError> {
    let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

    Config::builder()
        .add_source(File::with_name("config/default").required(false))
        .add_source(File::with_name(&format!("config/{run_mode}")).required(false))
        // Local overrides, not checked into git
        .add_source(File::with_name("config/local").required(false))
        // Eg.. `APP__MAX_FILE_SIZE=1048576 ./target/app`
        .add_source(Environment::with_prefix("APP").separator("__"))
        // Environment::default() maps UPPER_SNAKE_CASE to snake_case, empty vars count as unset
        .add_source(Environment::default().ignore_empty(true))
        .build()
}

/// Media handling settings
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct MediaSettings {
    /// Directory for transient downloads
    #[serde(default = "default_download_dir")]
    pub download_dir: PathBuf,

    /// Cookie file passed to the extractor; empty disables cookies
    #[serde(default = "default_cookie_file")]
    pub cookie_file: String,

    /// Comma-separated list of hosts that receive the cookie file
    #[serde(rename = "cookie_domains", default = "default_cookie_domains")]
    pub cookie_domains_str: String,

    /// Largest file (bytes) relayed back to the chat
    #[serde(default = "default_max_file_size")]
    pub max_file_size: u64,

    /// Path or name of the yt-dlp executable
    #[serde(default = "default_ytdlp_binary")]
    pub ytdlp_binary: String,

    /// Codec for audio-only requests
    #[serde(default = "default_audio_codec")]
    pub audio_codec: String,

    /// Bitrate for audio-only requests
    #[serde(default = "default_audio_bitrate_kbps")]
    pub audio_bitrate_kbps: u32,
}

fn default_download_dir() -> PathBuf {
    PathBuf::from(DEFAULT_DOWNLOAD_DIR)
}

fn default_cookie_file() -> String {
    DEFAULT_COOKIE_FILE.to_string()
}

fn default_cookie_domains() -> String {
    DEFAULT_COOKIE_DOMAINS.to_string()
}

const fn default_max_file_size() -> u64 {
    DEFAULT_MAX_FILE_SIZE
}

fn default_ytdlp_binary() -> String {
    DEFAULT_YTDLP_BINARY.to_string()
}

fn default_audio_codec() -> String {
    DEFAULT_AUDIO_CODEC.to_string()
}

const fn default_audio_bitrate_kbps() -> u32 {
    DEFAULT_AUDIO_BITRATE_KBPS
}

impl Default for MediaSettings {
    fn default() -> Self {
        Self {
            download_dir: default_download_dir(),
            cookie_file: default_cookie_file(),
            cookie_domains_str: default_cookie_domains(),
            max_file_size: default_max_file_size(),
            ytdlp_binary: default_ytdlp_binary(),
            audio_codec: default_audio_codec(),
            audio_bitrate_kbps: default_audio_bitrate_kbps(),
        }
    }
}

impl MediaSettings {
    /// Load media settings from files and environment
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use media_relay_core::config::MediaSettings;
    ///
    /// let settings = MediaSettings::new().expect("Failed to load configuration");
    /// ```
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if loading fails.
    pub fn new() -> Result<Self, ConfigError> {
        build_config()?.try_deserialize()
    }

    /// Returns the lower-cased hosts that receive the cookie file
    #[must_use]
    pub fn cookie_domains(&self) -> Vec<String> {
        self.cookie_domains_str
            .split(|c: char| c == ',' || c == ';' || c.is_whitespace())
            .filter(|token| !token.is_empty())
            .map(str::to_lowercase)
            .collect()
    }

    /// Returns the cookie file path, if cookies are enabled
    #[must_use]
    pub fn cookie_file(&self) -> Option<PathBuf> {
        let trimmed = self.cookie_file.trim();
        (!trimmed.is_empty()).then(|| PathBuf::from(trimmed))
    }

    /// Size ceiling rendered in whole megabytes
    #[must_use]
    pub const fn max_file_size_mb(&self) -> u64 {
        self.max_file_size / (1024 * 1024)
    }
}
