//! Media extraction capability
//!
//! The extractor resolves metadata for a link and can materialise the media
//! as a local file. [`ytdlp::YtdlpExtractor`] implements it on top of the
//! yt-dlp executable.

pub mod ytdlp;

use crate::error::RelayError;
use crate::media::MediaInfo;
use async_trait::async_trait;
use std::path::PathBuf;

pub use ytdlp::YtdlpExtractor;

/// Stream selection for a download
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatSelector {
    /// Best audio-only stream, falling back to the best combined stream
    BestAudio,
    /// Best single file carrying both audio and video
    Best,
}

impl FormatSelector {
    /// Selector expression understood by the extractor
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::BestAudio => "bestaudio/best",
            Self::Best => "best",
        }
    }
}

/// Post-download audio transcode
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioTranscode {
    /// Target codec, e.g. "mp3"
    pub codec: String,
    /// Target bitrate in kbps
    pub bitrate_kbps: u32,
}

/// Options for a single extractor call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractOptions {
    /// Stream selection, downloads only
    pub format: Option<FormatSelector>,
    /// Output path template, downloads only
    pub output_template: Option<String>,
    /// Treat playlist links as the single referenced item
    pub no_playlist: bool,
    /// Netscape cookie file for authenticated platforms
    pub cookie_file: Option<PathBuf>,
    /// Audio extraction after download
    pub audio: Option<AudioTranscode>,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            format: None,
            output_template: None,
            no_playlist: true,
            cookie_file: None,
            audio: None,
        }
    }
}

/// Interface for media extraction backends
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MediaExtractor: Send + Sync {
    /// Resolve metadata without downloading anything
    async fn probe(&self, url: &str, options: &ExtractOptions) -> Result<MediaInfo, RelayError>;

    /// Download the media to `options.output_template`, returning the final file path
    async fn fetch(&self, url: &str, options: &ExtractOptions) -> Result<PathBuf, RelayError>;
}
