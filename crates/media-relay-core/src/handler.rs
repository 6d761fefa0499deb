//! Message handling pipeline
//!
//! One inbound text is handled in a single linear pass:
//! parse the link, probe metadata, download, check the size, relay, delete.
//! Every failure after the link was accepted ends in exactly one error reply.

use crate::download::MediaDownloader;
use crate::error::RelayError;
use crate::extractor::MediaExtractor;
use crate::media::DownloadedFile;
use crate::messages;
use crate::request::MediaRequest;
use async_trait::async_trait;
use std::path::Path;
use tracing::{error, info, warn};

/// Formatting applied to a text reply
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextFormat {
    /// Sent verbatim
    Plain,
    /// Telegram-flavoured HTML
    Html,
}

/// Replies to the chat a message came from
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ChatReplier: Send + Sync {
    /// Send a text reply
    async fn reply_text(&self, text: &str, format: TextFormat) -> Result<(), RelayError>;
    /// Send a local file as audio
    async fn reply_audio(&self, path: &Path) -> Result<(), RelayError>;
    /// Send a local file as video
    async fn reply_video(&self, path: &Path) -> Result<(), RelayError>;
}

/// How handling of one message ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandleOutcome {
    /// No link in the message
    Rejected,
    /// Media was sent to the chat
    Sent,
    /// Media exceeded the transfer ceiling and was not sent
    TooLarge,
    /// A failure was reported to the chat
    Failed,
}

/// Handles media requests arriving as chat messages
pub struct MessageHandler<E: MediaExtractor> {
    downloader: MediaDownloader<E>,
}

impl<E: MediaExtractor> MessageHandler<E> {
    /// Create a handler on top of `downloader`
    #[must_use]
    pub const fn new(downloader: MediaDownloader<E>) -> Self {
        Self { downloader }
    }

    /// Handle one inbound message text, replying through `replier`.
    ///
    /// Never fails: problems are reported to the chat and logged.
    pub async fn handle(&self, text: &str, replier: &dyn ChatReplier) -> HandleOutcome {
        let request = match MediaRequest::parse(text) {
            Ok(request) => request,
            Err(_) => {
                if let Err(e) = replier.reply_text(messages::NO_URL, TextFormat::Plain).await {
                    warn!(error = %e, "Failed to send validation reply");
                }
                return HandleOutcome::Rejected;
            }
        };

        info!(
            url = %request.url,
            audio = request.audio_requested,
            "Handling media request"
        );

        match self.relay(&request, replier).await {
            Ok(outcome) => outcome,
            Err(e) => {
                error!(url = %request.url, error = %e, "Media request failed");
                let reply = messages::error_reply(&e);
                if let Err(send_err) = replier.reply_text(&reply, TextFormat::Plain).await {
                    error!(error = %send_err, "Failed to report error to chat");
                }
                HandleOutcome::Failed
            }
        }
    }

    async fn relay(
        &self,
        request: &MediaRequest,
        replier: &dyn ChatReplier,
    ) -> Result<HandleOutcome, RelayError> {
        replier
            .reply_text(messages::FETCHING_INFO, TextFormat::Plain)
            .await?;
        let info = self.downloader.probe_info(&request.url).await?;
        replier
            .reply_text(&info.summary_html(), TextFormat::Html)
            .await?;

        replier
            .reply_text(messages::DOWNLOADING, TextFormat::Plain)
            .await?;
        let file = self.downloader.fetch_media(request, &info).await?;

        let delivered = self.deliver(request, &file, replier).await;
        self.downloader.discard(&file).await;
        delivered
    }

    async fn deliver(
        &self,
        request: &MediaRequest,
        file: &DownloadedFile,
        replier: &dyn ChatReplier,
    ) -> Result<HandleOutcome, RelayError> {
        let settings = self.downloader.settings();
        if file.size > settings.max_file_size {
            info!(
                path = %file.path.display(),
                size_mb = format!("{:.2}", file.size_mb()),
                "Media exceeds transfer ceiling, not sending"
            );
            replier
                .reply_text(
                    &messages::file_too_large(settings.max_file_size_mb()),
                    TextFormat::Plain,
                )
                .await?;
            return Ok(HandleOutcome::TooLarge);
        }

        if request.audio_requested {
            replier.reply_audio(&file.path).await?;
        } else {
            replier.reply_video(&file.path).await?;
        }
        info!(
            path = %file.path.display(),
            size_mb = format!("{:.2}", file.size_mb()),
            "Media sent"
        );
        Ok(HandleOutcome::Sent)
    }
}
