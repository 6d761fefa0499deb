//! Errors raised while handling a media request

use thiserror::Error;

/// Errors that can occur while resolving, downloading or relaying media
#[derive(Debug, Error)]
pub enum RelayError {
    /// The message text does not contain an HTTP(S) link
    #[error("No media link found in message")]
    MissingUrl,
    /// The extraction tool exited with a failure
    #[error("{0}")]
    Extractor(String),
    /// The extraction tool could not be started
    #[error("Failed to start extractor: {0}")]
    Spawn(#[source] std::io::Error),
    /// The extraction tool printed something that is not valid metadata
    #[error("Invalid media metadata: {0}")]
    InvalidMetadata(#[from] serde_json::Error),
    /// Standard I/O error (missing file, permissions, ...)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// The chat transport failed to deliver a reply
    #[error("Transport error: {0}")]
    Transport(String),
}
