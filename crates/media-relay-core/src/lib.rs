#![deny(missing_docs)]
//! Media Relay core library.
//!
//! Shared logic for turning a chat message with a link into a relayed media file:
//! request parsing, extractor integration, downloading and the message pipeline.

/// Configuration management.
pub mod config;
/// Downloading media into per-request directories.
pub mod download;
/// Error types.
pub mod error;
/// Media extraction capability (yt-dlp).
pub mod extractor;
/// Message handling pipeline.
pub mod handler;
/// Media metadata and downloaded files.
pub mod media;
/// User-facing message texts.
pub mod messages;
/// Inbound request parsing.
pub mod request;
/// Utility functions.
pub mod utils;

/// Test helpers and mocks.
#[cfg(test)]
pub mod testing;
