//! Inbound request parsing
//!
//! Turns raw chat text into a [`MediaRequest`]: the first HTTP(S) link plus the
//! audio-only flag taken from the message prefix.

// lazy_regex! validates patterns at compile time and builds them on first use
#![allow(clippy::non_std_lazy_statics)]

use crate::error::RelayError;
use lazy_regex::lazy_regex;

/// First HTTP(S) link: scheme followed by everything up to whitespace
static RE_URL: lazy_regex::Lazy<regex::Regex> = lazy_regex!(r"https?://[^\s]+");

/// Authority part of a link (host, optional userinfo and port)
static RE_HOST: lazy_regex::Lazy<regex::Regex> = lazy_regex!(r"^https?://([^/?#\s]+)");

/// Prefixes that select audio-only extraction
const AUDIO_PREFIXES: &[&str] = &["audio", "mp3"];

/// A media request derived from one chat message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaRequest {
    /// Link to resolve
    pub url: String,
    /// Whether only the audio track should be extracted
    pub audio_requested: bool,
}

impl MediaRequest {
    /// Parse a chat message into a request.
    ///
    /// # Examples
    ///
    /// ```
    /// use media_relay_core::request::MediaRequest;
    ///
    /// let request = MediaRequest::parse("mp3 https://example.com/clip").expect("has a link");
    /// assert_eq!(request.url, "https://example.com/clip");
    /// assert!(request.audio_requested);
    /// ```
    ///
    /// # Errors
    ///
    /// Returns `RelayError::MissingUrl` if the text contains no link.
    pub fn parse(text: &str) -> Result<Self, RelayError> {
        let url = extract_url(text).ok_or(RelayError::MissingUrl)?;
        Ok(Self {
            url: url.to_string(),
            audio_requested: is_audio_request(text),
        })
    }
}

/// Returns the first HTTP(S) link in `text`.
#[must_use]
pub fn extract_url(text: &str) -> Option<&str> {
    RE_URL.find(text).map(|m| m.as_str())
}

/// Returns true if the trimmed, lower-cased text starts with `audio` or `mp3`.
#[must_use]
pub fn is_audio_request(text: &str) -> bool {
    let folded = text.trim().to_lowercase();
    AUDIO_PREFIXES
        .iter()
        .any(|prefix| folded.starts_with(prefix))
}

/// Lower-cased host of an HTTP(S) link, without userinfo or port.
#[must_use]
pub fn url_host(url: &str) -> Option<String> {
    let authority = RE_HOST.captures(url)?.get(1)?.as_str();
    let host = authority.rsplit('@').next().unwrap_or(authority);
    let host = host.split(':').next().unwrap_or(host);
    (!host.is_empty()).then(|| host.to_lowercase())
}
