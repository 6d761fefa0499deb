//! Utility functions for filename handling and transport retries.

use crate::config::{MAX_FILENAME_BYTES, MAX_FILENAME_CHARS};
use std::fmt::Display;
use std::time::Duration;
use tokio_retry::strategy::{jitter, ExponentialBackoff};
use tokio_retry::RetryIf;
use tracing::warn;

/// Characters that are unsafe in filenames or reorder the displayed text.
const DISALLOWED_FILENAME_CHARS: &[char] = &[
    '<', '>', ':', '"', '/', '\\', '|', '?', '*', '\u{200b}', '\u{202c}', '\u{202d}', '\u{202e}',
    '\u{202f}',
];

/// Safely truncates a string to a maximum character length (not bytes).
///
/// This is UTF-8 safe and will not panic on multi-byte characters.
///
/// # Examples
///
/// ```
/// use media_relay_core::utils::truncate_str;
/// let s = "Привет, мир!";
/// assert_eq!(truncate_str(s, 6), "Привет");
/// ```
pub fn truncate_str(s: impl AsRef<str>, max_chars: usize) -> String {
    let s = s.as_ref();
    if s.chars().count() <= max_chars {
        return s.to_string();
    }
    s.char_indices()
        .nth(max_chars)
        .map_or_else(|| s.to_string(), |(pos, _)| s[..pos].to_string())
}

/// Truncates a string to at most `max_bytes` bytes on a character boundary.
#[must_use]
pub fn truncate_bytes(s: &str, max_bytes: usize) -> &str {
    if s.len() <= max_bytes {
        return s;
    }
    let end = s
        .char_indices()
        .map(|(pos, c)| pos + c.len_utf8())
        .take_while(|end| *end <= max_bytes)
        .last()
        .unwrap_or(0);
    &s[..end]
}

/// Strips filesystem-unsafe and bidirectional control characters from a media
/// title and caps it at 150 characters and 200 bytes.
///
/// The byte cap keeps `<stem>.<ext>` plus yt-dlp's temporary suffixes under
/// the usual 255-byte filename limit for titles in emoji or CJK.
///
/// Applying it twice yields the same result as applying it once.
///
/// # Examples
///
/// ```
/// use media_relay_core::utils::sanitize_filename;
/// assert_eq!(sanitize_filename("AC/DC: Live?"), "ACDC Live");
/// ```
#[must_use]
pub fn sanitize_filename(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .filter(|c| !DISALLOWED_FILENAME_CHARS.contains(c))
        .collect();
    let capped = truncate_str(cleaned, MAX_FILENAME_CHARS);
    truncate_bytes(&capped, MAX_FILENAME_BYTES).to_string()
}

/// Returns true if `c` would be removed by [`sanitize_filename`].
#[must_use]
pub fn is_disallowed_filename_char(c: char) -> bool {
    DISALLOWED_FILENAME_CHARS.contains(&c)
}

/// Retry a chat transport operation with exponential backoff.
///
/// Meant for Telegram API calls that may fail on transient network errors.
/// Only errors for which `is_transient` returns true are retried; anything
/// else is returned after the first attempt. Media extraction is never routed
/// through here.
///
/// - Initial delay: 500ms
/// - Max delay: 4s
/// - Max retries: 3 (see constants in `config.rs`)
///
/// # Examples
///
/// ```no_run
/// use media_relay_core::utils::retry_transport_operation;
/// use anyhow::Result;
///
/// async fn send() -> Result<()> {
///     Ok(())
/// }
///
/// # async fn example() -> Result<()> {
/// retry_transport_operation(|| async { send().await }, |_| true).await?;
/// # Ok(())
/// # }
/// ```
///
/// # Errors
///
/// Returns the first non-transient error, or the last error once retries run out.
pub async fn retry_transport_operation<F, Fut, T, E, C>(
    operation: F,
    is_transient: C,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T, E>>,
    E: Display,
    C: FnMut(&E) -> bool,
{
    use crate::config::{
        TELEGRAM_API_INITIAL_BACKOFF_MS, TELEGRAM_API_MAX_BACKOFF_MS, TELEGRAM_API_MAX_RETRIES,
    };

    let retry_strategy = ExponentialBackoff::from_millis(TELEGRAM_API_INITIAL_BACKOFF_MS)
        .max_delay(Duration::from_millis(TELEGRAM_API_MAX_BACKOFF_MS))
        .map(jitter)
        .take(TELEGRAM_API_MAX_RETRIES);

    RetryIf::spawn(retry_strategy, operation, is_transient)
        .await
        .map_err(|e| {
            warn!("Transport operation failed: {}", e);
            e
        })
}
