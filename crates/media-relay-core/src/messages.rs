//! User-facing message texts.

/// Reply for messages without a link
pub const NO_URL: &str = "❗ Please send a valid media link.";
/// Status shown before the metadata probe
pub const FETCHING_INFO: &str = "ℹ️ Fetching media info...";
/// Status shown before the download
pub const DOWNLOADING: &str = "⏳ Downloading... Please wait...";

/// Usage instructions for the start command.
#[must_use]
pub fn usage_text() -> String {
    "🎬 Send me a link from YouTube, Facebook, Instagram, etc.\n\
     🟣 To get MP3 only, start your message with `audio` or `mp3`."
        .to_string()
}

/// Reply for files above the transfer ceiling.
#[must_use]
pub fn file_too_large(limit_mb: u64) -> String {
    format!("⚠️ File too large to send via Telegram ({limit_mb} MB limit).")
}

/// Single reply for any failure after the link was accepted.
#[must_use]
pub fn error_reply(error: &impl std::fmt::Display) -> String {
    format!("😥 Error: {error}")
}
