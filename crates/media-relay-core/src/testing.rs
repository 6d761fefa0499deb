//! Testing helpers and mock utilities.
//!
//! Provides scratch settings, file fixtures and a recording chat replier.

use crate::config::MediaSettings;
use crate::handler::{MockChatReplier, TextFormat};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

/// Media settings pointing at a unique, not yet created directory under the temp dir.
#[must_use]
pub fn scratch_settings() -> MediaSettings {
    MediaSettings {
        download_dir: std::env::temp_dir().join(format!("media-relay-test-{}", Uuid::new_v4())),
        ..MediaSettings::default()
    }
}

/// Create a file of exactly `size` bytes (sparse where supported).
///
/// # Panics
///
/// Panics if the file cannot be created; only used from tests.
pub fn write_file_of_size(path: &str, size: u64) {
    let file = std::fs::File::create(path).expect("create fixture file");
    file.set_len(size).expect("size fixture file");
}

/// Everything a replier was asked to send
#[derive(Debug, Clone, Default)]
pub struct ReplyLog {
    /// Text replies with their formatting, in order
    pub texts: Vec<(String, TextFormat)>,
    /// Files sent as audio
    pub audios: Vec<PathBuf>,
    /// Files sent as video
    pub videos: Vec<PathBuf>,
}

impl ReplyLog {
    /// Text replies without formatting
    #[must_use]
    pub fn texts(&self) -> Vec<String> {
        self.texts.iter().map(|(text, _)| text.clone()).collect()
    }
}

/// Shared handle on a [`ReplyLog`] filled by a mock replier
#[derive(Clone, Default)]
pub struct Replies(Arc<Mutex<ReplyLog>>);

impl Replies {
    /// Copy of the replies recorded so far
    #[must_use]
    pub fn snapshot(&self) -> ReplyLog {
        self.0.lock().map(|log| log.clone()).unwrap_or_default()
    }
}

/// Create a mock replier that accepts every reply and records it.
///
/// Media sends record the path and also check that the file still exists at
/// that moment, so tests catch deletion before upload.
#[must_use]
pub fn mock_replier_recording() -> (MockChatReplier, Replies) {
    let replies = Replies::default();
    let mut mock = MockChatReplier::new();

    let log = replies.clone();
    mock.expect_reply_text().returning(move |text, format| {
        if let Ok(mut entries) = log.0.lock() {
            entries.texts.push((text.to_string(), format));
        }
        Ok(())
    });

    let log = replies.clone();
    mock.expect_reply_audio().returning(move |path| {
        assert!(path.exists(), "audio sent after deletion");
        if let Ok(mut entries) = log.0.lock() {
            entries.audios.push(path.to_path_buf());
        }
        Ok(())
    });

    let log = replies.clone();
    mock.expect_reply_video().returning(move |path| {
        assert!(path.exists(), "video sent after deletion");
        if let Ok(mut entries) = log.0.lock() {
            entries.videos.push(path.to_path_buf());
        }
        Ok(())
    });

    (mock, replies)
}
