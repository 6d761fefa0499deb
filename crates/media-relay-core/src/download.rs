//! Media downloader
//!
//! Wraps a [`MediaExtractor`] with the relay's download policy: cookie use per
//! host, stream selection, output naming and per-request directories.

use crate::config::MediaSettings;
use crate::error::RelayError;
use crate::extractor::{AudioTranscode, ExtractOptions, FormatSelector, MediaExtractor};
use crate::media::{DownloadedFile, MediaInfo, FALLBACK_FILE_STEM};
use crate::request::{url_host, MediaRequest};
use crate::utils::sanitize_filename;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use uuid::Uuid;

/// Downloads media for requests, one private directory per request
pub struct MediaDownloader<E: MediaExtractor> {
    extractor: E,
    settings: MediaSettings,
}

impl<E: MediaExtractor> MediaDownloader<E> {
    /// Create a downloader over `extractor`
    #[must_use]
    pub const fn new(extractor: E, settings: MediaSettings) -> Self {
        Self {
            extractor,
            settings,
        }
    }

    /// Media settings in use
    #[must_use]
    pub const fn settings(&self) -> &MediaSettings {
        &self.settings
    }

    /// Returns true if the link's host belongs to a cookie domain and a cookie file is set.
    #[must_use]
    pub fn uses_cookies(&self, url: &str) -> bool {
        if self.settings.cookie_file().is_none() {
            return false;
        }
        let Some(host) = url_host(url) else {
            return false;
        };
        self.settings
            .cookie_domains()
            .iter()
            .any(|domain| host.contains(domain.as_str()))
    }

    fn cookie_file_for(&self, url: &str) -> Option<PathBuf> {
        if self.uses_cookies(url) {
            self.settings.cookie_file()
        } else {
            None
        }
    }

    /// Options for the metadata-only call
    #[must_use]
    pub fn probe_options(&self, url: &str) -> ExtractOptions {
        ExtractOptions {
            cookie_file: self.cookie_file_for(url),
            ..ExtractOptions::default()
        }
    }

    /// Options for the download call writing `<dir>/<file_stem>.<ext>`
    #[must_use]
    pub fn fetch_options(&self, request: &MediaRequest, dir: &Path, file_stem: &str) -> ExtractOptions {
        // '%' starts a template field for the extractor, so literal ones are doubled
        let escaped_stem = file_stem.replace('%', "%%");
        let escaped_dir = dir.to_string_lossy().replace('%', "%%");
        let output_template = format!("{escaped_dir}/{escaped_stem}.%(ext)s");

        let (format, audio) = if request.audio_requested {
            (
                FormatSelector::BestAudio,
                Some(AudioTranscode {
                    codec: self.settings.audio_codec.clone(),
                    bitrate_kbps: self.settings.audio_bitrate_kbps,
                }),
            )
        } else {
            (FormatSelector::Best, None)
        };

        ExtractOptions {
            format: Some(format),
            output_template: Some(output_template),
            cookie_file: self.cookie_file_for(&request.url),
            audio,
            ..ExtractOptions::default()
        }
    }

    /// Resolve metadata for a link without downloading
    ///
    /// # Errors
    ///
    /// Returns the extractor's error.
    pub async fn probe_info(&self, url: &str) -> Result<MediaInfo, RelayError> {
        let options = self.probe_options(url);
        debug!(url = %url, cookies = options.cookie_file.is_some(), "Probing media info");
        self.extractor.probe(url, &options).await
    }

    /// Download the media for `request` into a fresh per-request directory
    ///
    /// The file is named `<sanitised title>.<ext>`, where the extension is the
    /// one of the container yt-dlp actually produced.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created, the extractor fails
    /// or the reported file is missing or outside the request directory. The
    /// per-request directory is removed on failure.
    pub async fn fetch_media(
        &self,
        request: &MediaRequest,
        info: &MediaInfo,
    ) -> Result<DownloadedFile, RelayError> {
        let request_dir = self.settings.download_dir.join(Uuid::new_v4().to_string());
        tokio::fs::create_dir_all(&request_dir).await?;

        let result = self.fetch_into(request, info, &request_dir).await;
        if result.is_err() {
            remove_request_dir(&request_dir).await;
        }
        result
    }

    async fn fetch_into(
        &self,
        request: &MediaRequest,
        info: &MediaInfo,
        dir: &Path,
    ) -> Result<DownloadedFile, RelayError> {
        let stem = file_stem(info);
        let options = self.fetch_options(request, dir, &stem);
        debug!(
            url = %request.url,
            audio = request.audio_requested,
            cookies = options.cookie_file.is_some(),
            "Fetching media"
        );
        let path = self.extractor.fetch(&request.url, &options).await?;
        if !path.starts_with(dir) {
            return Err(RelayError::Extractor(format!(
                "downloaded file {} is outside {}",
                path.display(),
                dir.display()
            )));
        }

        let size = tokio::fs::metadata(&path).await?.len();
        Ok(DownloadedFile { path, size })
    }

    /// Remove a downloaded file and its per-request directory.
    ///
    /// Failures are logged and otherwise ignored.
    pub async fn discard(&self, file: &DownloadedFile) {
        if let Err(e) = tokio::fs::remove_file(&file.path).await {
            warn!(path = %file.path.display(), error = %e, "Failed to remove downloaded file");
        }
        if let Some(dir) = file.path.parent() {
            if dir.starts_with(&self.settings.download_dir) && dir != self.settings.download_dir {
                remove_request_dir(dir).await;
            }
        }
    }
}

/// Sanitised title used as filename stem, "media" when nothing usable is left
fn file_stem(info: &MediaInfo) -> String {
    let stem = sanitize_filename(info.title.as_deref().unwrap_or(FALLBACK_FILE_STEM));
    if stem.trim().is_empty() {
        FALLBACK_FILE_STEM.to_string()
    } else {
        stem
    }
}

async fn remove_request_dir(dir: &Path) {
    if let Err(e) = tokio::fs::remove_dir_all(dir).await {
        if e.kind() != std::io::ErrorKind::NotFound {
            warn!(path = %dir.display(), error = %e, "Failed to remove request directory");
        }
    }
}
