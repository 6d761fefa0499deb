//! Media metadata and downloaded files

use serde_json::Value;
use std::fmt::Write;
use std::path::PathBuf;

/// Title shown when the extractor reports none
pub const UNKNOWN_TITLE: &str = "Unknown Title";
/// Filename stem used when the title is missing or sanitises to nothing
pub const FALLBACK_FILE_STEM: &str = "media";

/// Metadata resolved by the extractor for one link
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MediaInfo {
    /// Media title
    pub title: Option<String>,
    /// Duration in whole seconds
    pub duration: Option<u64>,
    /// Extension of the extractor's default format; the download may differ
    pub ext: Option<String>,
    /// Full extractor metadata
    pub raw: Value,
}

impl MediaInfo {
    /// Build media info from extractor JSON.
    ///
    /// Fractional durations are truncated to whole seconds.
    ///
    /// # Examples
    ///
    /// ```
    /// use media_relay_core::media::MediaInfo;
    /// use serde_json::json;
    ///
    /// let info = MediaInfo::from_json(json!({"title": "Clip", "duration": 61.7, "ext": "webm"}));
    /// assert_eq!(info.duration, Some(61));
    /// assert_eq!(info.ext.as_deref(), Some("webm"));
    /// ```
    #[must_use]
    pub fn from_json(raw: Value) -> Self {
        let title = raw
            .get("title")
            .and_then(Value::as_str)
            .map(str::to_string);
        let duration = raw.get("duration").and_then(|d| {
            d.as_u64()
                .or_else(|| d.as_f64().filter(|secs| *secs >= 0.0).map(|secs| secs as u64))
        });
        let ext = raw
            .get("ext")
            .and_then(Value::as_str)
            .filter(|ext| !ext.is_empty())
            .map(str::to_string);

        Self {
            title,
            duration,
            ext,
            raw,
        }
    }

    /// Title for display, falling back to "Unknown Title"
    #[must_use]
    pub fn display_title(&self) -> &str {
        self.title.as_deref().unwrap_or(UNKNOWN_TITLE)
    }

    /// HTML preview with the escaped title and, when known, the duration.
    #[must_use]
    pub fn summary_html(&self) -> String {
        let mut msg = format!(
            "📌 <b>Title:</b> {}",
            html_escape::encode_text(self.display_title())
        );
        if let Some(secs) = self.duration.filter(|secs| *secs > 0) {
            let _ = write!(msg, "\n⏱️ <b>Duration:</b> {}", format_duration(secs));
        }
        msg
    }
}

/// Render seconds as `m:ss`. Minutes are not folded into hours.
///
/// # Examples
///
/// ```
/// use media_relay_core::media::format_duration;
/// assert_eq!(format_duration(65), "1:05");
/// assert_eq!(format_duration(3725), "62:05");
/// ```
#[must_use]
pub fn format_duration(secs: u64) -> String {
    format!("{}:{:02}", secs / 60, secs % 60)
}

/// A media file materialised for one request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadedFile {
    /// Local path of the file
    pub path: PathBuf,
    /// Size in bytes
    pub size: u64,
}

impl DownloadedFile {
    /// Size in megabytes, for logs
    #[must_use]
    pub fn size_mb(&self) -> f64 {
        self.size as f64 / 1024.0 / 1024.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_json_reads_fields() {
        let info = MediaInfo::from_json(json!({
            "title": "Never Gonna Give You Up",
            "duration": 212,
            "ext": "mp4",
            "uploader": "Rick Astley"
        }));
        assert_eq!(info.title.as_deref(), Some("Never Gonna Give You Up"));
        assert_eq!(info.duration, Some(212));
        assert_eq!(info.ext.as_deref(), Some("mp4"));
        assert_eq!(info.raw["uploader"], "Rick Astley");
    }

    #[test]
    fn test_from_json_missing_fields() {
        let info = MediaInfo::from_json(json!({"duration": null, "ext": ""}));
        assert_eq!(info.display_title(), UNKNOWN_TITLE);
        assert_eq!(info.duration, None);
        assert_eq!(info.ext, None);
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(0), "0:00");
        assert_eq!(format_duration(59), "0:59");
        assert_eq!(format_duration(60), "1:00");
        assert_eq!(format_duration(212), "3:32");
    }

    #[test]
    fn test_summary_html_with_duration() {
        let info = MediaInfo::from_json(json!({"title": "Tom & Jerry <3", "duration": 90.4}));
        assert_eq!(
            info.summary_html(),
            "📌 <b>Title:</b> Tom &amp; Jerry &lt;3\n⏱️ <b>Duration:</b> 1:30"
        );
    }

    #[test]
    fn test_summary_html_skips_zero_duration() {
        let info = MediaInfo::from_json(json!({"title": "Live", "duration": 0}));
        assert_eq!(info.summary_html(), "📌 <b>Title:</b> Live");
    }

    #[test]
    fn test_summary_html_unknown_title() {
        let info = MediaInfo::default();
        assert_eq!(info.summary_html(), "📌 <b>Title:</b> Unknown Title");
    }
}
