//! yt-dlp extractor - metadata probing and media download via the yt-dlp binary
//!
//! The binary is spawned directly (no shell), so links and paths are passed as
//! plain arguments and never need quoting.

use super::{ExtractOptions, MediaExtractor};
use crate::config::MediaSettings;
use crate::error::RelayError;
use crate::media::MediaInfo;
use crate::utils::truncate_str;
use async_trait::async_trait;
use std::ffi::OsString;
use std::path::PathBuf;
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, info, warn};

/// Patterns indicating the link itself can never be resolved
const FATAL_ERROR_PATTERNS: &[&str] = &[
    "Video unavailable",
    "Private video",
    "This video is not available",
    "Sign in to confirm your age",
    "age-restricted",
    "members-only",
    "This video is private",
    "removed by the uploader",
    "no longer available",
    "blocked it in your country",
    "geo-restricted",
    "copyright claim",
    "This video has been removed",
    "ERROR: Unsupported URL",
    "is not a valid URL",
    "Unable to extract video data",
    "Premieres in",
    "This live event will begin",
    "HTTP Error 403",
    "HTTP Error 404",
    "Sign in to view this video",
];

/// Patterns indicating a transient network or rate-limit condition
const TRANSIENT_ERROR_PATTERNS: &[&str] = &[
    "Connection reset",
    "Connection timed out",
    "Unable to download webpage",
    "HTTP Error 429",
    "HTTP Error 503",
    "Read timed out",
    "network is unreachable",
    "Temporary failure in name resolution",
];

/// Maximum characters of extractor output carried in an error
const MAX_ERROR_LENGTH: usize = 1_000;

/// Rough classification of an extractor failure, used for logging
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The link cannot be resolved (private, removed, unsupported, ...)
    Fatal,
    /// Network or rate-limit trouble that might pass on its own
    Transient,
    /// Anything else
    Other,
}

/// Classify extractor output. Failures are never retried; this only picks the log line.
#[must_use]
pub fn classify_failure(error_msg: &str) -> FailureKind {
    if FATAL_ERROR_PATTERNS
        .iter()
        .any(|pattern| error_msg.contains(pattern))
    {
        FailureKind::Fatal
    } else if TRANSIENT_ERROR_PATTERNS
        .iter()
        .any(|pattern| error_msg.contains(pattern))
    {
        FailureKind::Transient
    } else {
        FailureKind::Other
    }
}

/// Extractor backed by the yt-dlp executable
#[derive(Debug, Clone)]
pub struct YtdlpExtractor {
    binary: String,
}

impl YtdlpExtractor {
    /// Create an extractor that runs `binary` (a name on `PATH` or a full path)
    #[must_use]
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    /// Create an extractor from media settings
    #[must_use]
    pub fn from_settings(settings: &MediaSettings) -> Self {
        Self::new(settings.ytdlp_binary.clone())
    }

    /// Report the installed yt-dlp version
    ///
    /// # Errors
    ///
    /// Returns an error if the binary is missing or exits with a failure.
    pub async fn version(&self) -> Result<String, RelayError> {
        let output = self.run(vec![OsString::from("--version")]).await?;
        Ok(output.trim().to_string())
    }

    /// Arguments for a metadata-only call
    #[must_use]
    pub fn probe_args(url: &str, options: &ExtractOptions) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec!["-J".into(), "--quiet".into(), "--no-warnings".into()];
        Self::push_common_args(&mut args, options);
        args.push("--".into());
        args.push(url.into());
        args
    }

    /// Arguments for a download call
    ///
    /// yt-dlp prints the final path of the file once post-processing is done,
    /// since the container picked by `-f` or `-x` decides the extension.
    #[must_use]
    pub fn fetch_args(url: &str, options: &ExtractOptions) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec![
            "--quiet".into(),
            "--no-warnings".into(),
            "--no-progress".into(),
            "--no-simulate".into(),
            "--print".into(),
            "after_move:filepath".into(),
        ];
        if let Some(format) = options.format {
            args.push("-f".into());
            args.push(format.as_str().into());
        }
        if let Some(ref template) = options.output_template {
            args.push("-o".into());
            args.push(template.into());
        }
        Self::push_common_args(&mut args, options);
        if let Some(ref audio) = options.audio {
            args.push("-x".into());
            args.push("--audio-format".into());
            args.push(audio.codec.as_str().into());
            args.push("--audio-quality".into());
            args.push(format!("{}K", audio.bitrate_kbps).into());
        }
        args.push("--".into());
        args.push(url.into());
        args
    }

    fn push_common_args(args: &mut Vec<OsString>, options: &ExtractOptions) {
        if options.no_playlist {
            args.push("--no-playlist".into());
        }
        if let Some(ref cookies) = options.cookie_file {
            args.push("--cookies".into());
            args.push(cookies.as_os_str().to_owned());
        }
    }

    /// Run yt-dlp and return its stdout
    async fn run(&self, args: Vec<OsString>) -> Result<String, RelayError> {
        debug!(binary = %self.binary, ?args, "Executing yt-dlp command");

        let output = Command::new(&self.binary)
            .args(&args)
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(RelayError::Spawn)?;

        if output.status.success() {
            return Ok(String::from_utf8_lossy(&output.stdout).into_owned());
        }

        let stderr = String::from_utf8_lossy(&output.stderr);
        let error_msg = if stderr.trim().is_empty() {
            String::from_utf8_lossy(&output.stdout).trim().to_string()
        } else {
            stderr.trim().to_string()
        };
        let error_msg = if error_msg.is_empty() {
            format!("yt-dlp exited with {}", output.status)
        } else {
            truncate_str(error_msg, MAX_ERROR_LENGTH)
        };

        match classify_failure(&error_msg) {
            FailureKind::Fatal => warn!(error = %error_msg, "Fatal yt-dlp error detected"),
            FailureKind::Transient => {
                warn!(error = %error_msg, "Transient yt-dlp error detected (not retried)");
            }
            FailureKind::Other => warn!(error = %error_msg, "yt-dlp failed"),
        }

        Err(RelayError::Extractor(error_msg))
    }
}

#[async_trait]
impl MediaExtractor for YtdlpExtractor {
    async fn probe(&self, url: &str, options: &ExtractOptions) -> Result<MediaInfo, RelayError> {
        let stdout = self.run(Self::probe_args(url, options)).await?;
        let raw: serde_json::Value = serde_json::from_str(stdout.trim())?;
        let info = MediaInfo::from_json(raw);
        info!(
            url = %url,
            title = ?info.title,
            duration = ?info.duration,
            ext = ?info.ext,
            "Media info resolved"
        );
        Ok(info)
    }

    async fn fetch(&self, url: &str, options: &ExtractOptions) -> Result<PathBuf, RelayError> {
        let stdout = self.run(Self::fetch_args(url, options)).await?;
        let path = reported_path(&stdout).ok_or_else(|| {
            RelayError::Extractor("yt-dlp did not report the downloaded file".to_string())
        })?;
        info!(url = %url, path = %path.display(), "Media downloaded");
        Ok(path)
    }
}

/// Last non-empty line of the download output, which is the printed file path
fn reported_path(stdout: &str) -> Option<PathBuf> {
    stdout
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .last()
        .map(PathBuf::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractor::{AudioTranscode, FormatSelector};
    use std::path::PathBuf;

    fn as_strings(args: &[OsString]) -> Vec<String> {
        args.iter()
            .map(|arg| arg.to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn test_probe_args_with_cookies() {
        let options = ExtractOptions {
            cookie_file: Some(PathBuf::from("cookies.txt")),
            ..ExtractOptions::default()
        };
        let args = as_strings(&YtdlpExtractor::probe_args("https://youtu.be/abc123", &options));
        assert_eq!(
            args,
            vec![
                "-J",
                "--quiet",
                "--no-warnings",
                "--no-playlist",
                "--cookies",
                "cookies.txt",
                "--",
                "https://youtu.be/abc123"
            ]
        );
    }

    #[test]
    fn test_fetch_args_audio_transcode() {
        let options = ExtractOptions {
            format: Some(FormatSelector::BestAudio),
            output_template: Some("downloads/x/clip.%(ext)s".to_string()),
            audio: Some(AudioTranscode {
                codec: "mp3".to_string(),
                bitrate_kbps: 192,
            }),
            ..ExtractOptions::default()
        };
        let args = as_strings(&YtdlpExtractor::fetch_args("https://example.com/clip", &options));
        assert_eq!(
            args,
            vec![
                "--quiet",
                "--no-warnings",
                "--no-progress",
                "--no-simulate",
                "--print",
                "after_move:filepath",
                "-f",
                "bestaudio/best",
                "-o",
                "downloads/x/clip.%(ext)s",
                "--no-playlist",
                "-x",
                "--audio-format",
                "mp3",
                "--audio-quality",
                "192K",
                "--",
                "https://example.com/clip"
            ]
        );
        assert!(!args.contains(&"--cookies".to_string()));
    }

    #[test]
    fn test_fetch_args_video() {
        let options = ExtractOptions {
            format: Some(FormatSelector::Best),
            output_template: Some("out.%(ext)s".to_string()),
            ..ExtractOptions::default()
        };
        let args = as_strings(&YtdlpExtractor::fetch_args("https://example.com/v", &options));
        assert!(args.windows(2).any(|w| w[0] == "-f" && w[1] == "best"));
        assert!(!args.contains(&"-x".to_string()));
        assert_eq!(args.last().map(String::as_str), Some("https://example.com/v"));
    }

    #[test]
    fn test_classify_failure() {
        assert_eq!(
            classify_failure("ERROR: [youtube] abc: Private video. Sign in"),
            FailureKind::Fatal
        );
        assert_eq!(
            classify_failure("ERROR: Unable to download webpage: HTTP Error 429"),
            FailureKind::Transient
        );
        assert_eq!(
            classify_failure("ERROR: Requested format is not available"),
            FailureKind::Other
        );
    }

    #[tokio::test]
    async fn test_missing_binary_is_spawn_error() {
        let extractor = YtdlpExtractor::new("media-relay-no-such-binary");
        let result = extractor
            .probe("https://example.com/clip", &ExtractOptions::default())
            .await;
        assert!(matches!(result, Err(RelayError::Spawn(_))));
    }

    #[test]
    fn test_reported_path_takes_last_line() {
        assert_eq!(
            reported_path("downloads/a/Clip.f137.mp4\ndownloads/a/Clip.mp4\n\n"),
            Some(PathBuf::from("downloads/a/Clip.mp4"))
        );
        assert_eq!(reported_path("  \n"), None);
    }

    /// Writes an executable stand-in for yt-dlp that fills `%(ext)s` with `ext`
    #[cfg(unix)]
    fn fake_ytdlp(dir: &std::path::Path, ext: &str) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;

        let script = format!(
            r#"#!/bin/sh
out=""
while [ $# -gt 0 ]; do
  case "$1" in
    -o) out="$2"; shift ;;
  esac
  shift
done
path=$(printf '%s' "$out" | sed 's/%(ext)s/{ext}/')
printf 'media' > "$path"
printf '%s\n' "$path"
"#
        );
        let path = dir.join("yt-dlp");
        std::fs::write(&path, script).expect("write fake yt-dlp");
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755))
            .expect("make fake yt-dlp executable");
        path
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_fetch_returns_path_written_by_binary() {
        let dir = std::env::temp_dir().join(format!("media-relay-ytdlp-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).expect("create scratch dir");
        let extractor = YtdlpExtractor::new(fake_ytdlp(&dir, "mp4").to_string_lossy());

        let options = ExtractOptions {
            format: Some(FormatSelector::Best),
            output_template: Some(format!("{}/Clip.%(ext)s", dir.display())),
            ..ExtractOptions::default()
        };
        let path = extractor
            .fetch("https://youtu.be/abc123", &options)
            .await
            .expect("fake download succeeds");

        assert_eq!(path, dir.join("Clip.mp4"));
        assert!(path.exists());

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_fetch_reports_stderr_on_failure() {
        use std::os::unix::fs::PermissionsExt;

        let dir = std::env::temp_dir().join(format!("media-relay-ytdlp-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).expect("create scratch dir");
        let binary = dir.join("yt-dlp");
        std::fs::write(
            &binary,
            "#!/bin/sh\necho 'ERROR: Unsupported URL: https://example.com' >&2\nexit 1\n",
        )
        .expect("write fake yt-dlp");
        std::fs::set_permissions(&binary, std::fs::Permissions::from_mode(0o755))
            .expect("make fake yt-dlp executable");

        let result = YtdlpExtractor::new(binary.to_string_lossy())
            .fetch("https://example.com", &ExtractOptions::default())
            .await;

        match result {
            Err(RelayError::Extractor(msg)) => {
                assert_eq!(msg, "ERROR: Unsupported URL: https://example.com");
            }
            other => panic!("expected extractor error, got {other:?}"),
        }

        let _ = std::fs::remove_dir_all(&dir);
    }
}
