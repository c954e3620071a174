use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::{Output, Stdio};
use tokio::process::Command;

use super::{TranscriptSource, TransportError};
use crate::transcript::TimedTextEntry;
use crate::utils::watch_url;

/// YouTube caption source using yt-dlp
pub struct YtDlpTranscriptSource {
    yt_dlp_path: String,
}

/// Caption tracks listed by `yt-dlp --dump-single-json`
#[derive(Debug, Default, Deserialize)]
pub(crate) struct CaptionListing {
    #[serde(default)]
    subtitles: HashMap<String, Vec<CaptionFormat>>,
    #[serde(default)]
    automatic_captions: HashMap<String, Vec<CaptionFormat>>,
}

#[derive(Debug, Deserialize)]
struct CaptionFormat {
    #[serde(default)]
    url: String,
}

impl CaptionFormat {
    /// YouTube serves machine translations of the spoken track with `tlang`
    fn is_translated(&self) -> bool {
        self.url.contains("tlang=")
    }
}

/// A caption track yt-dlp can download, keyed as in its listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum CaptionTrack {
    /// Uploaded by the channel
    Manual(String),
    /// Speech recognition in the spoken language
    Automatic(String),
}

impl CaptionTrack {
    fn key(&self) -> &str {
        match self {
            CaptionTrack::Manual(key) | CaptionTrack::Automatic(key) => key,
        }
    }

    fn write_flag(&self) -> &'static str {
        match self {
            CaptionTrack::Manual(_) => "--write-subs",
            CaptionTrack::Automatic(_) => "--write-auto-subs",
        }
    }
}

/// Pick the track that really is in `language`.
///
/// Uploaded subtitles win. Automatic captions count only when they are the
/// recognized speech itself (`<lang>-orig`, or an untranslated `<lang>`);
/// translations of another language never do.
pub(crate) fn select_caption_track(listing: &CaptionListing, language: &str) -> Option<CaptionTrack> {
    if listing
        .subtitles
        .get(language)
        .is_some_and(|formats| !formats.is_empty())
    {
        return Some(CaptionTrack::Manual(language.to_string()));
    }

    [format!("{}-orig", language), language.to_string()]
        .into_iter()
        .find(|key| {
            listing.automatic_captions.get(key).is_some_and(|formats| {
                !formats.is_empty() && !formats.iter().any(CaptionFormat::is_translated)
            })
        })
        .map(CaptionTrack::Automatic)
}

/// yt-dlp `json3` caption file
#[derive(Debug, Deserialize)]
struct Json3Captions {
    #[serde(default)]
    events: Vec<Json3Event>,
}

#[derive(Debug, Deserialize)]
struct Json3Event {
    #[serde(rename = "tStartMs", default)]
    start_ms: u64,
    #[serde(rename = "dDurationMs", default)]
    duration_ms: u64,
    segs: Option<Vec<Json3Seg>>,
}

#[derive(Debug, Deserialize)]
struct Json3Seg {
    #[serde(default)]
    utf8: String,
}

impl YtDlpTranscriptSource {
    pub fn new() -> Self {
        Self::with_path("yt-dlp")
    }

    pub fn with_path(yt_dlp_path: impl Into<String>) -> Self {
        Self {
            yt_dlp_path: yt_dlp_path.into(),
        }
    }

    /// Run yt-dlp; the child is killed if the caller stops waiting
    async fn run_yt_dlp(&self, args: &[&str]) -> Result<Output, TransportError> {
        let output = Command::new(&self.yt_dlp_path)
            .args(args)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await?;

        if !output.status.success() {
            let error = String::from_utf8_lossy(&output.stderr);
            return Err(TransportError::ToolFailed {
                tool: self.yt_dlp_path.clone(),
                message: error.trim().to_string(),
            });
        }

        Ok(output)
    }

    /// List the uploaded and automatic caption tracks of a video
    async fn list_captions(&self, video_id: &str) -> Result<CaptionListing, TransportError> {
        let url = watch_url(video_id);
        tracing::debug!("Listing caption tracks for: {}", url);

        let output = self
            .run_yt_dlp(&[
                "--dump-single-json",
                "--skip-download",
                "--no-warnings",
                "--no-playlist",
                &url,
            ])
            .await?;

        serde_json::from_slice(&output.stdout).map_err(|e| TransportError::Malformed(e.to_string()))
    }

    /// Download one caption track into `dir`
    async fn download_track(
        &self,
        video_id: &str,
        track: &CaptionTrack,
        dir: &Path,
    ) -> Result<(), TransportError> {
        let template = dir.join("%(id)s.%(ext)s");
        let url = watch_url(video_id);

        tracing::debug!("Fetching {:?} captions for: {}", track, url);

        self.run_yt_dlp(&[
            "--skip-download",
            track.write_flag(),
            "--sub-langs",
            track.key(),
            "--sub-format",
            "json3",
            "--no-warnings",
            "--no-playlist",
            "--output",
            &template.to_string_lossy(),
            &url,
        ])
        .await?;

        Ok(())
    }

    /// Find the caption file yt-dlp wrote for track `key`
    async fn find_caption_file(dir: &Path, key: &str) -> Result<Option<PathBuf>, TransportError> {
        let suffix = format!(".{}.json3", key);
        let mut entries = tokio::fs::read_dir(dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            let matches = path
                .file_name()
                .map(|name| name.to_string_lossy().ends_with(&suffix))
                .unwrap_or(false);
            if matches {
                return Ok(Some(path));
            }
        }
        Ok(None)
    }
}

/// Turn a `json3` caption document into timed entries.
///
/// Events without text (window markers, bare line breaks) are dropped.
pub(crate) fn parse_json3(content: &str) -> Result<Vec<TimedTextEntry>, TransportError> {
    let captions: Json3Captions =
        serde_json::from_str(content).map_err(|e| TransportError::Malformed(e.to_string()))?;

    let entries = captions
        .events
        .into_iter()
        .filter_map(|event| {
            let text: String = event
                .segs?
                .into_iter()
                .map(|seg| seg.utf8)
                .collect();
            if text.trim().is_empty() {
                return None;
            }
            Some(TimedTextEntry::new(
                event.start_ms as f64 / 1000.0,
                event.duration_ms as f64 / 1000.0,
                text,
            ))
        })
        .collect();

    Ok(entries)
}

#[async_trait]
impl TranscriptSource for YtDlpTranscriptSource {
    async fn fetch(
        &self,
        video_id: &str,
        languages: &[String],
    ) -> Result<Vec<TimedTextEntry>, TransportError> {
        let listing = self.list_captions(video_id).await?;
        let Some(track) = languages
            .iter()
            .find_map(|language| select_caption_track(&listing, language))
        else {
            return Err(TransportError::LanguageUnavailable(languages.join(",")));
        };

        let temp_dir = tempfile::TempDir::new()?;
        self.download_track(video_id, &track, temp_dir.path()).await?;

        let path = Self::find_caption_file(temp_dir.path(), track.key())
            .await?
            .ok_or_else(|| TransportError::LanguageUnavailable(track.key().to_string()))?;
        tracing::debug!("Parsing caption file: {}", path.display());
        let content = tokio::fs::read_to_string(&path).await?;
        parse_json3(&content)
    }

    fn source_name(&self) -> &'static str {
        "yt-dlp"
    }
}

impl Default for YtDlpTranscriptSource {
    fn default() -> Self {
        Self::new()
    }
}
