use async_trait::async_trait;
use serde_json::Value;
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;

use super::{ClipExtractor, VideoMetadata, VideoMetadataProvider};
use crate::time::TimeWindow;
use crate::utils::{format_duration, watch_url};
use crate::{ClipscribeError, Result};

/// Video info and clip cutting through yt-dlp
pub struct YtDlpMedia {
    yt_dlp_path: String,
}

impl YtDlpMedia {
    pub fn new() -> Self {
        Self::with_path("yt-dlp")
    }

    pub fn with_path(yt_dlp_path: impl Into<String>) -> Self {
        Self {
            yt_dlp_path: yt_dlp_path.into(),
        }
    }

    /// Get video information using yt-dlp
    async fn get_video_info(&self, url: &str) -> Result<Value> {
        tracing::debug!("Extracting video info for: {}", url);

        let output = Command::new(&self.yt_dlp_path)
            .args(["--dump-json", "--no-warnings", "--no-playlist", url])
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|_| ClipscribeError::ToolUnavailable(self.yt_dlp_path.clone()))?;

        if !output.status.success() {
            let error = String::from_utf8_lossy(&output.stderr);
            return Err(ClipscribeError::MetadataFailed(error.trim().to_string()).into());
        }

        let json_str = String::from_utf8(output.stdout)?;
        let info: Value = serde_json::from_str(&json_str)?;

        Ok(info)
    }

    /// Arguments for cutting `window` of `url` into `output_path`
    fn clip_args(url: &str, window: TimeWindow, output_path: &Path) -> Vec<String> {
        vec![
            "--download-sections".to_string(),
            format!("*{}-{}", window.start_seconds, window.end_seconds),
            "--force-keyframes-at-cuts".to_string(),
            "--format".to_string(),
            "bv*[ext=mp4]+ba[ext=m4a]/b[ext=mp4]/b".to_string(),
            "--merge-output-format".to_string(),
            "mp4".to_string(),
            "--no-playlist".to_string(),
            "--no-warnings".to_string(),
            "--force-overwrites".to_string(),
            "--output".to_string(),
            output_path.to_string_lossy().to_string(),
            url.to_string(),
        ]
    }
}

#[async_trait]
impl VideoMetadataProvider for YtDlpMedia {
    async fn fetch_metadata(&self, video_id: &str) -> Result<VideoMetadata> {
        let info = self.get_video_info(&watch_url(video_id)).await?;
        Ok(VideoMetadata::from_info_json(video_id, &info))
    }
}

#[async_trait]
impl ClipExtractor for YtDlpMedia {
    async fn extract_clip(&self, source_url: &str, window: TimeWindow, output_path: &Path) -> Result<()> {
        if window.is_inverted() || window.duration_seconds() == 0 {
            return Err(ClipscribeError::ClipExtractionFailed(format!(
                "end time must be after start time ({})",
                window
            ))
            .into());
        }

        tracing::info!(
            "Extracting {} clip {} from {}",
            format_duration(window.duration_seconds() as f64),
            window,
            source_url
        );

        let output = Command::new(&self.yt_dlp_path)
            .args(Self::clip_args(source_url, window, output_path))
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|_| ClipscribeError::ToolUnavailable(self.yt_dlp_path.clone()))?;

        if !output.status.success() {
            let error = String::from_utf8_lossy(&output.stderr);
            return Err(ClipscribeError::ClipExtractionFailed(error.trim().to_string()).into());
        }

        Ok(())
    }
}

impl Default for YtDlpMedia {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_clip_args() {
        let args = YtDlpMedia::clip_args(
            "https://www.youtube.com/watch?v=AqEN8qOcAcA",
            TimeWindow::new(373, 390),
            &PathBuf::from("/tmp/clip.mp4"),
        );
        assert_eq!(args[0], "--download-sections");
        assert_eq!(args[1], "*373-390");
        assert_eq!(args.last().map(String::as_str), Some("https://www.youtube.com/watch?v=AqEN8qOcAcA"));
        assert!(args.contains(&"/tmp/clip.mp4".to_string()));
    }

    #[tokio::test]
    async fn test_rejects_empty_window() {
        let media = YtDlpMedia::with_path("definitely-not-a-real-yt-dlp-binary");
        let err = media
            .extract_clip("https://youtu.be/AqEN8qOcAcA", TimeWindow::new(390, 373), Path::new("out.mp4"))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("end time must be after start time"));
    }

    #[tokio::test]
    async fn test_missing_tool() {
        let media = YtDlpMedia::with_path("definitely-not-a-real-yt-dlp-binary");
        let err = media.fetch_metadata("AqEN8qOcAcA").await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ClipscribeError>(),
            Some(ClipscribeError::ToolUnavailable(_))
        ));
    }
}
