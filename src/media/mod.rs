use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;

pub mod youtube;

pub use youtube::YtDlpMedia;

use crate::time::{format_duration_short, TimeWindow};
use crate::utils::suggested_clip_filename;
use crate::Result;

/// Information about a video shown before cutting a clip
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoMetadata {
    pub video_id: String,
    pub title: String,
    pub uploader: String,

    /// Duration in seconds, 0 when unknown
    pub duration_seconds: f64,

    /// Thumbnail URL, empty when unknown
    pub thumbnail: String,

    /// `.mp4` file name derived from the title
    pub suggested_filename: String,
}

impl VideoMetadata {
    /// Build from a yt-dlp `--dump-json` document
    pub fn from_info_json(video_id: &str, info: &Value) -> Self {
        let title = info["title"].as_str().unwrap_or("Unknown").to_string();
        let uploader = info["uploader"].as_str().unwrap_or("Unknown").to_string();
        let duration_seconds = info["duration"].as_f64().unwrap_or(0.0);
        let thumbnail = info["thumbnail"].as_str().unwrap_or_default().to_string();

        Self {
            video_id: video_id.to_string(),
            suggested_filename: suggested_clip_filename(&title),
            title,
            uploader,
            duration_seconds,
            thumbnail,
        }
    }

    /// Duration as `M:SS`
    pub fn duration_display(&self) -> String {
        format_duration_short(self.duration_seconds)
    }
}

/// Trait for looking up video metadata
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait VideoMetadataProvider: Send + Sync {
    async fn fetch_metadata(&self, video_id: &str) -> Result<VideoMetadata>;
}

/// Trait for cutting a time range out of a remote video
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ClipExtractor: Send + Sync {
    /// Write the `window` of `source_url` to `output_path`
    async fn extract_clip(&self, source_url: &str, window: TimeWindow, output_path: &Path) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_metadata_from_info_json() {
        let info = json!({
            "id": "AqEN8qOcAcA",
            "title": "Talk: Rust in production!",
            "uploader": "RustConf",
            "duration": 1873.4,
            "thumbnail": "https://i.ytimg.com/vi/AqEN8qOcAcA/maxresdefault.jpg"
        });

        let metadata = VideoMetadata::from_info_json("AqEN8qOcAcA", &info);

        assert_eq!(metadata.title, "Talk: Rust in production!");
        assert_eq!(metadata.uploader, "RustConf");
        assert_eq!(metadata.duration_display(), "31:13");
        assert_eq!(metadata.suggested_filename, "Talk Rust in production.mp4");
    }

    #[test]
    fn test_metadata_defaults() {
        let metadata = VideoMetadata::from_info_json("AqEN8qOcAcA", &json!({}));
        assert_eq!(metadata.title, "Unknown");
        assert_eq!(metadata.uploader, "Unknown");
        assert_eq!(metadata.duration_display(), "0:00");
        assert_eq!(metadata.thumbnail, "");
        assert_eq!(metadata.suggested_filename, "Unknown.mp4");
    }
}
