use async_trait::async_trait;

pub mod directory;
pub mod youtube;

pub use directory::DirectoryTranscriptSource;
pub use youtube::YtDlpTranscriptSource;

use crate::transcript::TimedTextEntry;

/// Why a single language attempt produced no transcript
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("no transcript in language '{0}'")]
    LanguageUnavailable(String),

    #[error("{tool} failed: {message}")]
    ToolFailed { tool: String, message: String },

    #[error("I/O error: {0}")]
    Io(String),

    #[error("malformed transcript data: {0}")]
    Malformed(String),
}

impl From<std::io::Error> for TransportError {
    fn from(err: std::io::Error) -> Self {
        TransportError::Io(err.to_string())
    }
}

/// Trait for fetching captions of a video
///
/// Implementations return entries already normalized into [`TimedTextEntry`],
/// ordered by start offset as the upstream delivers them.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TranscriptSource: Send + Sync {
    /// Fetch the transcript in the first of `languages` that exists
    async fn fetch(
        &self,
        video_id: &str,
        languages: &[String],
    ) -> Result<Vec<TimedTextEntry>, TransportError>;

    /// Get the name of this source
    fn source_name(&self) -> &'static str;
}

/// Pick the caption source: a transcript directory when given, yt-dlp otherwise
pub fn build_source(transcript_dir: Option<&std::path::Path>, yt_dlp_path: &str) -> Box<dyn TranscriptSource> {
    match transcript_dir {
        Some(dir) => {
            tracing::debug!("Reading transcripts from {}", dir.display());
            Box::new(DirectoryTranscriptSource::new(dir))
        }
        None => Box::new(YtDlpTranscriptSource::with_path(yt_dlp_path)),
    }
}
