//! Clipscribe - preview YouTube transcript segments and cut clips for a time range
//!
//! This library resolves the transcript entries that overlap a requested time window,
//! falling back through a list of caption languages, and wraps yt-dlp for video
//! metadata and clip extraction.

pub mod cli;
pub mod config;
pub mod media;
pub mod output;
pub mod server;
pub mod sources;
pub mod time;
pub mod transcript;
pub mod utils;

pub use cli::{Cli, Commands, OutputFormat};
pub use config::Config;
pub use sources::TranscriptSource;
pub use time::{format_clock, parse_clock, MalformedTimeError, TimeWindow};
pub use transcript::{Resolution, ResolveError, Segment, SegmentResolver, TimedTextEntry};

/// Result type used throughout the library
pub type Result<T> = anyhow::Result<T>;

/// Error types specific to clipscribe
#[derive(thiserror::Error, Debug)]
pub enum ClipscribeError {
    #[error("Unsupported URL format: {0}")]
    UnsupportedUrl(String),

    #[error("Failed to fetch video info: {0}")]
    MetadataFailed(String),

    #[error("Clip extraction failed: {0}")]
    ClipExtractionFailed(String),

    #[error("{0} is not available. Please install it: https://github.com/yt-dlp/yt-dlp")]
    ToolUnavailable(String),
}
