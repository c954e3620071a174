use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(
    name = "clipscribe",
    about = "Clipscribe - Preview YouTube transcript segments and cut clips for a time range",
    version,
    long_about = "Look up video info, preview the captions spoken between two timestamps, and cut that range into an mp4 clip. Captions are tried in several languages; yt-dlp does the downloading."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable progress indicators
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show title, uploader, duration and suggested clip name of a video
    Info {
        /// YouTube URL or video id
        #[arg(value_name = "URL", allow_hyphen_values = true)]
        url: String,
    },

    /// Print the captions overlapping a time range
    Transcript {
        /// YouTube URL or video id
        #[arg(value_name = "URL", allow_hyphen_values = true)]
        url: String,

        /// Range start (MM:SS or HH:MM:SS)
        #[arg(value_name = "START")]
        start: String,

        /// Range end (MM:SS or HH:MM:SS)
        #[arg(value_name = "END")]
        end: String,

        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,

        /// Output file path (prints to console if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Read transcripts from <DIR>/<video_id>.<lang>.json instead of YouTube
        #[arg(long, value_name = "DIR", env = "CLIPSCRIBE_TRANSCRIPT_DIR")]
        transcript_dir: Option<PathBuf>,
    },

    /// Cut a time range of a video into an mp4 file
    Clip {
        /// YouTube URL or video id
        #[arg(value_name = "URL", allow_hyphen_values = true)]
        url: String,

        /// Range start (MM:SS or HH:MM:SS)
        #[arg(value_name = "START")]
        start: String,

        /// Range end (MM:SS or HH:MM:SS)
        #[arg(value_name = "END")]
        end: String,

        /// Clip file name (".mp4" is appended when missing)
        #[arg(short, long, value_name = "NAME")]
        output: Option<String>,

        /// Download folder (defaults to the configured one)
        #[arg(short, long, value_name = "DIR")]
        directory: Option<PathBuf>,
    },

    /// Serve the JSON API used by the clip GUI
    Serve {
        /// Address to bind (defaults to the configured host)
        #[arg(long)]
        host: Option<String>,

        /// Port to bind (defaults to the configured port)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Show or create the configuration file
    Config {
        /// Show current configuration
        #[arg(short, long)]
        show: bool,
    },
}

/// `transcript-segment <video_id> <start_time> <end_time>`
#[derive(Parser)]
#[command(
    name = "transcript-segment",
    about = "Print the transcript of a YouTube video for a specific timeframe",
    version,
    after_help = "Example: transcript-segment 'AqEN8qOcAcA' '00:06:13' '00:06:30'"
)]
pub struct SegmentCli {
    /// YouTube video id (ids may start with '-')
    #[arg(allow_hyphen_values = true)]
    pub video_id: String,

    /// Range start (MM:SS or HH:MM:SS)
    pub start_time: String,

    /// Range end (MM:SS or HH:MM:SS)
    pub end_time: String,

    /// Read transcripts from <DIR>/<video_id>.<lang>.json instead of YouTube
    #[arg(long, value_name = "DIR", env = "CLIPSCRIBE_TRANSCRIPT_DIR")]
    pub transcript_dir: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(ValueEnum, Clone, Debug)]
pub enum OutputFormat {
    /// `[MM:SS] text` lines
    Text,
    /// JSON with window and language
    Json,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

/// Initialize tracing on stderr, keeping stdout for transcript output
pub fn init_logging(verbose: bool) {
    let default_filter = if verbose { "clipscribe=debug" } else { "clipscribe=info" };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
