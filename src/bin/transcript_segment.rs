use anyhow::Result;
use clap::Parser;
use std::process::ExitCode;

use clipscribe::cli::{init_logging, SegmentCli};
use clipscribe::output::EMPTY_WINDOW_MESSAGE;
use clipscribe::sources::build_source;
use clipscribe::{Config, ResolveError, SegmentResolver};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = SegmentCli::parse();
    init_logging(cli.verbose);

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: SegmentCli) -> Result<ExitCode> {
    let config = Config::load_or_default()?;
    let source = build_source(cli.transcript_dir.as_deref(), &config.tools.yt_dlp_path);
    let resolver = SegmentResolver::new(source, config.transcript.languages.clone());

    let resolution = match resolver
        .resolve(&cli.video_id, &cli.start_time, &cli.end_time)
        .await
    {
        Ok(resolution) => resolution,
        Err(e @ ResolveError::NoTranscriptAvailable { .. }) => {
            eprintln!("{}", e);
            return Ok(ExitCode::FAILURE);
        }
        Err(e) => return Err(e.into()),
    };

    if resolution.is_empty() {
        println!("{}", EMPTY_WINDOW_MESSAGE);
    } else {
        for segment in &resolution.segments {
            println!("{}", segment);
        }
    }

    Ok(ExitCode::SUCCESS)
}
