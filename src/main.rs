use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clipscribe::cli::{init_logging, Cli, Commands};
use clipscribe::media::{ClipExtractor, VideoMetadataProvider, YtDlpMedia};
use clipscribe::server::{self, AppState};
use clipscribe::sources::build_source;
use clipscribe::utils::{self, ensure_mp4_extension, extract_video_id, safe_file_name};
use clipscribe::{output, ClipscribeError, Config, SegmentResolver, TimeWindow};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = Config::load().await?;

    if !matches!(cli.command, Commands::Config { .. }) {
        // Check for required external dependencies (non-fatal)
        let missing_deps = utils::check_dependencies(&config.tools.yt_dlp_path).await;
        if !missing_deps.is_empty() {
            eprintln!("{}", console::style("⚠️  Dependency check warnings:").yellow());
            for dep in missing_deps {
                eprintln!("   • {}", dep);
            }
            eprintln!("   (Continuing anyway - tools may be available)");
        }
    }

    match cli.command {
        Commands::Info { url } => {
            let video_id = require_video_id(&url)?;
            let media = YtDlpMedia::with_path(&config.tools.yt_dlp_path);

            let metadata = tokio::time::timeout(config.metadata_timeout(), media.fetch_metadata(&video_id))
                .await
                .context("Timed out fetching video info")??;

            println!("Title:     {}", metadata.title);
            println!("Uploader:  {}", metadata.uploader);
            println!("Duration:  {}", metadata.duration_display());
            println!("Thumbnail: {}", metadata.thumbnail);
            println!("File name: {}", metadata.suggested_filename);
        }
        Commands::Transcript {
            url,
            start,
            end,
            format,
            output,
            transcript_dir,
        } => {
            let video_id = require_video_id(&url)?;
            let source = build_source(transcript_dir.as_deref(), &config.tools.yt_dlp_path);
            let resolver = SegmentResolver::new(source, config.transcript.languages.clone());

            tracing::info!("Resolving transcript for {} from {} to {}", video_id, start, end);
            let resolution = resolver.resolve(&video_id, &start, &end).await?;

            match output {
                Some(path) => {
                    output::save_to_file(&resolution, &path, &format).await?;
                    println!("Transcript saved to: {}", path.display());
                }
                None => output::print_to_console(&resolution, &format)?,
            }
        }
        Commands::Clip {
            url,
            start,
            end,
            output,
            directory,
        } => {
            let video_id = require_video_id(&url)?;
            let window = TimeWindow::parse(&start, &end)?;

            let directory = directory.unwrap_or_else(|| config.download.directory.clone());
            fs_err::create_dir_all(&directory)?;
            let filename = output
                .as_deref()
                .and_then(safe_file_name)
                .map(|name| ensure_mp4_extension(&name))
                .unwrap_or_else(|| utils::generate_unique_filename(&video_id));
            let output_path: PathBuf = directory.join(filename);

            let progress = if cli.quiet {
                ProgressBar::hidden()
            } else {
                ProgressBar::new_spinner()
            };
            progress.set_style(
                ProgressStyle::default_spinner()
                    .template("{spinner:.green} [{elapsed_precise}] {msg}")
                    .context("Invalid progress template")?,
            );
            progress.enable_steady_tick(Duration::from_millis(120));
            progress.set_message(format!("Extracting {} with yt-dlp...", window));

            let media = YtDlpMedia::with_path(&config.tools.yt_dlp_path);
            let result = tokio::time::timeout(
                config.clip_timeout(),
                media.extract_clip(&utils::watch_url(&video_id), window, &output_path),
            )
            .await;

            match result {
                Ok(Ok(())) => progress.finish_with_message("Clip complete"),
                Ok(Err(e)) => {
                    progress.abandon_with_message("Clip failed");
                    return Err(e);
                }
                Err(_) => {
                    progress.abandon_with_message("Clip timed out");
                    anyhow::bail!(
                        "Clip extraction timed out after {}s",
                        config.download.clip_timeout_secs
                    );
                }
            }

            let size = fs_err::metadata(&output_path).map(|m| m.len()).unwrap_or(0);
            println!(
                "Clip saved to: {} ({})",
                output_path.display(),
                utils::format_file_size(size)
            );
        }
        Commands::Serve { host, port } => {
            let mut config = config;
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            let addr = config.server_addr();

            let resolver = SegmentResolver::new(
                build_source(None, &config.tools.yt_dlp_path),
                config.transcript.languages.clone(),
            );
            let metadata: Box<dyn VideoMetadataProvider> = Box::new(YtDlpMedia::with_path(&config.tools.yt_dlp_path));
            let clips: Box<dyn ClipExtractor> = Box::new(YtDlpMedia::with_path(&config.tools.yt_dlp_path));

            let state = Arc::new(AppState {
                config,
                resolver,
                metadata,
                clips,
            });
            server::serve(state, &addr).await?;
        }
        Commands::Config { show } => {
            if show {
                config.display();
            } else {
                println!("Edit the config file to change settings:");
                println!("  {}", Config::config_path()?.display());
            }
        }
    }

    Ok(())
}

fn require_video_id(url: &str) -> Result<String> {
    extract_video_id(url).ok_or_else(|| ClipscribeError::UnsupportedUrl(url.to_string()).into())
}
