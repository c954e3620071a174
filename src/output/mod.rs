use anyhow::Result;
use serde::Serialize;
use std::path::Path;

use crate::cli::OutputFormat;
use crate::transcript::{Resolution, Segment};

/// Printed when a transcript exists but nothing overlaps the window
pub const EMPTY_WINDOW_MESSAGE: &str = "No transcript found in this timeframe";

#[derive(Serialize)]
struct JsonReport<'a> {
    video_id: &'a str,
    language: &'a str,
    start_seconds: u64,
    end_seconds: u64,
    segments: &'a [Segment],
}

/// `[MM:SS] text` lines, or the empty-window message
pub fn format_as_text(resolution: &Resolution) -> String {
    if resolution.is_empty() {
        EMPTY_WINDOW_MESSAGE.to_string()
    } else {
        resolution.to_lines()
    }
}

pub fn format_as_json(resolution: &Resolution) -> Result<String> {
    let report = JsonReport {
        video_id: &resolution.video_id,
        language: &resolution.language,
        start_seconds: resolution.window.start_seconds,
        end_seconds: resolution.window.end_seconds,
        segments: &resolution.segments,
    };
    Ok(serde_json::to_string_pretty(&report)?)
}

pub fn render(resolution: &Resolution, format: &OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Text => Ok(format_as_text(resolution)),
        OutputFormat::Json => format_as_json(resolution),
    }
}

/// Save resolved segments to file
pub async fn save_to_file(resolution: &Resolution, path: &Path, format: &OutputFormat) -> Result<()> {
    let content = render(resolution, format)?;
    fs_err::write(path, content)?;
    Ok(())
}

/// Print resolved segments to console
pub fn print_to_console(resolution: &Resolution, format: &OutputFormat) -> Result<()> {
    println!("{}", render(resolution, format)?);
    Ok(())
}
