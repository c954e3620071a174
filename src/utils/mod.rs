use anyhow::Result;
use url::Url;

const VIDEO_ID_LEN: usize = 11;

/// Validate a URL and return normalized version
pub fn validate_and_normalize_url(url: &str) -> Result<String> {
    let parsed = Url::parse(url)
        .map_err(|_| anyhow::anyhow!("Invalid URL format: {}", url))?;

    if !matches!(parsed.scheme(), "http" | "https") {
        anyhow::bail!("URL must use HTTP or HTTPS protocol");
    }

    Ok(parsed.to_string())
}

fn is_video_id(candidate: &str) -> bool {
    candidate.len() == VIDEO_ID_LEN
        && candidate
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// Extract the video id from a bare id or any common YouTube URL form
pub fn extract_video_id(input: &str) -> Option<String> {
    let input = input.trim();
    if is_video_id(input) {
        return Some(input.to_string());
    }

    let parsed = Url::parse(input)
        .or_else(|_| Url::parse(&format!("https://{}", input)))
        .ok()?;
    let host = parsed.host_str()?.to_lowercase();
    let host = host.strip_prefix("www.").unwrap_or(&host);
    let host = host.strip_prefix("m.").unwrap_or(host);

    let candidate = match host {
        "youtu.be" => parsed.path_segments()?.next().map(str::to_string),
        "youtube.com" | "music.youtube.com" => {
            let mut segments = parsed.path_segments()?;
            match segments.next() {
                Some("watch") => parsed
                    .query_pairs()
                    .find(|(key, _)| key == "v")
                    .map(|(_, value)| value.into_owned()),
                Some("embed") | Some("shorts") | Some("v") | Some("live") => {
                    segments.next().map(str::to_string)
                }
                _ => None,
            }
        }
        _ => None,
    }?;

    is_video_id(&candidate).then_some(candidate)
}

/// Canonical watch URL for a video id
pub fn watch_url(video_id: &str) -> String {
    format!("https://www.youtube.com/watch?v={}", video_id)
}

/// Format file size in human-readable format
pub fn format_file_size(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
    const THRESHOLD: f64 = 1024.0;

    if bytes == 0 {
        return "0 B".to_string();
    }

    let bytes_f = bytes as f64;
    let unit_index = (bytes_f.log10() / THRESHOLD.log10()).floor() as usize;
    let unit_index = unit_index.min(UNITS.len() - 1);

    let size = bytes_f / THRESHOLD.powi(unit_index as i32);

    if unit_index == 0 {
        format!("{} {}", bytes, UNITS[unit_index])
    } else {
        format!("{:.1} {}", size, UNITS[unit_index])
    }
}

/// Format duration in human-readable format
pub fn format_duration(seconds: f64) -> String {
    let total_seconds = seconds as u64;
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let secs = total_seconds % 60;

    if hours > 0 {
        format!("{}h {}m {}s", hours, minutes, secs)
    } else if minutes > 0 {
        format!("{}m {}s", minutes, secs)
    } else {
        format!("{}s", secs)
    }
}

/// Keep alphanumerics, spaces, hyphens and underscores; cut to 50 characters
pub fn sanitize_title(title: &str) -> String {
    title
        .chars()
        .filter(|c| c.is_alphanumeric() || matches!(c, ' ' | '-' | '_'))
        .take(50)
        .collect()
}

/// Suggested clip file name for a video title
pub fn suggested_clip_filename(title: &str) -> String {
    ensure_mp4_extension(&sanitize_title(title))
}

/// Append `.mp4` unless the name already ends with it
pub fn ensure_mp4_extension(filename: &str) -> String {
    if filename.ends_with(".mp4") {
        filename.to_string()
    } else {
        format!("{}.mp4", filename)
    }
}

/// Reduce a user supplied file name to its final path component
pub fn safe_file_name(filename: &str) -> Option<String> {
    let name = std::path::Path::new(filename.trim())
        .file_name()?
        .to_string_lossy()
        .to_string();
    (!name.is_empty() && name != "." && name != "..").then_some(name)
}

/// Generate a unique clip filename with timestamp
pub fn generate_unique_filename(video_id: &str) -> String {
    let timestamp = chrono::Utc::now().format("%Y%m%d_%H%M%S");
    let random_suffix = uuid::Uuid::new_v4().to_string()[..8].to_string();

    format!("clip_{}_{}_{}.mp4", sanitize_title(video_id), timestamp, random_suffix)
}

/// Check if the current environment has required tools
pub async fn check_dependencies(yt_dlp_path: &str) -> Vec<String> {
    let mut missing = Vec::new();

    if !check_command_available(yt_dlp_path).await {
        missing.push("yt-dlp - required for captions, video info and clip extraction".to_string());
    }

    // ffmpeg is needed by yt-dlp to cut sections
    if !check_command_available("ffmpeg").await {
        missing.push("ffmpeg - required by yt-dlp to cut clip sections".to_string());
    }

    missing
}

/// Check if a command is available in PATH
pub async fn check_command_available(command: &str) -> bool {
    use tokio::process::Command;

    Command::new(command)
        .arg("--version")
        .output()
        .await
        .map(|output| output.status.success())
        .unwrap_or(false)
}
