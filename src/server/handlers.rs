//! HTTP request handlers

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use super::AppState;
use crate::time::TimeWindow;
use crate::utils::{
    ensure_mp4_extension, extract_video_id, safe_file_name, validate_and_normalize_url, watch_url,
};

const MISSING_PARAMETERS: &str = "Missing required parameters";
const EMPTY_TRANSCRIPT: &str = "No transcript available in this timeframe";
const DEFAULT_CLIP_NAME: &str = "clip.mp4";

/// Failure answered as `{"success": false, "error": ...}`
#[derive(Debug)]
pub struct ApiError(String);

impl ApiError {
    fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

#[derive(Serialize)]
struct ErrorBody {
    success: bool,
    error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        tracing::warn!("Request failed: {}", self.0);
        let body = ErrorBody {
            success: false,
            error: self.0,
        };
        (StatusCode::OK, Json(body)).into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::new(rejection.body_text())
    }
}

type ApiResult<T> = Result<Json<T>, ApiError>;

#[derive(Debug, Default, Deserialize)]
pub struct LoadVideoRequest {
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadVideoResponse {
    pub success: bool,
    pub video_id: String,
    pub title: String,
    pub thumbnail: String,
    pub duration: String,
    pub uploader: String,
    pub filename: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranscriptRequest {
    #[serde(default)]
    pub video_id: Option<String>,
    #[serde(default)]
    pub start_time: Option<String>,
    #[serde(default)]
    pub end_time: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct TranscriptResponse {
    pub success: bool,
    pub transcript: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClipRequest {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub start_time: Option<String>,
    #[serde(default)]
    pub end_time: Option<String>,
    #[serde(default)]
    pub filename: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ClipResponse {
    pub success: bool,
    pub output_path: String,
}

/// A field that is present, not null and not blank
fn required(field: &Option<String>) -> Result<&str, ApiError> {
    field
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .ok_or_else(|| ApiError::new(MISSING_PARAMETERS))
}

/// Run `future` with an upper bound, turning expiry into an API error
async fn bounded<F, T>(limit: Duration, what: &str, future: F) -> Result<T, ApiError>
where
    F: Future<Output = T>,
{
    tokio::time::timeout(limit, future)
        .await
        .map_err(|_| ApiError::new(format!("{} timed out after {}s", what, limit.as_secs())))
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "OK"
}

pub async fn load_video(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<LoadVideoRequest>, JsonRejection>,
) -> ApiResult<LoadVideoResponse> {
    let Json(request) = payload?;
    let url = required(&request.url)?;
    let video_id = extract_video_id(url)
        .ok_or_else(|| ApiError::new(format!("Could not find a YouTube video id in '{}'", url)))?;

    let metadata = bounded(
        state.config.metadata_timeout(),
        "Video info request",
        state.metadata.fetch_metadata(&video_id),
    )
    .await?
    .map_err(|e| ApiError::new(e.to_string()))?;

    Ok(Json(LoadVideoResponse {
        success: true,
        duration: metadata.duration_display(),
        video_id: metadata.video_id,
        title: metadata.title,
        thumbnail: metadata.thumbnail,
        uploader: metadata.uploader,
        filename: metadata.suggested_filename,
    }))
}

pub async fn get_transcript(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<TranscriptRequest>, JsonRejection>,
) -> ApiResult<TranscriptResponse> {
    let Json(request) = payload?;
    let (video_id, start_time, end_time) = (
        required(&request.video_id)?,
        required(&request.start_time)?,
        required(&request.end_time)?,
    );

    let video_id = extract_video_id(video_id).unwrap_or_else(|| video_id.to_string());

    let resolution = bounded(
        state.config.request_timeout(),
        "Transcript request",
        state.resolver.resolve(&video_id, start_time, end_time),
    )
    .await?
    .map_err(|e| ApiError::new(e.to_string()))?;

    let transcript = if resolution.is_empty() {
        EMPTY_TRANSCRIPT.to_string()
    } else {
        resolution.to_lines()
    };

    Ok(Json(TranscriptResponse {
        success: true,
        transcript,
    }))
}

pub async fn extract_clip(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ClipRequest>, JsonRejection>,
) -> ApiResult<ClipResponse> {
    let Json(request) = payload?;
    let (url, start_time, end_time) = (
        required(&request.url)?,
        required(&request.start_time)?,
        required(&request.end_time)?,
    );

    let source_url = match extract_video_id(url) {
        Some(video_id) => watch_url(&video_id),
        None => validate_and_normalize_url(url).map_err(|e| ApiError::new(e.to_string()))?,
    };
    let window = TimeWindow::parse(start_time, end_time).map_err(|e| ApiError::new(e.to_string()))?;

    let filename = request
        .filename
        .as_deref()
        .and_then(safe_file_name)
        .map(|name| ensure_mp4_extension(&name))
        .unwrap_or_else(|| DEFAULT_CLIP_NAME.to_string());

    let directory = &state.config.download.directory;
    tokio::fs::create_dir_all(directory)
        .await
        .map_err(|e| ApiError::new(format!("Could not create {}: {}", directory.display(), e)))?;
    let output_path = directory.join(filename);

    bounded(
        state.config.clip_timeout(),
        "Clip extraction",
        state.clips.extract_clip(&source_url, window, &output_path),
    )
    .await?
    .map_err(|e| ApiError::new(e.to_string()))?;

    tracing::info!("Clip saved to {}", output_path.display());

    Ok(Json(ClipResponse {
        success: true,
        output_path: output_path.display().to_string(),
    }))
}
