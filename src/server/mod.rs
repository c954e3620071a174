//! JSON API consumed by the clip GUI
//!
//! Every failure is answered with `{"success": false, "error": ...}` and status 200,
//! so the front end only ever has to inspect `success`.

use anyhow::{Context, Result};
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

pub mod handlers;

use crate::config::Config;
use crate::media::{ClipExtractor, VideoMetadataProvider};
use crate::transcript::SegmentResolver;

/// Shared state for all handlers
pub struct AppState {
    pub config: Config,
    pub resolver: SegmentResolver,
    pub metadata: Box<dyn VideoMetadataProvider>,
    pub clips: Box<dyn ClipExtractor>,
}

/// Create the Axum router with all routes
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/api/load_video", post(handlers::load_video))
        .route("/api/get_transcript", post(handlers::get_transcript))
        .route("/api/extract_clip", post(handlers::extract_clip))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind `addr` and serve until the process is stopped
pub async fn serve(state: Arc<AppState>, addr: &str) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    tracing::info!("Listening on http://{}", addr);
    tracing::info!("Download folder: {}", state.config.download.directory.display());

    axum::serve(listener, create_router(state))
        .await
        .context("Server error")?;

    Ok(())
}
