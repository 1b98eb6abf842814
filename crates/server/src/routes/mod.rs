//! HTTP routes.

pub mod media;
pub mod showcase;
pub mod stats;

use crate::state::AppState;
use axum::Router;
use axum::response::IntoResponse;
use axum::routing::get;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/stats", get(stats::proxy_stats))
        .route("/api/showcase", get(showcase::showcase))
        .route("/media/*path", get(media::relay))
        .with_state(state)
}

/// Health check endpoint
pub async fn health() -> impl IntoResponse {
    "OK"
}
