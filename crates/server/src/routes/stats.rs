//! `GET /api/stats`: credential-hiding proxy to the stats provider.

use crate::error::ApiError;
use crate::state::AppState;
use axum::Json;
use axum::extract::{Query, State};
use serde::Deserialize;
use showcase_client::fetch::canonicalize;

#[derive(Debug, Default, Deserialize)]
pub struct StatsQuery {
    #[serde(default)]
    pub url: Option<String>,
}

/// Forward the provider's document for `?url=` verbatim.
pub async fn proxy_stats(
    State(state): State<AppState>, Query(query): Query<StatsQuery>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let url = query
        .url
        .as_deref()
        .map(str::trim)
        .filter(|url| !url.is_empty())
        .ok_or(ApiError::MissingUrl)?;
    canonicalize(url).map_err(|e| ApiError::InvalidUrl(e.to_string()))?;

    let provider = state.provider.as_ref().ok_or(ApiError::ApiKeyMissing)?;
    let document = provider.video_stats(url).await.inspect_err(|e| {
        tracing::warn!(source_url = %url, error = %e, "stats provider request failed");
    })?;

    Ok(Json(document))
}
