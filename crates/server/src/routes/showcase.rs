//! `GET /api/showcase`: the catalog merged with cached stats.

use crate::state::AppState;
use axum::Json;
use axum::extract::State;
use serde::Serialize;
use showcase_client::{DisplayStats, StatsOrigin, display_all};

#[derive(Debug, Serialize)]
pub struct ShowcaseResponse {
    pub origin: StatsOrigin,
    pub fetched_at: i64,
    pub examples: Vec<DisplayStats>,
}

pub async fn showcase(State(state): State<AppState>) -> Json<ShowcaseResponse> {
    let examples = &state.config.examples;
    let outcome = state.stats.get_stats(examples).await;

    Json(ShowcaseResponse {
        origin: outcome.origin,
        fetched_at: outcome.fetched_at,
        examples: display_all(examples, &outcome.stats),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use showcase_client::stats::StatOrigin;
    use showcase_core::{AppConfig, CacheDb};
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_merges_fetched_and_fallback_stats() {
        let config = AppConfig::default();
        let fetched_url = config.examples[2].source_url.clone().unwrap();

        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/stats"))
            .and(query_param("url", fetched_url.as_str()))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "success": true,
                "data": { "likes": 10_000, "comments": 60, "shares": 1, "views": 1_500_000, "title": "live" }
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/stats"))
            .respond_with(ResponseTemplate::new(500).set_body_string(r#"{"error":"Failed to fetch stats"}"#))
            .mount(&server)
            .await;

        let config = AppConfig { stats_endpoint: Some(format!("{}/api/stats", server.uri())), ..config };
        let state = AppState::new(config, CacheDb::open_in_memory().await.unwrap()).await.unwrap();

        let Json(first) = showcase(State(state.clone())).await;
        assert_eq!(first.origin, StatsOrigin::Refreshed);
        assert_eq!(first.examples.len(), 4);
        assert_eq!(first.examples[2].origin, Some(StatOrigin::Fetched));
        assert_eq!(first.examples[2].formatted.as_ref().unwrap().views, "1.5M");
        assert_eq!(first.examples[2].title, "live");
        assert_eq!(first.examples[0].origin, Some(StatOrigin::Fallback));
        assert_eq!(first.examples[0].views, Some(465_000));

        let Json(second) = showcase(State(state)).await;
        assert_eq!(second.origin, StatsOrigin::Cached);
        assert_eq!(second.fetched_at, first.fetched_at);
    }
}
