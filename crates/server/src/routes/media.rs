//! `GET /media/*path`: media relay through the caching interceptor.

use crate::error::ApiError;
use crate::state::AppState;
use axum::extract::{Path, RawQuery, State};
use axum::http::header::{self, HeaderName};
use axum::response::{IntoResponse, Response};
use showcase_client::{HttpFetch, HttpRequest, HttpResponse};

/// Response headers passed on to the browser.
const RELAYED_HEADERS: [HeaderName; 4] =
    [header::CONTENT_TYPE, header::ETAG, header::LAST_MODIFIED, header::CACHE_CONTROL];

pub async fn relay(
    State(state): State<AppState>, Path(path): Path<String>, RawQuery(query): RawQuery,
) -> Result<Response, ApiError> {
    let target = media_target(&state.config.media_host, &path, query.as_deref());
    let request = HttpRequest::parse(&target)?;
    let response = state.media_client.fetch(&request).await?;
    Ok(relay_response(response))
}

/// Upstream URL for a relayed path.
fn media_target(host: &str, path: &str, query: Option<&str>) -> String {
    let path = path.trim_start_matches('/');
    match query.filter(|q| !q.is_empty()) {
        Some(query) => format!("https://{host}/{path}?{query}"),
        None => format!("https://{host}/{path}"),
    }
}

fn relay_response(upstream: HttpResponse) -> Response {
    let mut response = (upstream.status, upstream.body).into_response();
    let headers = response.headers_mut();
    headers.remove(header::CONTENT_TYPE);
    for name in RELAYED_HEADERS {
        if let Some(value) = upstream.headers.get(&name) {
            headers.insert(name, value.clone());
        }
    }
    response
}
