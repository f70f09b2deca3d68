//! HTTP surface
//!
//! A single catch-all route keys the request path into the fetcher. Two
//! literal paths bypass the cache entirely: `/robots.txt` (we do not want
//! crawlers indexing someone's Dropbox folder) and `/` (redirects to the
//! project repository). Responses are compressed by tower-http.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{
        header::{CONTENT_TYPE, ETAG, IF_NONE_MATCH, LAST_MODIFIED, LOCATION},
        HeaderMap, HeaderValue, StatusCode, Uri,
    },
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use chrono::{DateTime, Utc};
use tower_http::compression::CompressionLayer;
use tracing::error;

use crate::cache::CacheEntry;
use crate::fetch::Fetcher;

/// Fixed disallow-all robots policy
const ROBOTS_BODY: &str = "User-agent: *\nDisallow: /\n";

/// Where the root path redirects to
const REPO_URL: &str = "https://github.com/dropfront/dropfront";

#[derive(Clone)]
pub struct AppState {
    pub fetcher: Arc<Fetcher>,
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/robots.txt", get(robots_txt))
        .route("/", get(root_redirect))
        .fallback(serve_path)
        .with_state(state)
        .layer(CompressionLayer::new())
}

async fn robots_txt() -> Response {
    (
        StatusCode::OK,
        [(CONTENT_TYPE, HeaderValue::from_static("text/plain; charset=utf-8"))],
        ROBOTS_BODY,
    )
        .into_response()
}

async fn root_redirect() -> Response {
    (
        StatusCode::FOUND,
        [(LOCATION, HeaderValue::from_static(REPO_URL))],
    )
        .into_response()
}

/// Catch-all: every other path is a key into the monitored folder.
///
/// The URI path arrives percent-encoded; the cache and the remote store both
/// key on the decoded form, so `/my%20file.txt` resolves `my file.txt`.
async fn serve_path(State(state): State<AppState>, uri: Uri, headers: HeaderMap) -> Response {
    let path = match urlencoding::decode(uri.path()) {
        Ok(decoded) => decoded.into_owned(),
        // Decoded bytes that are not UTF-8 cannot name a Dropbox path;
        // the raw form falls through to an ordinary not-found.
        Err(_) => uri.path().to_string(),
    };
    match state.fetcher.resolve(&path).await {
        Ok(entry) => entry_response(&entry, &headers),
        Err(err) => {
            error!(path = %path, error = %err, "Retrieval failed");
            (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()).into_response()
        }
    }
}

/// Translate a cache entry into an HTTP response.
///
/// Negative entries become an empty 404. Positive entries carry
/// `Content-Type`, `ETag` (the raw revision token) and `Last-Modified`; a
/// matching `If-None-Match` yields an empty 304 instead of the body.
fn entry_response(entry: &CacheEntry, request_headers: &HeaderMap) -> Response {
    if !entry.exists {
        return StatusCode::NOT_FOUND.into_response();
    }

    let mut headers = HeaderMap::new();
    headers.insert(
        CONTENT_TYPE,
        HeaderValue::from_str(&entry.content_type)
            .unwrap_or_else(|_| HeaderValue::from_static("application/octet-stream")),
    );
    if let Ok(value) = HeaderValue::from_str(&entry.rev) {
        headers.insert(ETAG, value);
    }
    if let Ok(value) = HeaderValue::from_str(&http_date(&entry.modified)) {
        headers.insert(LAST_MODIFIED, value);
    }

    let client_rev = request_headers
        .get(IF_NONE_MATCH)
        .and_then(|v| v.to_str().ok());
    if client_rev == Some(entry.rev.as_str()) {
        return (StatusCode::NOT_MODIFIED, headers).into_response();
    }

    (StatusCode::OK, headers, Body::from(entry.body.clone())).into_response()
}

/// Format a timestamp per the HTTP date convention (RFC 7231)
fn http_date(at: &DateTime<Utc>) -> String {
    at.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}
