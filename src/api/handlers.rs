//! API Handlers
//!
//! Gateway handlers: cached backend reads, pass-through writes and the
//! cache administration endpoints.

use std::sync::Arc;

use axum::{
    body::{Body, Bytes},
    extract::{Path, RawQuery, State},
    http::{
        header::{AUTHORIZATION, CACHE_CONTROL, CONTENT_DISPOSITION, CONTENT_TYPE, COOKIE},
        HeaderMap, HeaderName, HeaderValue, Method, StatusCode,
    },
    response::{IntoResponse, Response},
    Json,
};
use tracing::{debug, info};

use crate::cache::{KeyPattern, LookupStatus, SwrCache};
use crate::config::Config;
use crate::error::{CacheError, Result};
use crate::models::{
    HealthResponse, InvalidateRequest, InvalidateResponse, InvalidateTarget, KeysResponse,
    StatsResponse,
};
use crate::uploads::ExcelStorage;
use crate::upstream::{check_path, BackendClient, UpstreamResponse};

/// Response header telling the client how a cached read was served.
pub const X_CACHE: HeaderName = HeaderName::from_static("x-cache");

/// Backend response headers relayed on pass-through requests.
const RELAYED_HEADERS: [HeaderName; 3] = [CONTENT_TYPE, CONTENT_DISPOSITION, CACHE_CONTROL];

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Cache of anonymous backend GET responses
    pub cache: SwrCache<UpstreamResponse>,
    /// Client for the backend service
    pub backend: BackendClient,
    /// Uploaded spreadsheet storage
    pub uploads: Arc<ExcelStorage>,
    /// Largest accepted upload body in bytes
    pub max_upload_bytes: usize,
}

impl AppState {
    pub fn new(
        cache: SwrCache<UpstreamResponse>,
        backend: BackendClient,
        uploads: ExcelStorage,
        max_upload_bytes: usize,
    ) -> Self {
        Self {
            cache,
            backend,
            uploads: Arc::new(uploads),
            max_upload_bytes,
        }
    }

    /// Creates a new AppState from configuration.
    ///
    /// Creates the upload directory if it does not exist yet.
    pub fn from_config(config: &Config) -> Result<Self> {
        let cache = SwrCache::new(config.default_ttl());
        let backend = BackendClient::new(&config.backend_url, config.upstream_timeout())?;
        let uploads = ExcelStorage::new(&config.uploads_dir).map_err(|err| {
            CacheError::Internal(format!(
                "cannot create upload directory {}: {err}",
                config.uploads_dir.display()
            ))
        })?;
        Ok(Self::new(cache, backend, uploads, config.max_upload_bytes))
    }
}

// == Cached Reads ==
/// Handler for GET /api/*path
///
/// Anonymous reads go through the cache under `/<path>[?query]`. Requests
/// carrying credentials are forwarded uncached since their responses are
/// per-user.
pub async fn proxy_get_handler(
    State(state): State<AppState>,
    Path(path): Path<String>,
    RawQuery(query): RawQuery,
    headers: HeaderMap,
) -> Result<Response> {
    if has_credentials(&headers) {
        debug!(path = %path, "Credentialed read, bypassing cache");
        return pass_through(&state.backend, Method::GET, &path, query, &headers, Bytes::new())
            .await;
    }

    check_path(&path)?;
    let key = cache_key(&path, query.as_deref());
    let backend = state.backend.clone();
    let lookup = state
        .cache
        .lookup(&key, state.cache.default_ttl(), move || async move {
            backend.fetch(&path, query.as_deref()).await
        })
        .await?;

    let (status, response) = lookup.into_parts();
    debug!(key = %key, cache = status.as_str(), "Served cached read");
    Ok(cached_response(status, response))
}

// == Pass-through Writes ==
/// Handler for POST/PUT/PATCH/DELETE /api/*path
///
/// Forwards the request and, when the backend accepts it, drops every cached
/// read of the same resource.
pub async fn proxy_write_handler(
    State(state): State<AppState>,
    method: Method,
    Path(path): Path<String>,
    RawQuery(query): RawQuery,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response> {
    let response = pass_through(&state.backend, method.clone(), &path, query, &headers, body).await?;

    if response.status().is_success() {
        if let Some(segment) = first_segment(&path) {
            let removed = state.cache.invalidate_pattern(&KeyPattern::resource(segment));
            info!(%method, path = %path, segment, removed, "Invalidated cached reads after write");
        }
    }

    Ok(response)
}

/// Handler for GET /reports/*path
///
/// Report exports are streamed straight from the backend, never cached.
pub async fn reports_handler(
    State(state): State<AppState>,
    Path(path): Path<String>,
    RawQuery(query): RawQuery,
    headers: HeaderMap,
) -> Result<Response> {
    let path = format!("reports/{}", path.trim_start_matches('/'));
    pass_through(&state.backend, Method::GET, &path, query, &headers, Bytes::new()).await
}

// == Cache Administration ==
/// Handler for GET /cache/stats
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    Json(StatsResponse::new(state.cache.stats()))
}

/// Handler for GET /cache/keys
pub async fn keys_handler(State(state): State<AppState>) -> Json<KeysResponse> {
    Json(KeysResponse::new(state.cache.keys()))
}

/// Handler for POST /cache/invalidate
///
/// Accepts exactly one of `key`, `pattern` (regex) or `prefix`.
pub async fn invalidate_handler(
    State(state): State<AppState>,
    Json(req): Json<InvalidateRequest>,
) -> Result<Json<InvalidateResponse>> {
    let removed = match req.into_target()? {
        InvalidateTarget::Key(key) => usize::from(state.cache.invalidate(&key)),
        InvalidateTarget::Pattern(pattern) => state.cache.invalidate_pattern(&pattern),
    };

    info!(removed, "Cache invalidated on request");
    Ok(Json(InvalidateResponse::new(removed)))
}

/// Handler for DELETE /cache
pub async fn clear_handler(State(state): State<AppState>) -> Json<InvalidateResponse> {
    let removed = state.cache.size();
    state.cache.clear();

    info!(removed, "Cache cleared");
    Json(InvalidateResponse::new(removed))
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}

// == Helpers ==
/// Cache key for a backend read: `/<path>` plus `?<query>` when present.
pub fn cache_key(path: &str, query: Option<&str>) -> String {
    let path = path.trim_start_matches('/');
    match query.filter(|q| !q.is_empty()) {
        Some(query) => format!("/{path}?{query}"),
        None => format!("/{path}"),
    }
}

/// First non-empty path segment, naming the backend resource.
fn first_segment(path: &str) -> Option<&str> {
    path.split('/').find(|segment| !segment.is_empty())
}

fn has_credentials(headers: &HeaderMap) -> bool {
    headers.contains_key(AUTHORIZATION) || headers.contains_key(COOKIE)
}

fn cached_response(status: LookupStatus, upstream: UpstreamResponse) -> Response {
    let code = StatusCode::from_u16(upstream.status).unwrap_or(StatusCode::OK);
    let mut response = (code, Body::from(upstream.body)).into_response();

    let headers = response.headers_mut();
    if let Some(value) = upstream
        .content_type
        .as_deref()
        .and_then(|value| HeaderValue::from_str(value).ok())
    {
        headers.insert(CONTENT_TYPE, value);
    }
    headers.insert(X_CACHE, HeaderValue::from_static(status.as_str()));

    response
}

async fn pass_through(
    backend: &BackendClient,
    method: Method,
    path: &str,
    query: Option<String>,
    headers: &HeaderMap,
    body: Bytes,
) -> Result<Response> {
    let upstream = backend
        .forward(method, path, query.as_deref(), headers, body)
        .await?;
    Ok(relay(upstream))
}

/// Streams a backend response to the client with its status and a fixed
/// set of headers.
fn relay(upstream: reqwest::Response) -> Response {
    let status = upstream.status();
    let mut headers = HeaderMap::new();
    for name in &RELAYED_HEADERS {
        for value in upstream.headers().get_all(name) {
            headers.append(name.clone(), value.clone());
        }
    }

    let mut response = Body::from_stream(upstream.bytes_stream()).into_response();
    *response.status_mut() = status;
    *response.headers_mut() = headers;
    response
}
