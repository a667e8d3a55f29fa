//! Backend Client
//!
//! Thin reqwest wrapper that resolves gateway paths against the backend base
//! URL and fetches or forwards requests.

use std::time::Duration;

use axum::http::{
    header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, COOKIE},
    HeaderMap, HeaderName, Method,
};
use bytes::Bytes;
use reqwest::{Client, Url};
use thiserror::Error;
use tracing::debug;

use crate::error::CacheError;

/// Request headers passed through to the backend.
pub const FORWARDED_HEADERS: [HeaderName; 4] = [AUTHORIZATION, COOKIE, CONTENT_TYPE, ACCEPT];

// == Upstream Error ==
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("invalid backend base URL: {0}")]
    InvalidBaseUrl(String),

    #[error("invalid backend path: {0}")]
    InvalidPath(String),

    #[error("backend request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("backend returned {status}")]
    Status {
        status: u16,
        content_type: Option<String>,
        body: Bytes,
    },
}

impl From<UpstreamError> for CacheError {
    fn from(err: UpstreamError) -> Self {
        match err {
            UpstreamError::InvalidBaseUrl(msg) => CacheError::Internal(msg),
            UpstreamError::InvalidPath(path) => {
                CacheError::InvalidRequest(format!("invalid backend path: {path}"))
            }
            UpstreamError::Request(err) if err.is_timeout() => CacheError::Upstream {
                status: 504,
                content_type: None,
                body: Bytes::from(err.to_string()),
            },
            UpstreamError::Request(err) => CacheError::Fetch(err.to_string()),
            UpstreamError::Status {
                status,
                content_type,
                body,
            } => CacheError::Upstream {
                status,
                content_type,
                body,
            },
        }
    }
}

// == Upstream Response ==
/// Buffered backend response; the value type stored in the gateway cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamResponse {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: Bytes,
}

// == Backend Client ==
/// HTTP client bound to one backend base URL.
#[derive(Debug, Clone)]
pub struct BackendClient {
    http: Client,
    base_url: Url,
}

impl BackendClient {
    /// Creates a client for `base_url`.
    ///
    /// The base URL should end with `/`; relative paths are joined onto it.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, UpstreamError> {
        let base_url =
            Url::parse(base_url).map_err(|err| UpstreamError::InvalidBaseUrl(err.to_string()))?;
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // == Endpoint ==
    /// Resolves a gateway path (with optional raw query) under the base URL.
    ///
    /// Paths that would climb out of the base URL are rejected.
    pub fn endpoint(&self, path: &str, query: Option<&str>) -> Result<Url, UpstreamError> {
        check_path(path)?;
        let relative = path.trim_start_matches('/');

        let mut url = self
            .base_url
            .join(relative)
            .map_err(|_| UpstreamError::InvalidPath(path.to_string()))?;
        // Catches absolute URLs and encoded dot segments
        if !url.as_str().starts_with(self.base_url.as_str()) {
            return Err(UpstreamError::InvalidPath(path.to_string()));
        }

        url.set_query(query.filter(|q| !q.is_empty()));
        Ok(url)
    }

    // == Fetch ==
    /// GETs `path` and buffers the body. Non-2xx statuses are errors.
    pub async fn fetch(
        &self,
        path: &str,
        query: Option<&str>,
    ) -> Result<UpstreamResponse, UpstreamError> {
        let url = self.endpoint(path, query)?;
        debug!(%url, "Fetching from backend");

        let response = self
            .http
            .get(url)
            .header(ACCEPT, "application/json")
            .send()
            .await?;

        let status = response.status();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        let body = response.bytes().await?;

        if !status.is_success() {
            return Err(UpstreamError::Status {
                status: status.as_u16(),
                content_type,
                body,
            });
        }

        Ok(UpstreamResponse {
            status: status.as_u16(),
            content_type,
            body,
        })
    }

    // == Forward ==
    /// Sends a request to the backend as is and hands back the raw response.
    ///
    /// Only [`FORWARDED_HEADERS`] are copied from `headers`.
    pub async fn forward(
        &self,
        method: Method,
        path: &str,
        query: Option<&str>,
        headers: &HeaderMap,
        body: Bytes,
    ) -> Result<reqwest::Response, UpstreamError> {
        let url = self.endpoint(path, query)?;
        debug!(%method, %url, "Forwarding to backend");

        let mut request = self.http.request(method, url);
        for name in &FORWARDED_HEADERS {
            for value in headers.get_all(name) {
                request = request.header(name, value);
            }
        }
        if !body.is_empty() {
            request = request.body(body);
        }

        Ok(request.send().await?)
    }
}

/// Rejects decoded paths that would not map onto the backend one to one.
///
/// A `?` or `#` here came from a percent-encoded `%3F` or `%23`; URL joining
/// would read it as a query or fragment delimiter.
pub fn check_path(path: &str) -> Result<(), UpstreamError> {
    let invalid = path.contains(['?', '#'])
        || path
            .trim_start_matches('/')
            .split('/')
            .any(|segment| segment == "..");
    if invalid {
        return Err(UpstreamError::InvalidPath(path.to_string()));
    }
    Ok(())
}
