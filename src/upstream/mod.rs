//! Upstream Module
//!
//! HTTP client for the backend service that owns all business logic.

mod client;

pub use client::{check_path, BackendClient, UpstreamError, UpstreamResponse, FORWARDED_HEADERS};
