//! Configuration Module
//!
//! Handles loading and managing gateway configuration from environment variables.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Gateway configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port
    pub server_port: u16,
    /// Base URL of the backend service, with trailing slash
    pub backend_url: String,
    /// Default freshness window in milliseconds for cached responses
    pub default_ttl_ms: u64,
    /// Timeout in seconds for a single backend request
    pub upstream_timeout_secs: u64,
    /// Directory where uploaded spreadsheets are stored
    pub uploads_dir: PathBuf,
    /// Largest accepted upload body in bytes
    pub max_upload_bytes: usize,
    /// Interval in seconds between cache size reports
    pub report_interval: u64,
    /// Entry count above which the size reporter warns
    pub size_warn_threshold: usize,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `BACKEND_URL` - Backend base URL (default: http://localhost:8080/api/)
    /// - `DEFAULT_TTL_MS` - Cache freshness window in ms (default: 300000)
    /// - `UPSTREAM_TIMEOUT_SECS` - Backend request timeout (default: 30)
    /// - `UPLOADS_DIR` - Spreadsheet upload directory (default: uploads/excel)
    /// - `MAX_UPLOAD_BYTES` - Upload body limit (default: 10 MiB)
    /// - `REPORT_INTERVAL` - Size report frequency in seconds (default: 60)
    /// - `SIZE_WARN_THRESHOLD` - Warn above this many entries (default: 10000)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            server_port: env_or("SERVER_PORT", defaults.server_port),
            backend_url: env::var("BACKEND_URL")
                .map(normalize_base_url)
                .unwrap_or(defaults.backend_url),
            default_ttl_ms: env_or("DEFAULT_TTL_MS", defaults.default_ttl_ms),
            upstream_timeout_secs: env_or("UPSTREAM_TIMEOUT_SECS", defaults.upstream_timeout_secs),
            uploads_dir: env::var("UPLOADS_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.uploads_dir),
            max_upload_bytes: env_or("MAX_UPLOAD_BYTES", defaults.max_upload_bytes),
            report_interval: env_or("REPORT_INTERVAL", defaults.report_interval),
            size_warn_threshold: env_or("SIZE_WARN_THRESHOLD", defaults.size_warn_threshold),
        }
    }

    pub fn default_ttl(&self) -> Duration {
        Duration::from_millis(self.default_ttl_ms)
    }

    pub fn upstream_timeout(&self) -> Duration {
        Duration::from_secs(self.upstream_timeout_secs)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: 3000,
            backend_url: "http://localhost:8080/api/".to_string(),
            default_ttl_ms: 300_000,
            upstream_timeout_secs: 30,
            uploads_dir: PathBuf::from("uploads/excel"),
            max_upload_bytes: 10 * 1024 * 1024,
            report_interval: 60,
            size_warn_threshold: 10_000,
        }
    }
}

fn env_or<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// Ensures the base URL ends with a slash so relative joins keep its path.
fn normalize_base_url(url: String) -> String {
    if url.ends_with('/') {
        url
    } else {
        format!("{url}/")
    }
}
