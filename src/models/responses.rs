//! Response DTOs for the gateway API
//!
//! Defines the structure of outgoing HTTP response bodies.

use serde::Serialize;

use crate::cache::{CacheStats, KeyInfo};
use crate::uploads::StoredFile;

/// Response body for the stats endpoint (GET /cache/stats)
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    #[serde(flatten)]
    pub stats: CacheStats,
    /// (hits + stale_hits) / all lookups
    pub hit_rate: f64,
}

impl StatsResponse {
    /// Creates a new StatsResponse from cache statistics
    pub fn new(stats: CacheStats) -> Self {
        let hit_rate = stats.hit_rate();
        Self { stats, hit_rate }
    }
}

/// Response body for GET /cache/keys
#[derive(Debug, Clone, Serialize)]
pub struct KeysResponse {
    pub total: usize,
    pub keys: Vec<KeyInfo>,
}

impl KeysResponse {
    pub fn new(keys: Vec<KeyInfo>) -> Self {
        Self {
            total: keys.len(),
            keys,
        }
    }
}

/// Response body for POST /cache/invalidate and DELETE /cache
#[derive(Debug, Clone, Serialize)]
pub struct InvalidateResponse {
    /// Success message
    pub message: String,
    /// Number of entries removed
    pub removed: usize,
}

impl InvalidateResponse {
    pub fn new(removed: usize) -> Self {
        Self {
            message: format!("Invalidated {} entries", removed),
            removed,
        }
    }
}

/// Response body for GET /uploads/excel
#[derive(Debug, Clone, Serialize)]
pub struct UploadListResponse {
    pub total: usize,
    pub files: Vec<StoredFile>,
}

impl UploadListResponse {
    pub fn new(files: Vec<StoredFile>) -> Self {
        Self {
            total: files.len(),
            files,
        }
    }
}

/// Response body for DELETE /uploads/excel/:name
#[derive(Debug, Clone, Serialize)]
pub struct DeleteResponse {
    /// Success message
    pub message: String,
    /// The file that was deleted
    pub name: String,
}

impl DeleteResponse {
    /// Creates a new DeleteResponse
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            message: format!("File '{}' deleted successfully", name),
            name,
        }
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Error response body for all error conditions
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Error message describing what went wrong
    pub error: String,
}

impl ErrorResponse {
    /// Creates a new ErrorResponse
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}
