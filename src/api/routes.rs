//! API Routes
//!
//! Configures the Axum router with all gateway endpoints.

use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    clear_handler, health_handler, invalidate_handler, keys_handler, proxy_get_handler,
    proxy_write_handler, reports_handler, stats_handler, AppState,
};
use super::uploads::{
    delete_upload_handler, download_upload_handler, list_uploads_handler, upload_excel_handler,
};

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `GET /api/*path` - Cached backend read
/// - `POST|PUT|PATCH|DELETE /api/*path` - Backend write, invalidates the resource
/// - `GET /reports/*path` - Streamed report export
/// - `POST|GET /uploads/excel` - Upload or list spreadsheets
/// - `GET|DELETE /uploads/excel/:name` - Download or delete a spreadsheet
/// - `GET /cache/stats`, `GET /cache/keys` - Cache diagnostics
/// - `POST /cache/invalidate`, `DELETE /cache` - Cache invalidation
/// - `GET /health` - Health check endpoint
///
/// # Middleware
/// - CORS: Allows any origin
/// - Tracing: Logs all requests
/// - Body limit on uploads: `state.max_upload_bytes`
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route(
            "/api/*path",
            get(proxy_get_handler)
                .post(proxy_write_handler)
                .put(proxy_write_handler)
                .patch(proxy_write_handler)
                .delete(proxy_write_handler),
        )
        .route("/reports/*path", get(reports_handler))
        .route(
            "/uploads/excel",
            post(upload_excel_handler)
                .get(list_uploads_handler)
                .layer(DefaultBodyLimit::max(state.max_upload_bytes)),
        )
        .route(
            "/uploads/excel/:name",
            get(download_upload_handler).delete(delete_upload_handler),
        )
        .route("/cache", delete(clear_handler))
        .route("/cache/stats", get(stats_handler))
        .route("/cache/keys", get(keys_handler))
        .route("/cache/invalidate", post(invalidate_handler))
        .route("/health", get(health_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
