//! API Module
//!
//! HTTP handlers and routing for the storefront gateway.
//!
//! # Endpoints
//! - `/api/*path` - Backend reads (cached) and writes (pass-through)
//! - `/reports/*path` - Report exports
//! - `/uploads/excel` - Spreadsheet uploads
//! - `/cache/*` - Cache diagnostics and invalidation
//! - `/health` - Health check endpoint

pub mod handlers;
pub mod routes;
pub mod uploads;

pub use handlers::*;
pub use routes::create_router;
pub use uploads::*;
