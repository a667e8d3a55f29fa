//! Storefront Cache - API gateway for the storefront frontend
//!
//! Serves backend reads through a stale-while-revalidate cache with
//! single-flight fetches, forwards writes and invalidates what they touch.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod tasks;
pub mod uploads;
pub mod upstream;

pub use api::{create_router, AppState};
pub use cache::{Lookup, LookupStatus, SwrCache};
pub use config::Config;
pub use error::{CacheError, Result};
pub use tasks::spawn_size_reporter;
