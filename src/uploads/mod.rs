//! Uploads Module
//!
//! Local storage for spreadsheets uploaded through the gateway.

mod storage;

pub use storage::{ExcelStorage, StorageError, StoredFile, ALLOWED_EXTENSIONS};
