//! Background Tasks Module
//!
//! Contains background tasks that run periodically during server operation.
//!
//! # Tasks
//! - Size reporter: logs cache size and warns above a threshold

mod reporter;

pub use reporter::spawn_size_reporter;
