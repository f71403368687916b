//! Background Tasks Module
//!
//! Contains background tasks that run periodically alongside the cache.
//!
//! # Tasks
//! - Stats Report: Logs a JSON snapshot of cache statistics at a fixed interval

mod report;

pub use report::spawn_stats_reporter;
