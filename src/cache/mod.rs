//! Cache Module
//!
//! Provides an in-process cache for heterogeneous keys and values with a count
//! limit and random eviction.

mod common_key;
mod entry;
mod handle;
mod key;
mod stats;
mod store;

#[cfg(test)]
mod property_tests;

// Re-export public types
pub use common_key::{CommonKey, FloatKey};
pub use entry::CacheEntry;
pub use handle::KingCache;
pub use key::{ErasedKey, KeyBox};
pub use stats::CacheStats;
pub use store::CacheStore;
