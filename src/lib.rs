//! King Cache - An in-process cache for heterogeneous keys and values
//!
//! Stores values of any type under keys of any hashable type, evicts random
//! entries past a count limit, and empties itself on host lifecycle signals.

pub mod cache;
pub mod config;
pub mod error;
pub mod signals;
pub mod tasks;

pub use cache::{CacheStore, KeyBox, KingCache};
pub use config::Config;
pub use signals::{spawn_os_signal_listener, LifecycleSignal, SignalBus};
pub use tasks::spawn_stats_reporter;
