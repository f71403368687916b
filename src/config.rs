//! Configuration Module
//!
//! Loads cache and demo host settings from environment variables.

use std::env;
use std::str::FromStr;

use crate::error::{CacheError, Result};

/// Cache configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Maximum number of entries, 0 means unlimited
    pub count_limit: usize,
    /// Seconds between stats reports
    pub stats_interval: u64,
    /// Number of demo entries the binary preloads
    pub seed_entries: usize,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `COUNT_LIMIT` - Maximum cache entries, 0 = unlimited (default: 0)
    /// - `STATS_INTERVAL` - Stats report frequency in seconds (default: 30)
    /// - `SEED_ENTRIES` - Demo entries to preload (default: 0)
    ///
    /// Unset variables fall back to their default; set but unparsable ones
    /// are an error.
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();
        Ok(Self {
            count_limit: env_or("COUNT_LIMIT", defaults.count_limit)?,
            stats_interval: env_or("STATS_INTERVAL", defaults.stats_interval)?,
            seed_entries: env_or("SEED_ENTRIES", defaults.seed_entries)?,
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            count_limit: 0,
            stats_interval: 30,
            seed_entries: 0,
        }
    }
}

fn env_or<T: FromStr>(var: &'static str, default: T) -> Result<T> {
    match env::var(var) {
        Ok(value) => value
            .trim()
            .parse()
            .map_err(|_| CacheError::InvalidConfig { var, value }),
        Err(_) => Ok(default),
    }
}
