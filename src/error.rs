//! Error types for the cache
//!
//! Cache reads and writes never fail; errors only come from configuration and
//! OS signal installation.

use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for the crate.
#[derive(Error, Debug)]
pub enum CacheError {
    /// An environment variable was set but could not be parsed
    #[error("Invalid value for {var}: {value:?}")]
    InvalidConfig { var: &'static str, value: String },

    /// OS signal handlers could not be installed
    #[error("Failed to install signal handler: {0}")]
    SignalInstall(#[from] std::io::Error),
}

// == Result Type Alias ==
/// Convenience Result type for the crate.
pub type Result<T> = std::result::Result<T, CacheError>;
