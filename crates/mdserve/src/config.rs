//! Validated, immutable server configuration.
//!
//! [`ServerConfig`] is built once at startup from CLI-supplied values and
//! then shared read-only (behind an `Arc`) with every worker thread — there
//! is no runtime reconfiguration.

use std::fmt;

/// Threads spawned when the configured count is non-positive or absurdly
/// large; mirrors the original server's `-t` fallback.
pub const DEFAULT_THREAD_COUNT: usize = 8;

/// Threads at or above this count are rejected in favor of the default,
/// guarding against a typo'd `-t` flag spawning a thread storm.
const MAX_THREAD_COUNT: usize = 1000;

/// Why a requested configuration could not be built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// The listen port was zero.
    ZeroPort,
    /// The cache capacity was zero.
    ZeroCapacity,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::ZeroPort => write!(f, "port must be greater than 0"),
            ConfigError::ZeroCapacity => write!(f, "cache capacity must be greater than 0"),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Immutable, validated server configuration shared across every connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub port: u16,
    pub cache_capacity: usize,
    pub thread_count: usize,
}

impl ServerConfig {
    /// Builds a [`ServerConfig`] from raw CLI values.
    ///
    /// `requested_threads` of zero or at least [`MAX_THREAD_COUNT`] silently
    /// falls back to [`DEFAULT_THREAD_COUNT`] rather than erroring, matching
    /// the original `-t` flag's behavior. `port` and `cache_capacity` of
    /// zero are hard errors since there is no sensible default for either.
    pub fn new(
        port: u16,
        cache_capacity: usize,
        requested_threads: usize,
    ) -> Result<Self, ConfigError> {
        if port == 0 {
            return Err(ConfigError::ZeroPort);
        }
        if cache_capacity == 0 {
            return Err(ConfigError::ZeroCapacity);
        }

        let thread_count = if requested_threads == 0 || requested_threads >= MAX_THREAD_COUNT {
            DEFAULT_THREAD_COUNT
        } else {
            requested_threads
        };

        Ok(Self {
            port,
            cache_capacity,
            thread_count,
        })
    }
}
