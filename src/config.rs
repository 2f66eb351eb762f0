//! Configuration Module
//!
//! Handles loading cache and admin server configuration from environment variables.

use std::env;

use crate::cache::{DEFAULT_MAX_SIZE, DEFAULT_TTL_MS};

/// Cache and admin server configuration.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Maximum number of entries before FIFO eviction kicks in
    pub max_size: usize,
    /// Default TTL in milliseconds for entries stored without one
    pub default_ttl_ms: i64,
    /// Admin HTTP server port
    pub server_port: u16,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_MAX_SIZE` - Maximum cache entries (default: 1000)
    /// - `CACHE_DEFAULT_TTL` - Default TTL in milliseconds (default: 300000)
    /// - `SERVER_PORT` - Admin HTTP server port (default: 3000)
    ///
    /// Unset or unparsable values fall back to their defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            max_size: parse_var::<usize>("CACHE_MAX_SIZE")
                .filter(|&size| size > 0)
                .unwrap_or(defaults.max_size),
            default_ttl_ms: parse_var::<i64>("CACHE_DEFAULT_TTL")
                .unwrap_or(defaults.default_ttl_ms),
            server_port: parse_var::<u16>("SERVER_PORT").unwrap_or(defaults.server_port),
        }
    }
}

fn parse_var<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.trim().parse().ok())
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_size: DEFAULT_MAX_SIZE,
            default_ttl_ms: DEFAULT_TTL_MS,
            server_port: 3000,
        }
    }
}
