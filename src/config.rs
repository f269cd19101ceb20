//! Configuration Module
//!
//! Handles loading and managing server configuration from environment variables.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;

/// Server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Maximum number of cached resources, 0 = unbounded
    pub max_entries: usize,
    /// Bucket count of the cache index, 0 = cache default
    pub index_buckets: usize,
    /// HTTP server port
    pub server_port: u16,
    /// Directory the requested resources are served from
    pub server_root: PathBuf,
    /// Directory holding server-owned pages such as 404.html
    pub server_files: PathBuf,
    /// Age in seconds after which a cached resource is reloaded
    pub stale_after: u64,
    /// Background stale sweep interval in seconds, 0 = disabled
    pub sweep_interval: u64,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `MAX_ENTRIES` - Maximum cached resources (default: 50)
    /// - `INDEX_BUCKETS` - Cache index buckets (default: 0, cache default)
    /// - `SERVER_PORT` - HTTP server port (default: 3490)
    /// - `SERVER_ROOT` - Resource directory (default: ./serverroot)
    /// - `SERVER_FILES` - Server page directory (default: ./serverfiles)
    /// - `STALE_AFTER` - Staleness threshold in seconds (default: 60)
    /// - `SWEEP_INTERVAL` - Stale sweep frequency in seconds (default: 30)
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            max_entries: parse_var("MAX_ENTRIES").unwrap_or(defaults.max_entries),
            index_buckets: parse_var("INDEX_BUCKETS").unwrap_or(defaults.index_buckets),
            server_port: parse_var("SERVER_PORT").unwrap_or(defaults.server_port),
            server_root: env::var("SERVER_ROOT")
                .map(PathBuf::from)
                .unwrap_or(defaults.server_root),
            server_files: env::var("SERVER_FILES")
                .map(PathBuf::from)
                .unwrap_or(defaults.server_files),
            stale_after: parse_var("STALE_AFTER").unwrap_or(defaults.stale_after),
            sweep_interval: parse_var("SWEEP_INTERVAL").unwrap_or(defaults.sweep_interval),
        }
    }
}

fn parse_var<T: FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.parse().ok())
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_entries: 50,
            index_buckets: 0,
            server_port: 3490,
            server_root: PathBuf::from("./serverroot"),
            server_files: PathBuf::from("./serverfiles"),
            stale_after: 60,
            sweep_interval: 30,
        }
    }
}
