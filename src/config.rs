//! Configuration Module
//!
//! Handles loading and managing server configuration from environment variables.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use tracing::warn;

use crate::cache::{
    CacheSettings, ExpirationOptions, LockMode, RedisStoreConfig, DEFAULT_ABSOLUTE_TTL,
    DEFAULT_GATE_WAIT, DEFAULT_SLIDING_TTL,
};

/// Server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port
    pub server_port: u16,
    /// Redis URL; the in-memory store is used when unset
    pub redis_url: Option<String>,
    /// Prefix prepended to every Redis key
    pub instance_name: String,
    /// Default absolute TTL in seconds
    pub absolute_ttl: u64,
    /// Default sliding TTL in seconds
    pub sliding_ttl: u64,
    /// Gate wait bound in milliseconds
    pub gate_wait_ms: u64,
    /// Global or per-key single-flight gate
    pub lock_mode: LockMode,
    /// Memory-store cleanup interval in seconds
    pub cleanup_interval: u64,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `REDIS_URL` - Redis connection URL (default: unset, in-memory store)
    /// - `CACHE_INSTANCE_NAME` - Redis key prefix (default: "instance")
    /// - `CACHE_ABSOLUTE_TTL_SECS` - Default absolute TTL (default: 120)
    /// - `CACHE_SLIDING_TTL_SECS` - Default sliding TTL (default: 30)
    /// - `CACHE_GATE_WAIT_MS` - Gate wait bound (default: 2000)
    /// - `CACHE_LOCK_MODE` - `global` or `per-key` (default: global)
    /// - `CLEANUP_INTERVAL` - Memory-store cleanup frequency in seconds (default: 1)
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let lock_mode = match env::var("CACHE_LOCK_MODE") {
            Ok(raw) => LockMode::parse(&raw).unwrap_or_else(|| {
                warn!("Unknown CACHE_LOCK_MODE '{}', using global", raw);
                LockMode::Global
            }),
            Err(_) => defaults.lock_mode,
        };

        Self {
            server_port: parse_var("SERVER_PORT").unwrap_or(defaults.server_port),
            redis_url: env::var("REDIS_URL").ok().filter(|url| !url.trim().is_empty()),
            instance_name: env::var("CACHE_INSTANCE_NAME").unwrap_or(defaults.instance_name),
            absolute_ttl: parse_var("CACHE_ABSOLUTE_TTL_SECS").unwrap_or(defaults.absolute_ttl),
            sliding_ttl: parse_var("CACHE_SLIDING_TTL_SECS").unwrap_or(defaults.sliding_ttl),
            gate_wait_ms: parse_var("CACHE_GATE_WAIT_MS").unwrap_or(defaults.gate_wait_ms),
            lock_mode,
            cleanup_interval: parse_var("CLEANUP_INTERVAL").unwrap_or(defaults.cleanup_interval),
        }
    }

    /// Coordinator settings derived from this configuration.
    ///
    /// A TTL of 0 disables that window.
    pub fn cache_settings(&self) -> CacheSettings {
        let window = |secs: u64| (secs > 0).then(|| Duration::from_secs(secs));

        CacheSettings {
            default_expiration: ExpirationOptions {
                absolute_ttl: window(self.absolute_ttl),
                sliding_ttl: window(self.sliding_ttl),
            },
            gate_wait: Duration::from_millis(self.gate_wait_ms),
            lock_mode: self.lock_mode,
        }
    }

    /// Redis store configuration, if a Redis URL is set.
    pub fn redis_config(&self) -> Option<RedisStoreConfig> {
        self.redis_url.as_ref().map(|url| {
            RedisStoreConfig::new(url.clone()).with_instance_name(self.instance_name.clone())
        })
    }
}

fn parse_var<T: FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.parse().ok())
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: 3000,
            redis_url: None,
            instance_name: "instance".to_string(),
            absolute_ttl: DEFAULT_ABSOLUTE_TTL.as_secs(),
            sliding_ttl: DEFAULT_SLIDING_TTL.as_secs(),
            gate_wait_ms: DEFAULT_GATE_WAIT.as_millis() as u64,
            lock_mode: LockMode::Global,
            cleanup_interval: 1,
        }
    }
}
