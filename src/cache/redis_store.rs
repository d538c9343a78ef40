//! Redis Store Module
//!
//! `DistributedStore` backed by Redis hashes.
//!
//! Each entry is a hash holding the payload and its expiration policy:
//! - `absexp`: absolute deadline in Unix milliseconds, or -1
//! - `sldexp`: sliding window in milliseconds, or -1
//! - `data`: the encoded value
//!
//! The key's own TTL is kept at the sooner of the two windows and pushed
//! forward on every read while a sliding window is set.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::Client;
use tracing::{debug, info};

use crate::cache::entry::current_timestamp_ms;
use crate::cache::options::duration_ms;
use crate::cache::{Cancellation, DistributedStore, ExpirationOptions};
use crate::error::{CacheError, Result};

const ABSOLUTE_FIELD: &str = "absexp";
const SLIDING_FIELD: &str = "sldexp";
const DATA_FIELD: &str = "data";
const NOT_PRESENT: i64 = -1;
// Redis adds PEXPIRE arguments to its own clock and rejects overflow
const MAX_PEXPIRE_MS: i64 = i64::MAX / 2;

// == Redis Store Config ==
/// Configuration for the Redis store.
#[derive(Debug, Clone)]
pub struct RedisStoreConfig {
    /// Redis connection URL (e.g., "redis://127.0.0.1:6379")
    pub url: String,
    /// Prepended verbatim to every key
    pub instance_name: String,
    /// Bound on the initial connection attempt
    pub connection_timeout: Duration,
}

impl Default for RedisStoreConfig {
    fn default() -> Self {
        Self {
            url: "redis://127.0.0.1:6379".to_string(),
            instance_name: "instance".to_string(),
            connection_timeout: Duration::from_secs(5),
        }
    }
}

impl RedisStoreConfig {
    /// Creates a configuration for the given URL.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    /// Sets the key prefix.
    pub fn with_instance_name(mut self, name: impl Into<String>) -> Self {
        self.instance_name = name.into();
        self
    }
}

// == Redis Store ==
#[derive(Clone)]
pub struct RedisStore {
    connection: ConnectionManager,
    config: RedisStoreConfig,
}

impl fmt::Debug for RedisStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedisStore")
            .field("config", &self.config)
            .field("connection", &"<ConnectionManager>")
            .finish()
    }
}

impl RedisStore {
    /// Connects to Redis.
    pub async fn connect(config: RedisStoreConfig) -> Result<Self> {
        let client = Client::open(config.url.as_str())
            .map_err(|e| CacheError::Store(format!("Failed to create Redis client: {}", e)))?;

        let connection = tokio::time::timeout(
            config.connection_timeout,
            ConnectionManager::new(client),
        )
        .await
        .map_err(|_| CacheError::Store(format!("Timed out connecting to {}", config.url)))?
        .map_err(|e| CacheError::Store(format!("Failed to connect to Redis: {}", e)))?;

        info!("Connected to Redis at {}", config.url);
        Ok(Self { connection, config })
    }

    fn prefixed(&self, key: &str) -> String {
        format!("{}{}", self.config.instance_name, key)
    }

    async fn fetch(&self, key: String) -> Result<Option<String>> {
        let mut conn = self.connection.clone();

        let (absexp, sldexp, data): (Option<i64>, Option<i64>, Option<String>) =
            redis::cmd("HMGET")
                .arg(&key)
                .arg(ABSOLUTE_FIELD)
                .arg(SLIDING_FIELD)
                .arg(DATA_FIELD)
                .query_async(&mut conn)
                .await?;

        let Some(data) = data else {
            return Ok(None);
        };

        if let Some(ttl_ms) = refreshed_ttl_ms(absexp, sldexp, current_timestamp_ms()) {
            debug!("Refreshing sliding expiration for {} ({}ms)", key, ttl_ms);
            let _: i64 = redis::cmd("PEXPIRE")
                .arg(&key)
                .arg(ttl_ms)
                .query_async(&mut conn)
                .await?;
        }

        Ok(Some(data))
    }

    async fn store(&self, key: String, value: String, options: ExpirationOptions) -> Result<()> {
        let mut conn = self.connection.clone();
        let now = current_timestamp_ms();

        let absexp = options
            .absolute_ttl
            .map(|ttl| now.saturating_add(duration_ms(ttl)))
            .unwrap_or(NOT_PRESENT);
        let sldexp = options.sliding_ttl.map(duration_ms).unwrap_or(NOT_PRESENT);

        let mut pipe = redis::pipe();
        pipe.atomic()
            .cmd("HSET")
            .arg(&key)
            .arg(ABSOLUTE_FIELD)
            .arg(absexp)
            .arg(SLIDING_FIELD)
            .arg(sldexp)
            .arg(DATA_FIELD)
            .arg(value)
            .ignore();

        match options.initial_ttl() {
            Some(ttl) => {
                pipe.cmd("PEXPIRE")
                    .arg(&key)
                    .arg(expire_ms(ttl))
                    .ignore();
            }
            None => {
                pipe.cmd("PERSIST").arg(&key).ignore();
            }
        }

        let _: () = pipe.query_async(&mut conn).await?;
        Ok(())
    }

    async fn delete(&self, key: String) -> Result<()> {
        let mut conn = self.connection.clone();
        let _: i64 = redis::cmd("DEL").arg(&key).query_async(&mut conn).await?;
        Ok(())
    }
}

/// TTL to apply after a read, or None when the entry has no sliding window.
fn refreshed_ttl_ms(absexp: Option<i64>, sldexp: Option<i64>, now: i64) -> Option<i64> {
    let sliding = sldexp.filter(|ms| *ms != NOT_PRESENT)?;
    let ttl = match absexp.filter(|ms| *ms != NOT_PRESENT) {
        Some(deadline) => sliding.min(deadline.saturating_sub(now)),
        None => sliding,
    };
    Some(ttl.clamp(1, MAX_PEXPIRE_MS))
}

fn expire_ms(ttl: Duration) -> i64 {
    duration_ms(ttl).clamp(1, MAX_PEXPIRE_MS)
}

#[async_trait]
impl DistributedStore for RedisStore {
    async fn get(&self, key: &str, cancel: &Cancellation) -> Result<Option<String>> {
        cancel.run(self.fetch(self.prefixed(key))).await?
    }

    async fn set(
        &self,
        key: &str,
        value: String,
        options: ExpirationOptions,
        cancel: &Cancellation,
    ) -> Result<()> {
        cancel
            .run(self.store(self.prefixed(key), value, options))
            .await?
    }

    async fn remove(&self, key: &str, cancel: &Cancellation) -> Result<()> {
        cancel.run(self.delete(self.prefixed(key))).await?
    }
}
