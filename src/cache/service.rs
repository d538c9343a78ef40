//! Cache Service Module
//!
//! Cache-aside coordinator: serve fresh entries straight from the store,
//! otherwise compute the value once behind the gate and write it back.
//!
//! Lookup flow:
//! 1. Fast read. A decodable value is returned without touching the gate.
//! 2. Miss: wait (bounded) for the gate. Timeout yields `GateTimeout`.
//! 3. Gate held: read again, another caller may have filled the entry.
//! 4. Still missing: run the factory once, encode, write, return.
//!
//! The gate permit is scoped to the call, so every exit path releases it.

use std::future::Future;
use std::sync::Arc;

use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, warn};

use crate::cache::{
    CacheSettings, CacheStats, Cancellation, Codec, Decoded, DistributedStore,
    ExpirationOptions, Gate, JsonCodec, StatsRecorder,
};
use crate::error::{CacheError, Result};

// == Lookup Outcome ==
/// Non-error result of `get_or_create`.
#[derive(Debug, Clone, PartialEq)]
pub enum Lookup<T> {
    /// Served from the store
    Hit(T),
    /// Computed by the factory and written to the store
    Created(T),
    /// No value to return
    Absent(AbsentReason),
}

/// Why `get_or_create` returned no value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AbsentReason {
    /// The factory produced nothing; nothing was cached
    FactoryAbsent,
    /// The gate was not obtained within the configured wait
    GateTimeout,
}

impl<T> Lookup<T> {
    /// Returns the value if there is one.
    pub fn into_value(self) -> Option<T> {
        match self {
            Lookup::Hit(value) | Lookup::Created(value) => Some(value),
            Lookup::Absent(_) => None,
        }
    }

    pub fn is_hit(&self) -> bool {
        matches!(self, Lookup::Hit(_))
    }
}

// == Cache Service ==
/// Cache-aside coordinator over a `DistributedStore`.
#[derive(Debug)]
pub struct CacheService<C = JsonCodec> {
    store: Arc<dyn DistributedStore>,
    codec: C,
    gate: Gate,
    settings: CacheSettings,
    stats: StatsRecorder,
}

impl CacheService<JsonCodec> {
    /// Creates a JSON-encoding coordinator.
    pub fn new(store: Arc<dyn DistributedStore>, settings: CacheSettings) -> Self {
        Self::with_codec(store, JsonCodec, settings)
    }
}

impl<C: Codec> CacheService<C> {
    pub fn with_codec(store: Arc<dyn DistributedStore>, codec: C, settings: CacheSettings) -> Self {
        Self {
            store,
            codec,
            gate: Gate::new(settings.lock_mode),
            settings,
            stats: StatsRecorder::new(),
        }
    }

    pub fn stats(&self) -> CacheStats {
        self.stats.snapshot()
    }

    // == Get Or Create ==
    /// Returns the cached value for `key`, computing and caching it on a miss.
    ///
    /// `options` overrides the configured default expiration for the write.
    /// Factory, encode and store-write failures propagate; decode failures
    /// and store-read failures count as misses.
    pub async fn get_or_create<T, F, Fut>(
        &self,
        key: &str,
        factory: F,
        options: Option<ExpirationOptions>,
        cancel: &Cancellation,
    ) -> Result<Lookup<T>>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = anyhow::Result<Option<T>>>,
    {
        validate_key(key)?;
        if let Some(options) = &options {
            options.validate()?;
        }

        if let Some(value) = self.read::<T>(key, cancel).await? {
            debug!("Cache hit for {}", key);
            self.stats.record_hit();
            return Ok(Lookup::Hit(value));
        }
        self.stats.record_miss();

        let acquired = cancel
            .run(self.gate.acquire(key, self.settings.gate_wait))
            .await?;
        let Some(_permit) = acquired else {
            warn!(
                "Gate not acquired for {} within {:?}, returning no value",
                key, self.settings.gate_wait
            );
            self.stats.record_gate_timeout();
            return Ok(Lookup::Absent(AbsentReason::GateTimeout));
        };

        if let Some(value) = self.read::<T>(key, cancel).await? {
            debug!("Cache filled for {} while waiting on the gate", key);
            self.stats.record_recheck_hit();
            return Ok(Lookup::Hit(value));
        }

        debug!("Computing value for {}", key);
        self.stats.record_factory_call();
        let produced = cancel.run(factory()).await?.map_err(CacheError::Factory)?;
        let Some(value) = produced else {
            debug!("Factory produced no value for {}, nothing cached", key);
            return Ok(Lookup::Absent(AbsentReason::FactoryAbsent));
        };

        let payload = self.codec.encode(&value)?;
        let expiration = options.unwrap_or(self.settings.default_expiration);
        self.store.set(key, payload, expiration, cancel).await?;

        Ok(Lookup::Created(value))
    }

    // == Remove ==
    /// Deletes the entry for `key`. Absent keys are not an error.
    pub async fn remove(&self, key: &str, cancel: &Cancellation) -> Result<()> {
        validate_key(key)?;
        self.store.remove(key, cancel).await?;
        debug!("Removed cache entry {}", key);
        Ok(())
    }

    /// Reads and decodes `key`; anything unusable is a miss.
    async fn read<T: DeserializeOwned>(&self, key: &str, cancel: &Cancellation) -> Result<Option<T>> {
        let raw = match self.store.get(key, cancel).await {
            Ok(raw) => raw,
            Err(CacheError::Cancelled) => return Err(CacheError::Cancelled),
            Err(err) => {
                warn!("Cache read for {} failed, treating as miss: {}", key, err);
                return Ok(None);
            }
        };

        let Some(raw) = raw.filter(|text| !text.trim().is_empty()) else {
            return Ok(None);
        };

        match self.codec.decode::<T>(&raw) {
            Decoded::Value(value) => Ok(Some(value)),
            Decoded::Null => Ok(None),
            Decoded::Malformed(reason) => {
                warn!("Discarding undecodable entry for {}: {}", key, reason);
                self.stats.record_decode_failure();
                Ok(None)
            }
        }
    }
}

fn validate_key(key: &str) -> Result<()> {
    if key.is_empty() {
        return Err(CacheError::InvalidKey("key cannot be empty".to_string()));
    }
    Ok(())
}
