//! Expiration Options Module
//!
//! Expiration policy attached to every write, plus the coordinator settings.

use std::time::Duration;

use crate::error::{CacheError, Result};

// == Defaults ==
/// Absolute TTL applied when the caller supplies no options.
pub const DEFAULT_ABSOLUTE_TTL: Duration = Duration::from_secs(120);

/// Sliding TTL applied when the caller supplies no options.
pub const DEFAULT_SLIDING_TTL: Duration = Duration::from_secs(30);

/// Upper bound on how long a miss waits for the gate.
pub const DEFAULT_GATE_WAIT: Duration = Duration::from_millis(2000);

/// Milliseconds in `duration`, saturating at `i64::MAX`.
pub(crate) fn duration_ms(duration: Duration) -> i64 {
    i64::try_from(duration.as_millis()).unwrap_or(i64::MAX)
}

// == Expiration Options ==
/// Two independent, optional expiration windows.
///
/// With both set, an entry dies at whichever comes first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpirationOptions {
    /// Entry expires this long after the write, no matter how often it is read
    pub absolute_ttl: Option<Duration>,
    /// Entry expires after this long without a read
    pub sliding_ttl: Option<Duration>,
}

impl ExpirationOptions {
    /// Options that never expire the entry.
    pub const fn never() -> Self {
        Self {
            absolute_ttl: None,
            sliding_ttl: None,
        }
    }

    /// Sets the absolute TTL.
    pub fn with_absolute_ttl(mut self, ttl: Duration) -> Self {
        self.absolute_ttl = Some(ttl);
        self
    }

    /// Sets the sliding TTL.
    pub fn with_sliding_ttl(mut self, ttl: Duration) -> Self {
        self.sliding_ttl = Some(ttl);
        self
    }

    /// Rejects zero-length windows.
    pub fn validate(&self) -> Result<()> {
        if self.absolute_ttl == Some(Duration::ZERO) {
            return Err(CacheError::InvalidExpiration(
                "absolute TTL must be positive".to_string(),
            ));
        }
        if self.sliding_ttl == Some(Duration::ZERO) {
            return Err(CacheError::InvalidExpiration(
                "sliding TTL must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// Shortest window a freshly written entry can live, None if unbounded.
    pub fn initial_ttl(&self) -> Option<Duration> {
        match (self.absolute_ttl, self.sliding_ttl) {
            (Some(a), Some(s)) => Some(a.min(s)),
            (a, s) => a.or(s),
        }
    }
}

impl Default for ExpirationOptions {
    fn default() -> Self {
        Self {
            absolute_ttl: Some(DEFAULT_ABSOLUTE_TTL),
            sliding_ttl: Some(DEFAULT_SLIDING_TTL),
        }
    }
}

// == Lock Mode ==
/// How the single-flight gate is partitioned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LockMode {
    /// One permit shared by every key
    #[default]
    Global,
    /// One permit per key, created on demand
    PerKey,
}

impl LockMode {
    /// Parses `global` or `per-key` (case-insensitive).
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "global" => Some(LockMode::Global),
            "per-key" | "per_key" | "perkey" => Some(LockMode::PerKey),
            _ => None,
        }
    }
}

// == Cache Settings ==
/// Tunables for the cache-aside coordinator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheSettings {
    /// Policy used when `get_or_create` receives no options
    pub default_expiration: ExpirationOptions,
    /// Bounded wait for the gate before giving up
    pub gate_wait: Duration,
    pub lock_mode: LockMode,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            default_expiration: ExpirationOptions::default(),
            gate_wait: DEFAULT_GATE_WAIT,
            lock_mode: LockMode::Global,
        }
    }
}
