//! Cache Statistics Module
//!
//! Counts what the cache-aside coordinator does: hits, misses, factory
//! calls, gate timeouts, misses rescued by the post-gate re-read and
//! discarded undecodable entries.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

// == Cache Stats ==
/// Point-in-time snapshot of coordinator counters.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CacheStats {
    /// Lookups answered from the store
    pub hits: u64,
    /// Lookups that found nothing usable on the fast path
    pub misses: u64,
    /// Misses answered by the re-read after acquiring the gate
    pub recheck_hits: u64,
    /// Times the value factory ran
    pub factory_calls: u64,
    /// Misses that gave up waiting for the gate
    pub gate_timeouts: u64,
    /// Stored blobs discarded because they did not decode
    pub decode_failures: u64,
}

impl CacheStats {
    // == Hit Rate ==
    /// Calculates the cache hit rate.
    ///
    /// Returns hits / (hits + misses), or 0.0 if no lookups have been made.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

// == Stats Recorder ==
/// Lock-free counters shared by concurrent lookups.
#[derive(Debug, Default)]
pub struct StatsRecorder {
    hits: AtomicU64,
    misses: AtomicU64,
    recheck_hits: AtomicU64,
    factory_calls: AtomicU64,
    gate_timeouts: AtomicU64,
    decode_failures: AtomicU64,
}

impl StatsRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_recheck_hit(&self) {
        self.recheck_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_factory_call(&self) {
        self.factory_calls.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_gate_timeout(&self) {
        self.gate_timeouts.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_decode_failure(&self) {
        self.decode_failures.fetch_add(1, Ordering::Relaxed);
    }

    // == Snapshot ==
    pub fn snapshot(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            recheck_hits: self.recheck_hits.load(Ordering::Relaxed),
            factory_calls: self.factory_calls.load(Ordering::Relaxed),
            gate_timeouts: self.gate_timeouts.load(Ordering::Relaxed),
            decode_failures: self.decode_failures.load(Ordering::Relaxed),
        }
    }
}
