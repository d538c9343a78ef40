//! Cache Module
//!
//! Cache-aside coordination over a distributed text store, with expiration
//! policies, single-flight gating and pluggable encoding.

mod cancel;
mod codec;
mod entry;
mod gate;
mod options;
mod redis_store;
mod service;
mod stats;
mod store;

#[cfg(test)]
pub(crate) mod testing;

// Re-export public types
pub use cancel::{Cancellation, CancellationSource};
pub use codec::{Codec, Decoded, JsonCodec};
pub use entry::CacheEntry;
pub use gate::{Gate, GatePermit};
pub use options::{
    CacheSettings, ExpirationOptions, LockMode, DEFAULT_ABSOLUTE_TTL, DEFAULT_GATE_WAIT,
    DEFAULT_SLIDING_TTL,
};
pub use redis_store::{RedisStore, RedisStoreConfig};
pub use service::{AbsentReason, CacheService, Lookup};
pub use stats::{CacheStats, StatsRecorder};
pub use store::{DistributedStore, MemoryStore};
