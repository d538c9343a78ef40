//! Cache Store Module
//!
//! The `DistributedStore` contract and its in-process implementation.

use std::collections::HashMap;
use std::fmt::Debug;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::cache::entry::current_timestamp_ms;
use crate::cache::{CacheEntry, Cancellation, ExpirationOptions};
use crate::error::{CacheError, Result};

// == Distributed Store Trait ==
/// Opaque text key/value store with expiration support.
///
/// Every operation observes `cancel` and fails with `CacheError::Cancelled`
/// once it fires.
#[async_trait]
pub trait DistributedStore: Send + Sync + Debug {
    /// Returns the stored text, or None if absent or expired.
    async fn get(&self, key: &str, cancel: &Cancellation) -> Result<Option<String>>;

    /// Stores `value` under `key`, replacing any previous entry.
    async fn set(
        &self,
        key: &str,
        value: String,
        options: ExpirationOptions,
        cancel: &Cancellation,
    ) -> Result<()>;

    /// Deletes `key`. Absent keys are not an error.
    async fn remove(&self, key: &str, cancel: &Cancellation) -> Result<()>;
}

// == Memory Store ==
/// In-process store with absolute and sliding expiration.
///
/// Expired entries are dropped lazily on read and in bulk by
/// `cleanup_expired`.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, CacheEntry>>,
}

impl MemoryStore {
    // == Constructor ==
    pub fn new() -> Self {
        Self::default()
    }

    // == Cleanup Expired ==
    /// Removes all expired entries from the store.
    ///
    /// Returns the number of entries removed.
    pub async fn cleanup_expired(&self) -> usize {
        let now = current_timestamp_ms();
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired_at(now));
        before - entries.len()
    }

    // == Length ==
    /// Returns the number of live entries.
    pub async fn len(&self) -> usize {
        let now = current_timestamp_ms();
        self.entries
            .read()
            .await
            .values()
            .filter(|entry| !entry.is_expired_at(now))
            .count()
    }

    // == Is Empty ==
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl DistributedStore for MemoryStore {
    async fn get(&self, key: &str, cancel: &Cancellation) -> Result<Option<String>> {
        if cancel.is_cancelled() {
            return Err(CacheError::Cancelled);
        }

        let now = current_timestamp_ms();
        // Write lock: a hit restarts the sliding window
        let mut entries = self.entries.write().await;

        match entries.get_mut(key) {
            None => return Ok(None),
            Some(entry) if !entry.is_expired_at(now) => {
                entry.touch_at(now);
                return Ok(Some(entry.value.clone()));
            }
            Some(_) => {}
        }

        entries.remove(key);
        Ok(None)
    }

    async fn set(
        &self,
        key: &str,
        value: String,
        options: ExpirationOptions,
        cancel: &Cancellation,
    ) -> Result<()> {
        if cancel.is_cancelled() {
            return Err(CacheError::Cancelled);
        }

        let entry = CacheEntry::new(value, &options);
        self.entries.write().await.insert(key.to_string(), entry);
        Ok(())
    }

    async fn remove(&self, key: &str, cancel: &Cancellation) -> Result<()> {
        if cancel.is_cancelled() {
            return Err(CacheError::Cancelled);
        }

        self.entries.write().await.remove(key);
        Ok(())
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::CancellationSource;
    use std::time::Duration;

    fn never() -> Cancellation {
        Cancellation::never()
    }

    #[tokio::test]
    async fn test_store_new() {
        let store = MemoryStore::new();
        assert_eq!(store.len().await, 0);
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_store_set_and_get() {
        let store = MemoryStore::new();

        store
            .set("key1", "value1".to_string(), ExpirationOptions::default(), &never())
            .await
            .unwrap();

        let value = store.get("key1", &never()).await.unwrap();
        assert_eq!(value.as_deref(), Some("value1"));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_store_get_nonexistent() {
        let store = MemoryStore::new();
        assert!(store.get("nonexistent", &never()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_store_overwrite() {
        let store = MemoryStore::new();
        let options = ExpirationOptions::never();

        store.set("key1", "value1".to_string(), options, &never()).await.unwrap();
        store.set("key1", "value2".to_string(), options, &never()).await.unwrap();

        let value = store.get("key1", &never()).await.unwrap();
        assert_eq!(value.as_deref(), Some("value2"));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_store_remove_is_idempotent() {
        let store = MemoryStore::new();

        store
            .set("key1", "value1".to_string(), ExpirationOptions::never(), &never())
            .await
            .unwrap();

        store.remove("key1", &never()).await.unwrap();
        store.remove("key1", &never()).await.unwrap();
        store.remove("never-existed", &never()).await.unwrap();

        assert!(store.is_empty().await);
        assert!(store.get("key1", &never()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_store_absolute_expiration() {
        let store = MemoryStore::new();
        let options = ExpirationOptions::never().with_absolute_ttl(Duration::from_millis(100));

        store.set("key1", "value1".to_string(), options, &never()).await.unwrap();
        assert!(store.get("key1", &never()).await.unwrap().is_some());

        tokio::time::sleep(Duration::from_millis(150)).await;
        assert!(store.get("key1", &never()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_store_sliding_expiration_refreshed_by_reads() {
        let store = MemoryStore::new();
        let options = ExpirationOptions::never().with_sliding_ttl(Duration::from_millis(200));

        store.set("key1", "value1".to_string(), options, &never()).await.unwrap();

        // Each read lands inside the window and pushes it forward
        for _ in 0..4 {
            tokio::time::sleep(Duration::from_millis(100)).await;
            assert!(store.get("key1", &never()).await.unwrap().is_some());
        }

        tokio::time::sleep(Duration::from_millis(300)).await;
        assert!(store.get("key1", &never()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_store_cleanup_expired() {
        let store = MemoryStore::new();
        let short = ExpirationOptions::never().with_absolute_ttl(Duration::from_millis(50));
        let long = ExpirationOptions::never().with_absolute_ttl(Duration::from_secs(10));

        store.set("key1", "value1".to_string(), short, &never()).await.unwrap();
        store.set("key2", "value2".to_string(), long, &never()).await.unwrap();

        tokio::time::sleep(Duration::from_millis(100)).await;

        let removed = store.cleanup_expired().await;
        assert_eq!(removed, 1);
        assert_eq!(store.len().await, 1);
        assert!(store.get("key2", &never()).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_store_observes_cancellation() {
        let store = MemoryStore::new();
        let source = CancellationSource::new();
        source.cancel();
        let cancel = source.token();

        assert!(matches!(
            store.get("key1", &cancel).await,
            Err(CacheError::Cancelled)
        ));
        assert!(matches!(
            store
                .set("key1", "v".to_string(), ExpirationOptions::never(), &cancel)
                .await,
            Err(CacheError::Cancelled)
        ));
        assert!(matches!(
            store.remove("key1", &cancel).await,
            Err(CacheError::Cancelled)
        ));
        assert!(store.is_empty().await);
    }
}
