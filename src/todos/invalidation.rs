//! Cache Invalidation
//!
//! Drops the cached todo list whenever the list changes.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use super::{EventHandler, TodoEvent};
use crate::cache::{CacheService, Cancellation};
use crate::error::Result;

/// Cache key holding the full todo list.
pub const TODOS_CACHE_KEY: &str = "todos";

#[derive(Debug)]
pub struct CacheInvalidationHandler {
    cache: Arc<CacheService>,
}

impl CacheInvalidationHandler {
    pub fn new(cache: Arc<CacheService>) -> Self {
        Self { cache }
    }
}

#[async_trait]
impl EventHandler for CacheInvalidationHandler {
    async fn handle(&self, event: &TodoEvent, cancel: &Cancellation) -> Result<()> {
        match event {
            TodoEvent::Created { .. } | TodoEvent::Deleted { .. } => {
                self.cache.remove(TODOS_CACHE_KEY, cancel).await?;
                info!("Invalidated '{}' after {}", TODOS_CACHE_KEY, event.name());
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{CacheSettings, Lookup, MemoryStore};

    #[tokio::test]
    async fn test_events_clear_cached_list() {
        let cache = Arc::new(CacheService::new(
            Arc::new(MemoryStore::new()),
            CacheSettings::default(),
        ));
        let handler = CacheInvalidationHandler::new(cache.clone());
        let cancel = Cancellation::never();

        let events = [
            TodoEvent::Created {
                id: 1,
                title: "t".to_string(),
                description: String::new(),
            },
            TodoEvent::Deleted { id: 1 },
        ];

        for event in events {
            cache
                .get_or_create(TODOS_CACHE_KEY, || async { anyhow::Ok(Some(vec![1u64])) }, None, &cancel)
                .await
                .unwrap();

            handler.handle(&event, &cancel).await.unwrap();

            let after = cache
                .get_or_create(TODOS_CACHE_KEY, || async { anyhow::Ok(Some(vec![2u64])) }, None, &cancel)
                .await
                .unwrap();
            assert_eq!(after, Lookup::Created(vec![2]), "{} must invalidate", event.name());

            cache.remove(TODOS_CACHE_KEY, &cancel).await.unwrap();
        }
    }
}
