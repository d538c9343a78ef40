//! Expiration Cleanup Task
//!
//! Background task that periodically purges expired entries from the
//! in-memory store. Reads already ignore expired entries; this only keeps
//! abandoned keys from accumulating.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::MemoryStore;

/// Spawns a background task that periodically purges expired entries.
///
/// The task runs until aborted, sleeping for `cleanup_interval_secs`
/// between passes.
///
/// # Example
/// ```ignore
/// let store = Arc::new(MemoryStore::new());
/// let cleanup_handle = spawn_cleanup_task(store.clone(), 1);
/// // Later, during shutdown:
/// cleanup_handle.abort();
/// ```
pub fn spawn_cleanup_task(store: Arc<MemoryStore>, cleanup_interval_secs: u64) -> JoinHandle<()> {
    let interval = Duration::from_secs(cleanup_interval_secs.max(1));

    tokio::spawn(async move {
        info!(
            "Starting expiration cleanup task with interval of {} seconds",
            interval.as_secs()
        );

        loop {
            tokio::time::sleep(interval).await;

            let removed = store.cleanup_expired().await;

            if removed > 0 {
                info!("Expiration cleanup: removed {} expired entries", removed);
            } else {
                debug!("Expiration cleanup: no expired entries found");
            }
        }
    })
}
