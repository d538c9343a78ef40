//! Gate Module
//!
//! Single-permit admission control guarding value computation. Either one
//! permit shared by every key, or one permit per key created on demand and
//! dropped again once nobody holds or waits for it.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::sync::{OwnedSemaphorePermit, Semaphore};

use crate::cache::LockMode;

type KeyedSlots = Arc<Mutex<HashMap<String, Arc<Semaphore>>>>;

// == Gate ==
#[derive(Debug)]
pub struct Gate {
    inner: GateInner,
}

#[derive(Debug)]
enum GateInner {
    Global(Arc<Semaphore>),
    PerKey(KeyedSlots),
}

/// Held while computing a value; releases the gate on drop.
#[derive(Debug)]
pub struct GatePermit {
    // Field order matters: the permit must drop before the slot
    _permit: OwnedSemaphorePermit,
    _slot: Option<KeySlot>,
}

/// Reference to a per-key semaphore that unregisters it when last to leave.
#[derive(Debug)]
struct KeySlot {
    key: String,
    semaphore: Arc<Semaphore>,
    slots: KeyedSlots,
}

impl Drop for KeySlot {
    fn drop(&mut self) {
        let mut slots = lock(&self.slots);
        // Map plus this handle; any other holder or waiter keeps its own clone
        if Arc::strong_count(&self.semaphore) == 2 {
            if let Some(current) = slots.get(&self.key) {
                if Arc::ptr_eq(current, &self.semaphore) {
                    slots.remove(&self.key);
                }
            }
        }
    }
}

fn lock(slots: &KeyedSlots) -> MutexGuard<'_, HashMap<String, Arc<Semaphore>>> {
    slots.lock().unwrap_or_else(PoisonError::into_inner)
}

impl Gate {
    pub fn new(mode: LockMode) -> Self {
        let inner = match mode {
            LockMode::Global => GateInner::Global(Arc::new(Semaphore::new(1))),
            LockMode::PerKey => GateInner::PerKey(Arc::new(Mutex::new(HashMap::new()))),
        };
        Self { inner }
    }

    // == Acquire ==
    /// Waits up to `wait` for the permit covering `key`.
    ///
    /// Returns None when the wait elapses.
    pub async fn acquire(&self, key: &str, wait: Duration) -> Option<GatePermit> {
        match &self.inner {
            GateInner::Global(semaphore) => {
                let permit = tokio::time::timeout(wait, semaphore.clone().acquire_owned())
                    .await
                    .ok()?
                    .ok()?;
                Some(GatePermit {
                    _permit: permit,
                    _slot: None,
                })
            }
            GateInner::PerKey(slots) => {
                let slot = {
                    let mut map = lock(slots);
                    let semaphore = map
                        .entry(key.to_string())
                        .or_insert_with(|| Arc::new(Semaphore::new(1)))
                        .clone();
                    KeySlot {
                        key: key.to_string(),
                        semaphore,
                        slots: slots.clone(),
                    }
                };

                let permit = tokio::time::timeout(wait, slot.semaphore.clone().acquire_owned())
                    .await
                    .ok()?
                    .ok()?;
                Some(GatePermit {
                    _permit: permit,
                    _slot: Some(slot),
                })
            }
        }
    }

    // == Tracked Keys ==
    /// Number of per-key semaphores currently registered (0 in global mode).
    pub fn tracked_keys(&self) -> usize {
        match &self.inner {
            GateInner::Global(_) => 0,
            GateInner::PerKey(slots) => lock(slots).len(),
        }
    }
}

impl Default for Gate {
    fn default() -> Self {
        Self::new(LockMode::Global)
    }
}
