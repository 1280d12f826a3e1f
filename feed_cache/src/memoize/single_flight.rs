use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

type Slots = Arc<Mutex<HashMap<String, Arc<AsyncMutex<()>>>>>;

/// Per-key async mutexes used to collapse concurrent misses on the same key
#[derive(Clone, Default)]
pub(super) struct InFlight {
    slots: Slots,
}

/// Exclusive hold on a key's slot; released (and the slot reclaimed when
/// nobody else is waiting) on drop, including when the owning future is cancelled
pub(super) struct InFlightGuard {
    guard: Option<OwnedMutexGuard<()>>,
    slot: Arc<AsyncMutex<()>>,
    key: String,
    slots: Slots,
}

impl InFlight {
    /// Wait for exclusive access to `key`
    pub(super) async fn acquire(&self, key: &str) -> InFlightGuard {
        let slot = {
            let mut slots = self.slots.lock().unwrap_or_else(|e| e.into_inner());
            slots
                .entry(key.to_string())
                .or_insert_with(|| Arc::new(AsyncMutex::new(())))
                .clone()
        };

        let guard = slot.clone().lock_owned().await;

        InFlightGuard {
            guard: Some(guard),
            slot,
            key: key.to_string(),
            slots: self.slots.clone(),
        }
    }

    #[cfg(test)]
    pub(super) fn len(&self) -> usize {
        self.slots.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        // Release the key first so a waiter can proceed
        self.guard.take();

        let mut slots = self.slots.lock().unwrap_or_else(|e| e.into_inner());
        // One reference in the table plus ours: nobody else is waiting
        if Arc::strong_count(&self.slot) <= 2
            && slots
                .get(&self.key)
                .is_some_and(|s| Arc::ptr_eq(s, &self.slot))
        {
            slots.remove(&self.key);
        }
    }
}
