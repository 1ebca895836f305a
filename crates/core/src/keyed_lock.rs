//! Per-key async mutual exclusion.
//!
//! [`KeyedLocks`] hands out one [`tokio::sync::Mutex`] per active key. Slots
//! are reference counted: a slot is removed as soon as the last guard for
//! its key is dropped and no other task is waiting on it, so the map only
//! ever holds keys that are in use.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Arc, Mutex};

use tokio::sync::OwnedMutexGuard;

type Slot = Arc<tokio::sync::Mutex<()>>;

/// Arena of per-key async locks.
pub struct KeyedLocks<K> {
    slots: Mutex<HashMap<K, Slot>>,
}

/// Holds the lock for one key until dropped.
pub struct KeyedGuard<'a, K: Eq + Hash> {
    owner: &'a KeyedLocks<K>,
    key: Option<K>,
    guard: Option<OwnedMutexGuard<()>>,
}

impl<K: Eq + Hash + Clone> KeyedLocks<K> {
    pub fn new() -> Self {
        Self {
            slots: Mutex::new(HashMap::new()),
        }
    }

    /// Wait for exclusive access to `key`.
    pub async fn lock(&self, key: K) -> KeyedGuard<'_, K> {
        let slot = {
            let mut slots = self.slots.lock().unwrap_or_else(|e| e.into_inner());
            Arc::clone(slots.entry(key.clone()).or_default())
        };
        // Built before waiting: if the wait is abandoned, dropping it still
        // runs the slot cleanup once the pending acquire has released its Arc.
        let mut keyed = KeyedGuard {
            owner: self,
            key: Some(key),
            guard: None,
        };
        keyed.guard = Some(slot.lock_owned().await);
        keyed
    }

    /// Number of keys currently locked or awaited.
    pub fn active_keys(&self) -> usize {
        self.slots.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}

impl<K: Eq + Hash + Clone> Default for KeyedLocks<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Eq + Hash> Drop for KeyedGuard<'_, K> {
    fn drop(&mut self) {
        // Release the mutex first so its Arc no longer counts as a holder.
        drop(self.guard.take());

        let Some(key) = self.key.take() else {
            return;
        };
        let mut slots = self.owner.slots.lock().unwrap_or_else(|e| e.into_inner());
        // Only the map's own reference left: nobody holds or awaits the key.
        if slots.get(&key).is_some_and(|slot| Arc::strong_count(slot) == 1) {
            slots.remove(&key);
        }
    }
}
