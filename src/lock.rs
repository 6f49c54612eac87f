//! Process-wide mutual exclusion over logical edge identities.
//!
//! Serializes overlapping mutations: a request whose identity set
//! intersects a still-uncommitted earlier request observes a conflict
//! instead of racing it.

use std::sync::Arc;

use parking_lot::Mutex;
use rustc_hash::FxHashSet;

use crate::types::EdgeLockKey;

/// Registry of edge identities with an in-flight mutation.
#[derive(Debug, Default)]
pub struct EdgeLockMap {
    held: Mutex<FxHashSet<EdgeLockKey>>,
}

impl EdgeLockMap {
    /// Creates an empty registry.
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Atomically acquires every key or none of them.
    ///
    /// Requested keys are sorted and deduplicated first, so one request
    /// naming the same edge twice does not conflict with itself. On
    /// failure the first conflicting key is returned and nothing is held.
    pub fn try_lock_all(
        self: &Arc<Self>,
        mut keys: Vec<EdgeLockKey>,
    ) -> Result<EdgeLockGuard, EdgeLockKey> {
        keys.sort_unstable();
        keys.dedup();
        let mut held = self.held.lock();
        for key in &keys {
            if held.contains(key) {
                return Err(key.clone());
            }
        }
        for key in &keys {
            held.insert(key.clone());
        }
        drop(held);
        Ok(EdgeLockGuard {
            map: Arc::clone(self),
            keys,
        })
    }

    /// Whether the key is currently held by some in-flight mutation.
    pub fn is_held(&self, key: &EdgeLockKey) -> bool {
        self.held.lock().contains(key)
    }

    fn release(&self, keys: &[EdgeLockKey]) {
        let mut held = self.held.lock();
        for key in keys {
            held.remove(key);
        }
    }
}

/// Holds a set of edge identity locks; every key is released when the
/// guard drops, on any exit path.
#[derive(Debug)]
pub struct EdgeLockGuard {
    map: Arc<EdgeLockMap>,
    keys: Vec<EdgeLockKey>,
}

impl EdgeLockGuard {
    /// Number of distinct identities held.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Whether the guard holds nothing.
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

impl Drop for EdgeLockGuard {
    fn drop(&mut self) {
        self.map.release(&self.keys);
    }
}
