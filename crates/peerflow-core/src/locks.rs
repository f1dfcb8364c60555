//! Keyed async locks for per-entity mutual exclusion.
//!
//! The store is internally consistent per call, but workflow sequences
//! span several calls (read, validate, write, conditionally write again).
//! A [`LockMap`] serializes those sequences per record key. Lock order
//! across families is fixed: submission before user, and user locks are
//! never nested.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Arc, Mutex};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

/// Registry of one async mutex per key.
///
/// Entries are tiny and live for the process lifetime; nothing reclaims
/// them, which is acceptable for per-record keys.
#[derive(Debug, Default)]
pub struct LockMap<K> {
    inner: Mutex<HashMap<K, Arc<AsyncMutex<()>>>>,
}

impl<K> LockMap<K>
where
    K: Eq + Hash + Clone,
{
    pub fn new() -> Self {
        LockMap {
            inner: Mutex::new(HashMap::new()),
        }
    }

    /// Take the lock for `key`, waiting if another sequence holds it.
    pub async fn acquire(&self, key: K) -> OwnedMutexGuard<()> {
        let entry = {
            let mut map = self.inner.lock().unwrap();
            map.entry(key)
                .or_insert_with(|| Arc::new(AsyncMutex::new(())))
                .clone()
        };
        entry.lock_owned().await
    }
}
