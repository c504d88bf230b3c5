//! Table Cache Module
//! Read-through cache with one initialization guard per key.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

type Slot<V> = Arc<Mutex<Option<Arc<V>>>>;

/// Memoizes one value per key for the life of the cache.
///
/// The first caller for a key runs the initializer while holding that key's
/// guard, so concurrent callers for the same key wait and then share the
/// result. Failed initializations are not stored.
pub struct SingleFlightCache<K, V> {
    slots: Mutex<HashMap<K, Slot<V>>>,
}

impl<K, V> Default for SingleFlightCache<K, V>
where
    K: Eq + Hash + Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> SingleFlightCache<K, V>
where
    K: Eq + Hash + Clone,
{
    pub fn new() -> Self {
        Self {
            slots: Mutex::new(HashMap::new()),
        }
    }

    /// Return the cached value for `key`, running `init` on first use.
    pub fn get_or_try_init<E, F>(&self, key: &K, init: F) -> Result<Arc<V>, E>
    where
        F: FnOnce() -> Result<V, E>,
    {
        let slot = self.slot(key);
        let mut guard = lock(&slot);
        if let Some(value) = guard.as_ref() {
            return Ok(Arc::clone(value));
        }

        let value = Arc::new(init()?);
        *guard = Some(Arc::clone(&value));
        Ok(value)
    }

    /// The cached value, if the key has been initialized.
    pub fn get(&self, key: &K) -> Option<Arc<V>> {
        let slot = lock(&self.slots).get(key).cloned()?;
        let guard = lock(&slot);
        guard.clone()
    }

    pub fn is_cached(&self, key: &K) -> bool {
        self.get(key).is_some()
    }

    fn slot(&self, key: &K) -> Slot<V> {
        let mut slots = lock(&self.slots);
        Arc::clone(slots.entry(key.clone()).or_default())
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
