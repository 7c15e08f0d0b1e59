//! Bounded object cache with insertion-order eviction.
//!
//! Used to avoid refetching resources already seen. Eviction removes the
//! entry that was *inserted* first; reading an entry never refreshes it,
//! so this is not an LRU.

use std::collections::HashMap;
use std::hash::Hash;

/// Default number of entries kept by [`ObjectCache`].
pub const DEFAULT_CAPACITY: usize = 50;

#[derive(Debug, Clone)]
struct CacheEntry<V> {
    object: V,
    inserted_at: u64,
}

/// Cache keyed by resource id holding at most `capacity` objects.
#[derive(Debug, Clone)]
pub struct ObjectCache<K, V> {
    entries: HashMap<K, CacheEntry<V>>,
    capacity: usize,
    // Monotonic insertion stamp; ties are impossible.
    clock: u64,
}

impl<K, V> Default for ObjectCache<K, V>
where
    K: Eq + Hash + Clone,
{
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl<K, V> ObjectCache<K, V>
where
    K: Eq + Hash + Clone,
{
    /// Creates an empty cache. A capacity of 0 is treated as 1.
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: HashMap::new(),
            capacity: capacity.max(1),
            clock: 0,
        }
    }

    /// Stores `value` under `key`.
    ///
    /// Inserting a new key into a full cache first evicts the single
    /// oldest-inserted entry, which is returned. Overwriting an existing key
    /// re-stamps it and evicts nothing.
    pub fn set(&mut self, key: K, value: V) -> Option<V> {
        let mut evicted = None;
        if !self.entries.contains_key(&key) && self.entries.len() >= self.capacity {
            evicted = self.evict_oldest();
        }
        self.clock += 1;
        self.entries.insert(
            key,
            CacheEntry {
                object: value,
                inserted_at: self.clock,
            },
        );
        evicted
    }

    pub fn get(&self, key: &K) -> Option<&V> {
        self.entries.get(key).map(|entry| &entry.object)
    }

    pub fn has(&self, key: &K) -> bool {
        self.entries.contains_key(key)
    }

    /// Removes and returns the entry for `key`.
    pub fn drop(&mut self, key: &K) -> Option<V> {
        self.entries.remove(key).map(|entry| entry.object)
    }

    pub fn size(&self) -> usize {
        self.entries.len()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn reset(&mut self) {
        self.entries.clear();
    }

    fn evict_oldest(&mut self) -> Option<V> {
        let oldest = self
            .entries
            .iter()
            .min_by_key(|(_, entry)| entry.inserted_at)
            .map(|(key, _)| key.clone())?;
        tracing::trace!("Evicting oldest cache entry");
        self.drop(&oldest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_get_has_drop() {
        let mut cache = ObjectCache::new(3);
        assert_eq!(cache.set("a", 1), None);
        assert!(cache.has(&"a"));
        assert_eq!(cache.get(&"a"), Some(&1));
        assert_eq!(cache.drop(&"a"), Some(1));
        assert!(!cache.has(&"a"));
        assert_eq!(cache.drop(&"a"), None);
        assert_eq!(cache.size(), 0);
    }

    #[test]
    fn test_evicts_oldest_inserted_not_least_recently_used() {
        let mut cache = ObjectCache::new(3);
        cache.set("a", 1);
        cache.set("b", 2);
        cache.set("c", 3);

        // Reading "a" must not protect it.
        assert_eq!(cache.get(&"a"), Some(&1));

        assert_eq!(cache.set("d", 4), Some(1));
        assert!(!cache.has(&"a"));
        assert_eq!(cache.size(), 3);
        assert_eq!(cache.set("e", 5), Some(2));
    }

    #[test]
    fn test_default_capacity_sequence() {
        let mut cache = ObjectCache::default();
        for i in 0..DEFAULT_CAPACITY {
            assert_eq!(cache.set(i, i), None);
        }
        // Every further insert evicts exactly the oldest surviving entry.
        for i in DEFAULT_CAPACITY..DEFAULT_CAPACITY * 3 {
            assert_eq!(cache.set(i, i), Some(i - DEFAULT_CAPACITY));
            assert_eq!(cache.size(), DEFAULT_CAPACITY);
        }
    }

    #[test]
    fn test_overwrite_restamps_without_eviction() {
        let mut cache = ObjectCache::new(2);
        cache.set("a", 1);
        cache.set("b", 2);
        assert_eq!(cache.set("a", 10), None);
        assert_eq!(cache.size(), 2);
        // "b" is now the oldest insertion.
        assert_eq!(cache.set("c", 3), Some(2));
        assert_eq!(cache.get(&"a"), Some(&10));
    }

    #[test]
    fn test_reset() {
        let mut cache = ObjectCache::new(2);
        cache.set("a", 1);
        cache.reset();
        assert_eq!(cache.size(), 0);
        assert_eq!(cache.set("b", 2), None);
    }
}
