// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Bounded least-recently-used store with statistics

use lru::LruCache;
use std::fmt;
use std::hash::Hash;

use super::CacheStats;
use crate::config::CacheCapacity;

/// Bounded map evicting the least recently used entry first
///
/// Both [`get`](Self::get) and [`put`](Self::put) mark an entry as most
/// recently used. The number of entries never exceeds the capacity fixed at
/// construction: inserting a new key into a full store evicts exactly one
/// entry first.
///
/// This type is not synchronized. Callers wrap it in a mutex and keep the
/// critical section to the map operation itself.
///
/// # Performance
///
/// - Get: O(1) average case
/// - Put: O(1) average case, including eviction
pub struct LruStore<K: Hash + Eq, V> {
    entries: LruCache<K, V>,
    hits: u64,
    misses: u64,
    evictions: u64,
}

impl<K: Hash + Eq, V> LruStore<K, V> {
    /// Creates an empty store holding at most `capacity` entries
    pub fn new(capacity: CacheCapacity) -> Self {
        Self {
            entries: LruCache::new(capacity.as_non_zero()),
            hits: 0,
            misses: 0,
            evictions: 0,
        }
    }

    /// Returns the value for `key` and promotes it to most recently used
    pub fn get(&mut self, key: &K) -> Option<&V> {
        match self.entries.get(key) {
            Some(value) => {
                self.hits += 1;
                Some(value)
            }
            None => {
                self.misses += 1;
                None
            }
        }
    }

    /// Counts a lookup that was answered without consulting the map
    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    /// Returns the value for `key` without promoting it or counting a lookup
    pub fn peek(&self, key: &K) -> Option<&V> {
        self.entries.peek(key)
    }

    pub fn contains(&self, key: &K) -> bool {
        self.entries.contains(key)
    }

    /// Inserts or overwrites `key`, promoting it to most recently used
    ///
    /// Returns the entry evicted to make room, if any. Overwriting an
    /// existing key never evicts.
    pub fn put(&mut self, key: K, value: V) -> Option<(K, V)> {
        let evicted = if self.entries.contains(&key) {
            None
        } else {
            self.make_room()
        };
        self.entries.put(key, value);
        evicted
    }

    /// Evicts least recently used entries until the bound holds
    ///
    /// Returns the number of entries evicted. The bound is maintained by
    /// [`put`](Self::put), so this only does work after the capacity was
    /// lowered with [`resize`](Self::resize).
    pub fn evict_if_needed(&mut self) -> usize {
        let capacity = self.entries.cap().get();
        let mut evicted = 0;
        while self.entries.len() > capacity {
            if self.entries.pop_lru().is_none() {
                break;
            }
            evicted += 1;
        }
        self.evictions += evicted as u64;
        evicted
    }

    /// Changes the capacity, evicting least recently used entries if needed
    pub fn resize(&mut self, capacity: CacheCapacity) -> usize {
        let before = self.entries.len();
        self.entries.resize(capacity.as_non_zero());
        let evicted = before.saturating_sub(self.entries.len());
        self.evictions += evicted as u64;
        evicted
    }

    /// Removes `key`, returning its value
    pub fn remove(&mut self, key: &K) -> Option<V> {
        self.entries.pop(key)
    }

    /// Removes every entry, keeping the hit/miss/eviction counters
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.entries.cap().get()
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits,
            misses: self.misses,
            evictions: self.evictions,
            entries: self.entries.len(),
            capacity: self.capacity(),
        }
    }

    fn make_room(&mut self) -> Option<(K, V)> {
        if self.entries.len() < self.capacity() {
            return None;
        }
        let evicted = self.entries.pop_lru();
        if evicted.is_some() {
            self.evictions += 1;
        }
        evicted
    }
}

impl<K: Hash + Eq, V> fmt::Debug for LruStore<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LruStore")
            .field("len", &self.entries.len())
            .field("capacity", &self.capacity())
            .field("hits", &self.hits)
            .field("misses", &self.misses)
            .field("evictions", &self.evictions)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn store(capacity: usize) -> LruStore<u64, &'static str> {
        LruStore::new(CacheCapacity::new(capacity))
    }

    #[test]
    fn test_get_counts_hits_and_misses() {
        let mut store = store(2);
        assert!(store.get(&1).is_none());
        store.put(1, "one");
        assert_eq!(store.get(&1), Some(&"one"));

        let stats = store.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.entries, 1);
        assert_eq!(stats.capacity, 2);
    }

    #[test]
    fn test_put_evicts_least_recently_used() {
        let mut store = store(3);
        store.put(1, "a");
        store.put(2, "b");
        store.put(3, "c");

        // Touch 1 so 2 becomes the eviction candidate
        assert!(store.get(&1).is_some());

        let evicted = store.put(4, "d");
        assert_eq!(evicted, Some((2, "b")));
        assert_eq!(store.len(), 3);
        assert!(store.contains(&1));
        assert!(!store.contains(&2));
        assert_eq!(store.stats().evictions, 1);
    }

    #[test]
    fn test_put_existing_key_overwrites_and_promotes() {
        let mut store = store(2);
        store.put(1, "a");
        store.put(2, "b");

        // Overwrite 1 at capacity: no eviction, 1 becomes most recent
        assert_eq!(store.put(1, "a2"), None);
        assert_eq!(store.peek(&1), Some(&"a2"));

        assert_eq!(store.put(3, "c"), Some((2, "b")));
        assert!(store.contains(&1));
    }

    #[test]
    fn test_peek_does_not_promote() {
        let mut store = store(2);
        store.put(1, "a");
        store.put(2, "b");
        assert_eq!(store.peek(&1), Some(&"a"));

        assert_eq!(store.put(3, "c"), Some((1, "a")));
        assert_eq!(store.stats().hits, 0);
    }

    #[test]
    fn test_resize_then_evict_if_needed() {
        let mut store = store(4);
        for key in 0..4 {
            store.put(key, "v");
        }
        assert_eq!(store.evict_if_needed(), 0);

        assert_eq!(store.resize(CacheCapacity::new(2)), 2);
        assert_eq!(store.len(), 2);
        assert!(store.contains(&2));
        assert!(store.contains(&3));
        assert_eq!(store.stats().evictions, 2);
    }

    #[test]
    fn test_clear_keeps_counters() {
        let mut store = store(2);
        store.put(1, "a");
        store.get(&1);
        store.clear();

        assert!(store.is_empty());
        assert_eq!(store.stats().hits, 1);
        assert!(store.remove(&1).is_none());
    }

    proptest! {
        #[test]
        fn prop_size_never_exceeds_capacity(
            capacity in 1usize..16,
            ops in prop::collection::vec((any::<bool>(), 0u64..32), 0..200),
        ) {
            let mut store: LruStore<u64, u64> = LruStore::new(CacheCapacity::new(capacity));
            for (is_put, key) in ops {
                if is_put {
                    store.put(key, key);
                } else {
                    store.get(&key);
                }
                prop_assert!(store.len() <= capacity);
            }
        }

        #[test]
        fn prop_most_recent_entry_survives_insert(
            capacity in 1usize..8,
            keys in prop::collection::vec(0u64..64, 1..64),
        ) {
            let mut store: LruStore<u64, u64> = LruStore::new(CacheCapacity::new(capacity));
            for key in &keys {
                store.put(*key, *key);
            }
            let last = *keys.last().unwrap();
            prop_assert!(store.contains(&last));
        }
    }
}
