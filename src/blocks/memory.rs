// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! In-memory block store with a fixed capacity

use alloy_primitives::BlockHash;
use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::debug;

use super::BlockStore;
use crate::cache::{CacheStats, LruStore};
use crate::config::constants::DEFAULT_BLOCK_STORE_CAPACITY;
use crate::config::CacheCapacity;
use crate::types::chain::BlockPayload;

/// In-memory LRU store of decoded block payloads
///
/// The capacity is fixed at construction. The lock is held only for the map
/// operation; payloads are cloned out, so callers never hold references into
/// the store.
///
/// # Performance
///
/// - Get: O(1) average case
/// - Put: O(1) average case, including eviction
#[derive(Debug)]
pub struct MemoryBlockStore {
    entries: Mutex<LruStore<BlockHash, BlockPayload>>,
}

impl MemoryBlockStore {
    /// Creates an empty store with the default capacity
    pub fn new() -> Self {
        Self::with_capacity(CacheCapacity::new(DEFAULT_BLOCK_STORE_CAPACITY))
    }

    /// Creates an empty store holding at most `capacity` payloads
    pub fn with_capacity(capacity: CacheCapacity) -> Self {
        Self {
            entries: Mutex::new(LruStore::new(capacity)),
        }
    }

    /// Whether `hash` is stored, without marking it recently used
    pub async fn contains(&self, hash: &BlockHash) -> bool {
        self.entries.lock().await.contains(hash)
    }
}

impl Default for MemoryBlockStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BlockStore for MemoryBlockStore {
    async fn get(&self, hash: &BlockHash) -> Option<BlockPayload> {
        let payload = self.entries.lock().await.get(hash).cloned();
        if payload.is_some() {
            debug!(hash = %hash, "Block store hit");
        }
        payload
    }

    async fn put(&self, hash: BlockHash, payload: BlockPayload) {
        let evicted = self.entries.lock().await.put(hash, payload);
        if let Some((evicted_hash, evicted_payload)) = evicted {
            debug!(
                hash = %evicted_hash,
                height = evicted_payload.height,
                "Evicted least recently used block"
            );
        }
    }

    async fn evict_if_needed(&self) -> usize {
        self.entries.lock().await.evict_if_needed()
    }

    async fn clear(&self) {
        let mut entries = self.entries.lock().await;
        debug!(entries = entries.len(), "Clearing block store");
        entries.clear();
    }

    async fn stats(&self) -> CacheStats {
        self.entries.lock().await.stats()
    }

    fn name(&self) -> &'static str {
        "MemoryBlockStore"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::chain::Moment;
    use std::sync::Arc;

    fn hash(n: u8) -> BlockHash {
        BlockHash::repeat_byte(n)
    }

    fn payload(height: u64) -> BlockPayload {
        BlockPayload::header(height, Moment::from_millis(height * 6000))
    }

    #[tokio::test]
    async fn test_memory_store_basic_operations() {
        let store = MemoryBlockStore::with_capacity(CacheCapacity::new(4));

        assert!(store.get(&hash(1)).await.is_none());

        store.put(hash(1), payload(1)).await;
        assert_eq!(store.get(&hash(1)).await, Some(payload(1)));

        let stats = store.stats().await;
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.entries, 1);
        assert_eq!(stats.capacity, 4);
    }

    #[tokio::test]
    async fn test_capacity_two_evicts_oldest() {
        let store = MemoryBlockStore::with_capacity(CacheCapacity::new(2));
        store.put(hash(1), payload(1)).await;
        store.put(hash(2), payload(2)).await;
        store.put(hash(3), payload(3)).await;

        assert!(!store.contains(&hash(1)).await);
        assert!(store.contains(&hash(2)).await);
        assert!(store.contains(&hash(3)).await);
        assert_eq!(store.stats().await.evictions, 1);
    }

    #[tokio::test]
    async fn test_get_protects_from_eviction() {
        let store = MemoryBlockStore::with_capacity(CacheCapacity::new(3));
        for n in 1..=3 {
            store.put(hash(n), payload(n as u64)).await;
        }

        // Reading the oldest entry makes the second-oldest the LRU
        assert!(store.get(&hash(1)).await.is_some());
        store.put(hash(4), payload(4)).await;

        assert!(store.contains(&hash(1)).await);
        assert!(!store.contains(&hash(2)).await);
        assert!(store.contains(&hash(3)).await);
        assert!(store.contains(&hash(4)).await);
    }

    #[tokio::test]
    async fn test_overwrite_promotes_without_eviction() {
        let store = MemoryBlockStore::with_capacity(CacheCapacity::new(2));
        store.put(hash(1), payload(1)).await;
        store.put(hash(2), payload(2)).await;

        let replacement = payload(1).with_body(vec![0xde, 0xad]);
        store.put(hash(1), replacement.clone()).await;
        assert_eq!(store.stats().await.evictions, 0);

        store.put(hash(3), payload(3)).await;
        assert_eq!(store.get(&hash(1)).await, Some(replacement));
        assert!(!store.contains(&hash(2)).await);
    }

    #[tokio::test]
    async fn test_clear_and_evict_if_needed() {
        let store = MemoryBlockStore::with_capacity(CacheCapacity::new(8));
        for n in 1..=5 {
            store.put(hash(n), payload(n as u64)).await;
        }
        assert_eq!(store.evict_if_needed().await, 0);

        store.clear().await;
        assert_eq!(store.stats().await.entries, 0);
        for n in 1..=5 {
            assert!(store.get(&hash(n)).await.is_none());
        }
    }

    #[tokio::test]
    async fn test_concurrent_puts_stay_bounded() {
        let store = Arc::new(MemoryBlockStore::with_capacity(CacheCapacity::new(16)));

        let mut handles = Vec::new();
        for n in 0..64u8 {
            let store = Arc::clone(&store);
            handles.push(tokio::spawn(async move {
                store.put(hash(n), payload(n as u64)).await;
                store.get(&hash(n)).await;
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        let stats = store.stats().await;
        assert_eq!(stats.entries, 16);
        assert_eq!(stats.evictions, 48);
    }
}
