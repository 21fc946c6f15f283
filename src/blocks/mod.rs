// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Block store backends
//!
//! Decoding a block is expensive, so decoded payloads are kept in a bounded
//! store keyed by block hash:
//!
//! - [`MemoryBlockStore`]: in-memory LRU store with a fixed capacity (default)
//! - [`NoOpBlockStore`]: disables block caching entirely
//!
//! Keys are hashes, so an entry can never go stale: a payload is a pure
//! function of its block.
//!
//! # Examples
//!
//! ```rust,ignore
//! use anchorscan::{BlockPayload, BlockStore, CacheCapacity, MemoryBlockStore};
//!
//! let store = MemoryBlockStore::with_capacity(CacheCapacity::new(1000));
//! store.put(hash, BlockPayload::header(14, Moment::from_millis(5000))).await;
//!
//! assert!(store.get(&hash).await.is_some());
//! ```

use alloy_primitives::BlockHash;
use async_trait::async_trait;

use crate::cache::CacheStats;
use crate::types::chain::BlockPayload;

mod memory;
mod noop;

pub use memory::MemoryBlockStore;
pub use noop::NoOpBlockStore;

/// Trait for block store backends
///
/// # Thread Safety
///
/// Implementations must be thread-safe and support concurrent access. There
/// is no coalescing at this layer: two tasks missing on the same hash may both
/// decode the block and both `put` it; the last writer wins, which is harmless
/// because both payloads are equal.
#[async_trait]
pub trait BlockStore: Send + Sync {
    /// Retrieves the payload stored under `hash`, marking it recently used
    async fn get(&self, hash: &BlockHash) -> Option<BlockPayload>;

    /// Stores `payload` under `hash`, marking it recently used
    ///
    /// Overwrites an existing entry. When inserting a new hash into a full
    /// store, exactly one least recently used entry is evicted first.
    async fn put(&self, hash: BlockHash, payload: BlockPayload);

    /// Evicts least recently used entries until the capacity bound holds
    ///
    /// Returns the number of entries evicted.
    async fn evict_if_needed(&self) -> usize;

    /// Removes every entry
    async fn clear(&self);

    /// Returns current store statistics
    async fn stats(&self) -> CacheStats;

    /// Returns a human-readable name for this backend
    ///
    /// Used for logging and debugging.
    fn name(&self) -> &'static str;
}
