//! No-operation block store that disables caching entirely

use alloy_primitives::BlockHash;
use async_trait::async_trait;

use super::BlockStore;
use crate::cache::CacheStats;
use crate::types::chain::BlockPayload;

/// A no-operation block store that disables caching entirely
///
/// Always misses and ignores writes. Every resolution then reads each probed
/// timestamp through the facade.
///
/// # Examples
///
/// ```rust,ignore
/// use anchorscan::{Correlator, NoOpBlockStore};
/// use std::sync::Arc;
///
/// let correlator = Correlator::with_block_store(client, config, Arc::new(NoOpBlockStore));
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpBlockStore;

#[async_trait]
impl BlockStore for NoOpBlockStore {
    async fn get(&self, _hash: &BlockHash) -> Option<BlockPayload> {
        None
    }

    async fn put(&self, _hash: BlockHash, _payload: BlockPayload) {}

    async fn evict_if_needed(&self) -> usize {
        0
    }

    async fn clear(&self) {}

    async fn stats(&self) -> CacheStats {
        CacheStats::default()
    }

    fn name(&self) -> &'static str {
        "NoOpBlockStore"
    }
}
