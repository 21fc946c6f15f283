//! Memoized resolutions keyed by anchor height

use alloy_primitives::{BlockHash, BlockNumber};
use std::collections::HashMap;
use tokio::sync::Mutex;
use tracing::debug;

use super::ResolvedBlock;
use crate::cache::{CacheStats, LruStore};
use crate::config::CacheCapacity;
use crate::types::chain::BlockId;

#[derive(Debug)]
struct Entries {
    by_height: LruStore<BlockNumber, ResolvedBlock>,
    /// Anchor hash -> anchor height, for every entry in `by_height`
    aliases: HashMap<BlockHash, BlockNumber>,
}

/// Bounded cache of finalized resolutions
///
/// Entries are keyed by normalized anchor height. A lookup by anchor hash
/// goes through an alias index, so a hash reference hits an entry stored by
/// a height reference and vice versa. Callers only insert resolutions of
/// canonical finalized anchor blocks whose derived block is bracketed by a
/// later one, so an entry never needs invalidation.
#[derive(Debug)]
pub struct ResolutionCache {
    entries: Mutex<Entries>,
}

impl ResolutionCache {
    pub fn new(capacity: CacheCapacity) -> Self {
        Self {
            entries: Mutex::new(Entries {
                by_height: LruStore::new(capacity),
                aliases: HashMap::new(),
            }),
        }
    }

    /// Looks up a resolution by anchor height or anchor hash
    pub async fn get(&self, at: &BlockId) -> Option<ResolvedBlock> {
        let mut guard = self.entries.lock().await;
        let entries = &mut *guard;
        let height = match at {
            BlockId::Height(height) => *height,
            BlockId::Hash(hash) => match entries.aliases.get(hash).copied() {
                Some(height) => height,
                None => {
                    entries.by_height.record_miss();
                    return None;
                }
            },
        };
        entries.by_height.get(&height).cloned()
    }

    /// Stores a resolution under its anchor height and anchor hash
    pub async fn insert(&self, resolved: ResolvedBlock) {
        let mut guard = self.entries.lock().await;
        let entries = &mut *guard;
        let anchor_hash = resolved.anchor_hash;
        let anchor_height = resolved.anchor_height;

        let previous = entries
            .by_height
            .peek(&anchor_height)
            .map(|previous| previous.anchor_hash);
        if let Some(stale) = previous.filter(|stale| *stale != anchor_hash) {
            entries.aliases.remove(&stale);
        }

        if let Some((evicted_height, evicted)) = entries.by_height.put(anchor_height, resolved) {
            debug!(
                anchor_height = evicted_height,
                "Evicted least recently used resolution"
            );
            entries.aliases.remove(&evicted.anchor_hash);
        }
        entries.aliases.insert(anchor_hash, anchor_height);
    }

    pub async fn len(&self) -> usize {
        self.entries.lock().await.by_height.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    pub async fn clear(&self) {
        let mut entries = self.entries.lock().await;
        entries.by_height.clear();
        entries.aliases.clear();
    }

    pub async fn stats(&self) -> CacheStats {
        self.entries.lock().await.by_height.stats()
    }
}
