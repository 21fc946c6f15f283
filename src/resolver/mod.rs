// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Cross-chain block resolution
//!
//! Given a block on the anchor chain, find the block on the derived chain
//! that represents the derived chain's state as of the anchor block's
//! timestamp: the latest derived block whose timestamp is at or before it.
//!
//! The only shared clock is the on-chain timestamp both chains expose, and
//! it never decreases, so the derived block is found by binary search over
//! derived heights.
//!
//! # Caching
//!
//! - Finalized anchor references are memoized in a [`ResolutionCache`]; a
//!   repeated resolution makes no facade calls at all.
//! - Non-finalized anchor references, fork blocks that are not canonical at
//!   their height, and anchors later than the derived best block are always
//!   recomputed, since what they point to can still change.
//! - Every derived block touched by the search is kept in the shared
//!   [`BlockStore`], so later searches over nearby heights skip the storage
//!   read.
//! - Concurrent resolutions of the same reference share one search.
//!
//! # Examples
//!
//! ```rust,ignore
//! use anchorscan::{BlockReference, ChainId, CrossChainResolver, CorrelatorConfig, MemoryBlockStore};
//! use std::sync::Arc;
//!
//! let config = CorrelatorConfig::asset_hub_polkadot();
//! let resolver = CrossChainResolver::new(client, Arc::new(MemoryBlockStore::new()), &config);
//!
//! let reference = BlockReference::height(ChainId::new("polkadot"), 20_000_000);
//! let resolved = resolver.resolve(&reference).await?;
//! println!("Asset Hub block {} ({})", resolved.derived_height, resolved.derived_timestamp);
//! ```

use alloy_primitives::{BlockHash, BlockNumber};
use async_trait::async_trait;
use futures::future::try_join;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn, Instrument, Span};

use crate::blocks::BlockStore;
use crate::cache::{CacheStats, Coalescer};
use crate::client::ChainClient;
use crate::config::constants::TIMESTAMP_NOW;
use crate::config::CorrelatorConfig;
use crate::errors::{ResolveError, ResolveStep};
use crate::tracing::spans;
use crate::types::chain::{BlockId, BlockPayload, BlockReference, ChainId, Moment};

mod cache;
mod search;

pub use cache::ResolutionCache;

use search::{find_last_at_or_before, ProbedBlock, TimestampSource};

/// An anchor block and the derived block correlated with it
///
/// `derived_timestamp <= anchor_timestamp`, and no derived block observed at
/// resolution time has a later timestamp that still satisfies this.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedBlock {
    pub anchor_hash: BlockHash,
    pub anchor_height: BlockNumber,
    pub anchor_timestamp: Moment,
    pub derived_hash: BlockHash,
    pub derived_height: BlockNumber,
    pub derived_timestamp: Moment,
}

struct ResolverInner<C> {
    client: C,
    store: Arc<dyn BlockStore>,
    cache: ResolutionCache,
    anchor: ChainId,
    derived: ChainId,
    anchor_finalizes: bool,
}

/// Correlates anchor-chain references with derived-chain blocks
pub struct CrossChainResolver<C> {
    inner: Arc<ResolverInner<C>>,
    in_flight: Coalescer<BlockId, ResolvedBlock, ResolveError>,
}

impl<C: ChainClient + 'static> CrossChainResolver<C> {
    /// Creates a resolver with an empty resolution cache
    ///
    /// `store` may be shared with other collaborators caching decoded blocks.
    pub fn new(client: C, store: Arc<dyn BlockStore>, config: &CorrelatorConfig) -> Self {
        Self {
            inner: Arc::new(ResolverInner {
                client,
                store,
                cache: ResolutionCache::new(config.resolution_cache_capacity),
                anchor: config.anchor_chain.clone(),
                derived: config.derived_chain.clone(),
                anchor_finalizes: config.anchor_finalizes,
            }),
            in_flight: Coalescer::new(),
        }
    }

    /// Resolves `reference` to its correlated derived block
    ///
    /// # Errors
    ///
    /// - [`ResolveError::UnexpectedChain`] if `reference` is not on the anchor chain
    /// - [`ResolveError::ReferenceNotFound`] if the anchor block does not exist
    /// - [`ResolveError::CorrelationImpossible`] if the derived chain has no
    ///   block at or before the anchor timestamp
    /// - [`ResolveError::CorrelationInvariantViolated`] if derived timestamps
    ///   are observed to decrease
    /// - [`ResolveError::FacadeTimeout`] / [`ResolveError::FacadeUnavailable`]
    ///   if a facade call fails; nothing is cached and a retry may succeed
    pub async fn resolve(&self, reference: &BlockReference) -> Result<ResolvedBlock, ResolveError> {
        let span = spans::resolve_anchor_reference(reference);
        async move {
            if reference.chain() != &self.inner.anchor {
                return Err(ResolveError::UnexpectedChain {
                    reference: reference.clone(),
                    anchor: self.inner.anchor.clone(),
                });
            }

            if let Some(resolved) = self.inner.cache.get(&reference.at()).await {
                debug!(
                    derived_height = resolved.derived_height,
                    "Resolution cache hit"
                );
                return Ok(resolved);
            }

            let inner = Arc::clone(&self.inner);
            let owned = reference.clone();
            self.in_flight
                .run(reference.at(), move || {
                    let span = spans::compute_resolution(&owned);
                    async move { inner.compute(&owned).await }.instrument(span)
                })
                .await
        }
        .instrument(span)
        .await
    }

    /// Statistics of the resolution cache
    pub async fn cache_stats(&self) -> CacheStats {
        self.inner.cache.stats().await
    }

    pub fn anchor_chain(&self) -> &ChainId {
        &self.inner.anchor
    }

    pub fn derived_chain(&self) -> &ChainId {
        &self.inner.derived
    }

    pub fn client(&self) -> &C {
        &self.inner.client
    }

    pub fn block_store(&self) -> &Arc<dyn BlockStore> {
        &self.inner.store
    }
}

impl<C> std::fmt::Debug for CrossChainResolver<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CrossChainResolver")
            .field("anchor", &self.inner.anchor)
            .field("derived", &self.inner.derived)
            .field("block_store", &self.inner.store.name())
            .field("in_flight", &self.in_flight)
            .finish()
    }
}

impl<C: ChainClient> ResolverInner<C> {
    async fn compute(&self, reference: &BlockReference) -> Result<ResolvedBlock, ResolveError> {
        // A previous leader may have stored this reference after our lookup
        if let Some(resolved) = self.cache.get(&reference.at()).await {
            return Ok(resolved);
        }

        let (anchor_hash, anchor_height) = self.normalize(reference).await?;
        Span::current().record("anchor_height", anchor_height);

        // Hash references hit entries stored for the same height
        if let BlockId::Hash(_) = reference.at() {
            if let Some(resolved) = self.cache.get(&BlockId::Height(anchor_height)).await {
                if resolved.anchor_hash == anchor_hash {
                    return Ok(resolved);
                }
            }
        }

        let anchor_timestamp = read_timestamp(
            &self.client,
            &self.anchor,
            anchor_hash,
            ResolveStep::AnchorTimestamp,
        )
        .await?;

        let (anchor_finalized, derived_best) = try_join(
            self.client.finalized_height(&self.anchor),
            self.client.best_height(&self.derived),
        )
        .await
        .map_err(|e| ResolveError::facade(ResolveStep::ChainHeads, e))?;

        let source = DerivedTimestamps {
            client: &self.client,
            store: self.store.as_ref(),
            chain: &self.derived,
        };
        let bracket = find_last_at_or_before(&source, &self.derived, derived_best, anchor_timestamp)
            .instrument(spans::search_derived_block(
                &self.derived,
                anchor_timestamp,
                derived_best,
            ))
            .await?
            .ok_or_else(|| ResolveError::CorrelationImpossible {
                derived: self.derived.clone(),
                anchor_height,
                anchor_timestamp,
            })?;

        let resolved = ResolvedBlock {
            anchor_hash,
            anchor_height,
            anchor_timestamp,
            derived_hash: bracket.lo.hash,
            derived_height: bracket.lo.height,
            derived_timestamp: bracket.lo.timestamp,
        };
        Span::current().record("derived_height", resolved.derived_height);

        if self
            .is_settled(anchor_hash, anchor_height, anchor_finalized, bracket.hi.is_some())
            .await
        {
            self.cache.insert(resolved.clone()).await;
        }

        info!(
            anchor_height,
            derived_height = resolved.derived_height,
            anchor_timestamp_ms = anchor_timestamp.as_millis(),
            derived_timestamp_ms = resolved.derived_timestamp.as_millis(),
            "Resolved anchor reference"
        );
        Ok(resolved)
    }

    /// Whether a resolution can never change and may be stored
    ///
    /// The anchor block must be finalized and canonical at its height, and
    /// the derived chain must already hold a block later than the anchor
    /// timestamp. Otherwise the derived chain may still import a closer block.
    async fn is_settled(
        &self,
        anchor_hash: BlockHash,
        anchor_height: BlockNumber,
        anchor_finalized: BlockNumber,
        derived_bracketed: bool,
    ) -> bool {
        if !self.anchor_finalizes || anchor_height > anchor_finalized {
            debug!(
                anchor_height,
                anchor_finalized, "Anchor block not finalized, resolution not cached"
            );
            return false;
        }

        if !derived_bracketed {
            debug!(
                anchor_height,
                "Derived chain has no block after the anchor yet, resolution not cached"
            );
            return false;
        }

        // Read after finality so a reorg during the resolution is observed
        match self.client.block_hash(&self.anchor, anchor_height).await {
            Ok(Some(canonical)) if canonical == anchor_hash => true,
            Ok(canonical) => {
                debug!(
                    anchor_height,
                    %anchor_hash,
                    ?canonical,
                    "Anchor block is not canonical, resolution not cached"
                );
                false
            }
            Err(e) => {
                warn!(
                    anchor_height,
                    error = %e,
                    "Could not confirm canonical anchor block, resolution not cached"
                );
                false
            }
        }
    }

    /// Resolves the reference to both the anchor hash and height
    async fn normalize(
        &self,
        reference: &BlockReference,
    ) -> Result<(BlockHash, BlockNumber), ResolveError> {
        let not_found = || ResolveError::ReferenceNotFound {
            reference: reference.clone(),
        };
        let facade = |e| ResolveError::facade(ResolveStep::NormalizeAnchor, e);

        match reference.at() {
            BlockId::Height(height) => {
                let hash = self
                    .client
                    .block_hash(&self.anchor, height)
                    .await
                    .map_err(facade)?
                    .ok_or_else(not_found)?;
                Ok((hash, height))
            }
            BlockId::Hash(hash) => {
                let height = self
                    .client
                    .block_height(&self.anchor, hash)
                    .await
                    .map_err(facade)?
                    .ok_or_else(not_found)?;
                Ok((hash, height))
            }
        }
    }
}

/// Reads the `Timestamp::Now` storage item at `at`
///
/// An absent value reads as zero, the storage default at genesis.
async fn read_timestamp<C: ChainClient + ?Sized>(
    client: &C,
    chain: &ChainId,
    at: BlockHash,
    step: ResolveStep,
) -> Result<Moment, ResolveError> {
    let raw = client
        .read_storage(chain, at, &TIMESTAMP_NOW)
        .await
        .map_err(|e| ResolveError::facade(step, e))?;

    match raw {
        None => Ok(Moment::default()),
        Some(bytes) => Moment::decode(&bytes).ok_or_else(|| ResolveError::TimestampDecode {
            chain: chain.clone(),
            hash: at,
            len: bytes.len(),
        }),
    }
}

/// Derived-chain timestamps read through the block store
struct DerivedTimestamps<'a, C> {
    client: &'a C,
    store: &'a dyn BlockStore,
    chain: &'a ChainId,
}

#[async_trait]
impl<'a, C: ChainClient> TimestampSource for DerivedTimestamps<'a, C> {
    async fn probe(&self, height: BlockNumber) -> Result<ProbedBlock, ResolveError> {
        let step = ResolveStep::ProbeDerived { height };
        let hash = self
            .client
            .block_hash(self.chain, height)
            .await
            .map_err(|e| ResolveError::facade(step, e))?
            .ok_or_else(|| ResolveError::ReferenceNotFound {
                reference: BlockReference::height(self.chain.clone(), height),
            })?;

        if let Some(payload) = self.store.get(&hash).await {
            if payload.height == height {
                return Ok(ProbedBlock {
                    height,
                    hash,
                    timestamp: payload.timestamp,
                });
            }
        }

        let timestamp = read_timestamp(self.client, self.chain, hash, step).await?;
        self.store
            .put(hash, BlockPayload::header(height, timestamp))
            .await;

        Ok(ProbedBlock {
            height,
            hash,
            timestamp,
        })
    }
}
