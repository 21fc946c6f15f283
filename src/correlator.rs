// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! The object a gateway constructs to use anchorscan
//!
//! [`Correlator`] wires the chain client, block store, resolver and
//! capability cache together from one [`CorrelatorConfig`] and exposes the
//! operations route handlers call.
//!
//! # Examples
//!
//! ```rust,ignore
//! use anchorscan::{BlockReference, ChainId, Correlator, CorrelatorConfig};
//!
//! let correlator = Correlator::new(gateway_client, CorrelatorConfig::asset_hub_polkadot());
//!
//! // `?rcAt=20000000` on an Asset Hub route
//! let reference = BlockReference::height(ChainId::new("polkadot"), 20_000_000);
//! let resolved = correlator.resolve_anchor_reference(&reference).await?;
//!
//! if correlator.supports_optional_api_at(resolved.derived_hash).await? {
//!     // query fee details at the derived block
//! }
//! ```

use alloy_primitives::BlockHash;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use crate::blocks::{BlockStore, MemoryBlockStore};
use crate::cache::CacheStats;
use crate::capability::{CapabilityCache, CapabilityProbe, RuntimeApiProbe};
use crate::client::{ChainClient, TimedClient};
use crate::config::CorrelatorConfig;
use crate::errors::{CapabilityError, ResolveError};
use crate::resolver::{CrossChainResolver, ResolvedBlock};
use crate::types::chain::{BlockPayload, BlockReference, SpecVersion};

/// Snapshot of every cache owned by a [`Correlator`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorrelatorStats {
    pub block_store: CacheStats,
    pub resolutions: CacheStats,
    /// `None` when no optional runtime API is configured
    pub capabilities: Option<CacheStats>,
}

impl fmt::Display for CorrelatorStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "block_store: [{}], resolutions: [{}]",
            self.block_store, self.resolutions
        )?;
        if let Some(capabilities) = &self.capabilities {
            write!(f, ", capabilities: [{capabilities}]")?;
        }
        Ok(())
    }
}

/// Cross-chain correlation and caching core
///
/// Every facade call goes through a [`TimedClient`] built from the config.
pub struct Correlator<C> {
    config: CorrelatorConfig,
    client: Arc<TimedClient<C>>,
    store: Arc<dyn BlockStore>,
    resolver: CrossChainResolver<Arc<TimedClient<C>>>,
    capabilities: Option<CapabilityCache>,
}

impl<C: ChainClient + 'static> Correlator<C> {
    /// Creates a correlator with an in-memory block store sized by `config`
    pub fn new(client: C, config: CorrelatorConfig) -> Self {
        let store = MemoryBlockStore::with_capacity(config.block_store_capacity);
        Self::with_block_store(client, config, Arc::new(store))
    }

    /// Creates a correlator using the given block store backend
    pub fn with_block_store(client: C, config: CorrelatorConfig, store: Arc<dyn BlockStore>) -> Self {
        let client = Arc::new(TimedClient::from_config(client, &config));
        let resolver = CrossChainResolver::new(Arc::clone(&client), Arc::clone(&store), &config);

        let capabilities = config.optional_api.as_ref().map(|api| {
            let probe = RuntimeApiProbe::new(
                Arc::clone(&client),
                config.derived_chain.clone(),
                api.method.clone(),
            );
            capability_cache(&config, Arc::new(probe))
        });

        Self {
            config,
            client,
            store,
            resolver,
            capabilities,
        }
    }

    /// Replaces the capability probe, keeping the configured limits
    ///
    /// Enables capability checks even when no optional API is configured.
    pub fn with_capability_probe(mut self, probe: Arc<dyn CapabilityProbe>) -> Self {
        self.capabilities = Some(capability_cache(&self.config, probe));
        self
    }

    /// Resolves an anchor-chain reference to its correlated derived block
    ///
    /// See [`CrossChainResolver::resolve`] for the error contract.
    pub async fn resolve_anchor_reference(
        &self,
        reference: &BlockReference,
    ) -> Result<ResolvedBlock, ResolveError> {
        self.resolver.resolve(reference).await
    }

    /// Whether the derived runtime with `spec_version` provides the optional API
    ///
    /// `at` must be a derived block executing that runtime.
    pub async fn supports_optional_api(
        &self,
        spec_version: SpecVersion,
        at: BlockHash,
    ) -> Result<bool, CapabilityError> {
        let capabilities = self
            .capabilities
            .as_ref()
            .ok_or(CapabilityError::NotConfigured)?;
        capabilities.supports(spec_version, at).await
    }

    /// Whether the derived runtime executing block `at` provides the optional API
    pub async fn supports_optional_api_at(&self, at: BlockHash) -> Result<bool, CapabilityError> {
        if self.capabilities.is_none() {
            return Err(CapabilityError::NotConfigured);
        }
        let spec_version = self
            .client
            .runtime_spec_version(&self.config.derived_chain, at)
            .await
            .map_err(|source| CapabilityError::SpecVersionLookup { at, source })?;
        self.supports_optional_api(spec_version, at).await
    }

    /// Decoded payload stored for `hash`, if any
    pub async fn get_cached_block(&self, hash: &BlockHash) -> Option<BlockPayload> {
        self.store.get(hash).await
    }

    /// Stores a decoded payload under `hash`
    pub async fn cache_block(&self, hash: BlockHash, payload: BlockPayload) {
        self.store.put(hash, payload).await;
    }

    pub async fn stats(&self) -> CorrelatorStats {
        let capabilities = match &self.capabilities {
            Some(capabilities) => Some(capabilities.stats().await),
            None => None,
        };
        CorrelatorStats {
            block_store: self.store.stats().await,
            resolutions: self.resolver.cache_stats().await,
            capabilities,
        }
    }

    pub fn config(&self) -> &CorrelatorConfig {
        &self.config
    }

    /// The timeout-bounded client shared by every component
    pub fn client(&self) -> &TimedClient<C> {
        &self.client
    }
}

impl<C> fmt::Debug for Correlator<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Correlator")
            .field("anchor", &self.config.anchor_chain)
            .field("derived", &self.config.derived_chain)
            .field("block_store", &self.store.name())
            .field("capabilities", &self.capabilities)
            .finish_non_exhaustive()
    }
}

fn capability_cache(config: &CorrelatorConfig, probe: Arc<dyn CapabilityProbe>) -> CapabilityCache {
    let cache = CapabilityCache::new(probe).with_capacity(config.capability_cache_capacity);
    match config
        .optional_api
        .as_ref()
        .and_then(|api| api.min_spec_version)
    {
        Some(min) => cache.with_min_spec_version(min),
        None => cache,
    }
}
