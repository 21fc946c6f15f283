// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Chain client facade
//!
//! The gateway owns connection pooling, protocol framing and metadata
//! decoding. This crate only needs the handful of primitives described by
//! [`ChainClient`]; everything else stays behind the facade.
//!
//! Every method is a suspension point. Wrap the gateway's client in a
//! [`TimedClient`] to give each call an upper bound.
//!
//! # Examples
//!
//! ```rust,ignore
//! use anchorscan::{ChainClient, TimedClient, CorrelatorConfig};
//!
//! let config = CorrelatorConfig::asset_hub_polkadot();
//! let client = TimedClient::from_config(gateway_client, &config);
//!
//! let best = client.best_height(&config.derived_chain).await?;
//! ```

use alloy_primitives::{BlockHash, BlockNumber, Bytes};
use async_trait::async_trait;
use std::sync::Arc;

use crate::errors::ClientError;
use crate::types::chain::{ChainId, SpecVersion, StorageKey};

mod timeout;

pub use timeout::TimedClient;

/// Primitives the correlation core consumes from the gateway's chain client
///
/// # Thread Safety
///
/// Implementations are shared across concurrent resolutions and spawned
/// tasks, so they must be `Send + Sync`.
///
/// # Error Handling
///
/// "Does not exist" answers are `Ok(None)`, never errors. Connection-level
/// failures are [`ClientError::Unavailable`]; a runtime rejecting an API call
/// is [`ClientError::RuntimeApi`].
#[async_trait]
pub trait ChainClient: Send + Sync {
    /// Resolves a block height to its hash on `chain`
    async fn block_hash(
        &self,
        chain: &ChainId,
        height: BlockNumber,
    ) -> Result<Option<BlockHash>, ClientError>;

    /// Resolves a block hash to its height on `chain`
    async fn block_height(
        &self,
        chain: &ChainId,
        hash: BlockHash,
    ) -> Result<Option<BlockNumber>, ClientError>;

    /// Reads the raw value of a storage item at block `at`
    ///
    /// Returns `None` if the item has no value at that block.
    async fn read_storage(
        &self,
        chain: &ChainId,
        at: BlockHash,
        key: &StorageKey,
    ) -> Result<Option<Bytes>, ClientError>;

    /// Height of the current best block
    async fn best_height(&self, chain: &ChainId) -> Result<BlockNumber, ClientError>;

    /// Height of the current finalized block
    async fn finalized_height(&self, chain: &ChainId) -> Result<BlockNumber, ClientError>;

    /// Spec version of the runtime executing block `at`
    async fn runtime_spec_version(
        &self,
        chain: &ChainId,
        at: BlockHash,
    ) -> Result<SpecVersion, ClientError>;

    /// Calls a runtime API method at block `at` with SCALE-encoded `params`
    async fn call_runtime_api(
        &self,
        chain: &ChainId,
        at: BlockHash,
        method: &str,
        params: &[u8],
    ) -> Result<Bytes, ClientError>;
}

#[async_trait]
impl<C: ChainClient + ?Sized> ChainClient for Arc<C> {
    async fn block_hash(
        &self,
        chain: &ChainId,
        height: BlockNumber,
    ) -> Result<Option<BlockHash>, ClientError> {
        (**self).block_hash(chain, height).await
    }

    async fn block_height(
        &self,
        chain: &ChainId,
        hash: BlockHash,
    ) -> Result<Option<BlockNumber>, ClientError> {
        (**self).block_height(chain, hash).await
    }

    async fn read_storage(
        &self,
        chain: &ChainId,
        at: BlockHash,
        key: &StorageKey,
    ) -> Result<Option<Bytes>, ClientError> {
        (**self).read_storage(chain, at, key).await
    }

    async fn best_height(&self, chain: &ChainId) -> Result<BlockNumber, ClientError> {
        (**self).best_height(chain).await
    }

    async fn finalized_height(&self, chain: &ChainId) -> Result<BlockNumber, ClientError> {
        (**self).finalized_height(chain).await
    }

    async fn runtime_spec_version(
        &self,
        chain: &ChainId,
        at: BlockHash,
    ) -> Result<SpecVersion, ClientError> {
        (**self).runtime_spec_version(chain, at).await
    }

    async fn call_runtime_api(
        &self,
        chain: &ChainId,
        at: BlockHash,
        method: &str,
        params: &[u8],
    ) -> Result<Bytes, ClientError> {
        (**self).call_runtime_api(chain, at, method, params).await
    }
}
