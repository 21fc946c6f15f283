// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Per-chain timeout decorator for the chain client facade

use alloy_primitives::{BlockHash, BlockNumber, Bytes};
use async_trait::async_trait;
use std::collections::HashMap;
use std::future::Future;
use std::time::{Duration, Instant};
use tracing::{trace, warn};

use super::ChainClient;
use crate::config::constants::DEFAULT_FACADE_TIMEOUT;
use crate::config::CorrelatorConfig;
use crate::errors::{ClientError, FacadeOperation};
use crate::types::chain::{ChainId, SpecVersion, StorageKey};

/// Bounds every facade call with a per-chain timeout
///
/// An expired call yields [`ClientError::Timeout`] naming the chain and the
/// primitive. Errors from the wrapped client pass through unchanged.
///
/// # Examples
///
/// ```rust,ignore
/// use anchorscan::{CorrelatorConfig, TimedClient};
/// use std::time::Duration;
///
/// let client = TimedClient::new(gateway_client)
///     .with_default_timeout(Duration::from_secs(10))
///     .with_chain_timeout(ChainId::new("polkadot"), Duration::from_secs(3));
/// ```
#[derive(Debug, Clone)]
pub struct TimedClient<C> {
    inner: C,
    default_timeout: Duration,
    chain_timeouts: HashMap<ChainId, Duration>,
}

impl<C: ChainClient> TimedClient<C> {
    /// Wraps `inner` with the default facade timeout for every chain
    pub fn new(inner: C) -> Self {
        Self {
            inner,
            default_timeout: DEFAULT_FACADE_TIMEOUT,
            chain_timeouts: HashMap::new(),
        }
    }

    /// Wraps `inner` with the global and per-chain timeouts of `config`
    pub fn from_config(inner: C, config: &CorrelatorConfig) -> Self {
        let chain_timeouts = config
            .chain_overrides
            .iter()
            .filter_map(|(chain, overrides)| {
                overrides
                    .facade_timeout
                    .map(|timeout| (chain.clone(), timeout))
            })
            .collect();

        Self {
            inner,
            default_timeout: config.facade_timeout,
            chain_timeouts,
        }
    }

    pub fn with_default_timeout(mut self, timeout: Duration) -> Self {
        self.default_timeout = timeout;
        self
    }

    pub fn with_chain_timeout(mut self, chain: ChainId, timeout: Duration) -> Self {
        self.chain_timeouts.insert(chain, timeout);
        self
    }

    /// Effective timeout for calls addressed to `chain`
    pub fn timeout_for(&self, chain: &ChainId) -> Duration {
        self.chain_timeouts
            .get(chain)
            .copied()
            .unwrap_or(self.default_timeout)
    }

    pub fn inner(&self) -> &C {
        &self.inner
    }

    async fn bounded<T, F>(
        &self,
        chain: &ChainId,
        operation: FacadeOperation,
        call: F,
    ) -> Result<T, ClientError>
    where
        T: Send,
        F: Future<Output = Result<T, ClientError>> + Send,
    {
        let limit = self.timeout_for(chain);
        let start = Instant::now();

        match tokio::time::timeout(limit, call).await {
            Ok(result) => {
                trace!(
                    chain = %chain,
                    operation = %operation,
                    duration_ms = start.elapsed().as_millis() as u64,
                    "Facade call completed"
                );
                result
            }
            Err(_) => {
                warn!(
                    chain = %chain,
                    operation = %operation,
                    timeout_ms = limit.as_millis() as u64,
                    "Facade call timed out"
                );
                Err(ClientError::timeout(chain.clone(), operation, limit))
            }
        }
    }
}

#[async_trait]
impl<C: ChainClient> ChainClient for TimedClient<C> {
    async fn block_hash(
        &self,
        chain: &ChainId,
        height: BlockNumber,
    ) -> Result<Option<BlockHash>, ClientError> {
        self.bounded(
            chain,
            FacadeOperation::BlockHash,
            self.inner.block_hash(chain, height),
        )
        .await
    }

    async fn block_height(
        &self,
        chain: &ChainId,
        hash: BlockHash,
    ) -> Result<Option<BlockNumber>, ClientError> {
        self.bounded(
            chain,
            FacadeOperation::BlockHeight,
            self.inner.block_height(chain, hash),
        )
        .await
    }

    async fn read_storage(
        &self,
        chain: &ChainId,
        at: BlockHash,
        key: &StorageKey,
    ) -> Result<Option<Bytes>, ClientError> {
        self.bounded(
            chain,
            FacadeOperation::ReadStorage,
            self.inner.read_storage(chain, at, key),
        )
        .await
    }

    async fn best_height(&self, chain: &ChainId) -> Result<BlockNumber, ClientError> {
        self.bounded(
            chain,
            FacadeOperation::BestHeight,
            self.inner.best_height(chain),
        )
        .await
    }

    async fn finalized_height(&self, chain: &ChainId) -> Result<BlockNumber, ClientError> {
        self.bounded(
            chain,
            FacadeOperation::FinalizedHeight,
            self.inner.finalized_height(chain),
        )
        .await
    }

    async fn runtime_spec_version(
        &self,
        chain: &ChainId,
        at: BlockHash,
    ) -> Result<SpecVersion, ClientError> {
        self.bounded(
            chain,
            FacadeOperation::RuntimeSpecVersion,
            self.inner.runtime_spec_version(chain, at),
        )
        .await
    }

    async fn call_runtime_api(
        &self,
        chain: &ChainId,
        at: BlockHash,
        method: &str,
        params: &[u8],
    ) -> Result<Bytes, ClientError> {
        self.bounded(
            chain,
            FacadeOperation::CallRuntimeApi,
            self.inner.call_runtime_api(chain, at, method, params),
        )
        .await
    }
}
