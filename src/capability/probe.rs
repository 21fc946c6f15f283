// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Runtime capability probes

use alloy_primitives::{BlockHash, Bytes};
use async_trait::async_trait;
use tracing::debug;

use crate::client::ChainClient;
use crate::errors::ClientError;
use crate::types::chain::{ChainId, SpecVersion};

/// Determines whether a runtime provides an optional API
///
/// `at` is a block executing the runtime with `spec_version`; it is where the
/// probe runs, not part of what is being asked.
///
/// Returns `Ok(false)` when the runtime answers that the API is absent.
/// Returns `Err` only when no answer was obtained (timeout, connection
/// failure); such errors are never recorded as outcomes.
#[async_trait]
pub trait CapabilityProbe: Send + Sync {
    async fn probe(&self, spec_version: SpecVersion, at: BlockHash) -> Result<bool, ClientError>;
}

/// Probes by calling a runtime API method through the chain client
///
/// A successful call means the API exists. A [`ClientError::RuntimeApi`]
/// rejection means the runtime does not provide it. Any other error is
/// propagated.
///
/// # Examples
///
/// ```rust,ignore
/// use anchorscan::{ChainId, RuntimeApiProbe};
///
/// let probe = RuntimeApiProbe::new(
///     client,
///     ChainId::new("asset-hub-polkadot"),
///     "TransactionPaymentApi_query_fee_details",
/// )
/// .with_params(encoded_probe_extrinsic);
/// ```
#[derive(Debug, Clone)]
pub struct RuntimeApiProbe<C> {
    client: C,
    chain: ChainId,
    method: String,
    params: Bytes,
}

impl<C: ChainClient> RuntimeApiProbe<C> {
    pub fn new(client: C, chain: ChainId, method: impl Into<String>) -> Self {
        Self {
            client,
            chain,
            method: method.into(),
            params: Bytes::new(),
        }
    }

    /// SCALE-encoded arguments passed with the probing call
    pub fn with_params(mut self, params: impl Into<Bytes>) -> Self {
        self.params = params.into();
        self
    }

    pub fn method(&self) -> &str {
        &self.method
    }
}

#[async_trait]
impl<C: ChainClient> CapabilityProbe for RuntimeApiProbe<C> {
    async fn probe(&self, spec_version: SpecVersion, at: BlockHash) -> Result<bool, ClientError> {
        match self
            .client
            .call_runtime_api(&self.chain, at, &self.method, &self.params)
            .await
        {
            Ok(_) => Ok(true),
            Err(ClientError::RuntimeApi { reason, .. }) => {
                debug!(
                    chain = %self.chain,
                    method = %self.method,
                    spec_version = spec_version.as_u32(),
                    reason = %reason,
                    "Runtime rejected optional API"
                );
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }
}
