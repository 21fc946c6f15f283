//! Error types for chain client facade calls.
//!
//! This module provides error types for failures reported by the
//! [`ChainClient`](crate::ChainClient) facade, or by the timeout layer
//! wrapped around it.

use alloy_primitives::BlockHash;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::types::chain::ChainId;

/// Facade primitive being called when an error occurred
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FacadeOperation {
    BlockHash,
    BlockHeight,
    ReadStorage,
    BestHeight,
    FinalizedHeight,
    RuntimeSpecVersion,
    CallRuntimeApi,
}

impl fmt::Display for FacadeOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FacadeOperation::BlockHash => "block_hash",
            FacadeOperation::BlockHeight => "block_height",
            FacadeOperation::ReadStorage => "read_storage",
            FacadeOperation::BestHeight => "best_height",
            FacadeOperation::FinalizedHeight => "finalized_height",
            FacadeOperation::RuntimeSpecVersion => "runtime_spec_version",
            FacadeOperation::CallRuntimeApi => "call_runtime_api",
        };
        f.write_str(name)
    }
}

/// Errors that can occur while calling the chain client facade.
///
/// Every variant names the chain and the facade primitive involved so a
/// higher layer can log and retry with full context. The type is `Clone` so a
/// single failure can be delivered to every caller waiting on a coalesced
/// computation.
///
/// # Examples
///
/// ```rust
/// use anchorscan::{ChainId, ClientError, FacadeOperation};
/// use std::time::Duration;
///
/// let error = ClientError::timeout(
///     ChainId::new("polkadot"),
///     FacadeOperation::BlockHash,
///     Duration::from_secs(30),
/// );
/// assert!(error.is_timeout());
/// println!("Error: {}", error);
/// ```
#[derive(Debug, Clone, thiserror::Error)]
pub enum ClientError {
    /// The call did not complete within its configured upper bound.
    ///
    /// Recoverable: the caller may retry.
    #[error("Facade call {operation} on {chain} timed out after {timeout:?}")]
    Timeout {
        chain: ChainId,
        operation: FacadeOperation,
        timeout: Duration,
    },

    /// Connection-level failure reported by the facade.
    ///
    /// Propagated as-is; retry policy belongs to the caller.
    #[error("Facade unavailable during {operation} on {chain}")]
    Unavailable {
        chain: ChainId,
        operation: FacadeOperation,
        /// The underlying transport error
        #[source]
        source: Arc<dyn std::error::Error + Send + Sync>,
    },

    /// The runtime rejected a runtime API call.
    ///
    /// Distinct from [`ClientError::Unavailable`]: the node answered, the
    /// runtime at `at` does not provide (or failed to execute) the method.
    #[error("Runtime API {method} failed on {chain} at {at}: {reason}")]
    RuntimeApi {
        chain: ChainId,
        at: BlockHash,
        method: String,
        reason: String,
    },
}

impl ClientError {
    /// Create a `Timeout` error.
    pub fn timeout(chain: ChainId, operation: FacadeOperation, timeout: Duration) -> Self {
        ClientError::Timeout {
            chain,
            operation,
            timeout,
        }
    }

    /// Create an `Unavailable` error from any error type.
    pub fn unavailable(
        chain: ChainId,
        operation: FacadeOperation,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        ClientError::Unavailable {
            chain,
            operation,
            source: Arc::new(source),
        }
    }

    /// Create a `RuntimeApi` error.
    pub fn runtime_api(
        chain: ChainId,
        at: BlockHash,
        method: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        ClientError::RuntimeApi {
            chain,
            at,
            method: method.into(),
            reason: reason.into(),
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, ClientError::Timeout { .. })
    }

    /// Chain the failed call was addressed to
    pub fn chain(&self) -> &ChainId {
        match self {
            ClientError::Timeout { chain, .. }
            | ClientError::Unavailable { chain, .. }
            | ClientError::RuntimeApi { chain, .. } => chain,
        }
    }
}
