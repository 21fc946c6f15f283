//! Error types for cross-chain block resolution.
//!
//! This module provides error types for operations in the `resolver` module,
//! which correlates an anchor-chain block with a derived-chain block.

use alloy_primitives::{BlockHash, BlockNumber};
use std::fmt;

use super::{ClientError, InFlightAborted};
use crate::types::chain::{BlockReference, ChainId, Moment};

/// Step of a resolution during which a facade call failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolveStep {
    /// Turning the caller's reference into an anchor hash and height
    NormalizeAnchor,
    /// Reading the anchor block's timestamp
    AnchorTimestamp,
    /// Reading the anchor finalized head and the derived best head
    ChainHeads,
    /// Probing a derived-chain height during the binary search
    ProbeDerived { height: BlockNumber },
}

impl fmt::Display for ResolveStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolveStep::NormalizeAnchor => f.write_str("normalizing anchor reference"),
            ResolveStep::AnchorTimestamp => f.write_str("reading anchor timestamp"),
            ResolveStep::ChainHeads => f.write_str("reading chain heads"),
            ResolveStep::ProbeDerived { height } => write!(f, "probing derived height {height}"),
        }
    }
}

/// Errors that can occur while resolving an anchor reference.
///
/// # Examples
///
/// ```rust,ignore
/// use anchorscan::{BlockReference, ResolveError};
///
/// match correlator.resolve_anchor_reference(&reference).await {
///     Ok(resolved) => println!("Derived block: {}", resolved.derived_height),
///     Err(ResolveError::FacadeTimeout { step, .. }) => {
///         eprintln!("Timed out while {step}, retrying...");
///     }
///     Err(ResolveError::CorrelationImpossible { .. }) => {
///         eprintln!("Derived chain did not exist yet at that anchor block");
///     }
///     Err(e) => eprintln!("Other error: {}", e),
/// }
/// ```
#[derive(Debug, Clone, thiserror::Error)]
pub enum ResolveError {
    /// The referenced block does not exist.
    ///
    /// Raised for unknown anchor heights or hashes, and for derived heights
    /// that disappear between reading the best head and probing them.
    #[error("Block reference not found: {reference}")]
    ReferenceNotFound {
        /// The reference that could not be found
        reference: BlockReference,
    },

    /// The reference is scoped to a chain other than the configured anchor.
    #[error("Reference {reference} is not on the anchor chain {anchor}")]
    UnexpectedChain {
        reference: BlockReference,
        anchor: ChainId,
    },

    /// The derived chain has no block at or before the anchor timestamp.
    ///
    /// Typically the derived chain's genesis postdates the anchor block.
    #[error(
        "No {derived} block at or before anchor timestamp {anchor_timestamp} (anchor height {anchor_height})"
    )]
    CorrelationImpossible {
        derived: ChainId,
        anchor_height: BlockNumber,
        anchor_timestamp: Moment,
    },

    /// Derived-chain timestamps are not monotonically non-decreasing.
    ///
    /// Surfaced rather than corrected: binary search cannot produce a
    /// trustworthy answer on such a chain.
    #[error("Correlation invariant violated on {chain}: {details}")]
    CorrelationInvariantViolated { chain: ChainId, details: String },

    /// A timestamp storage value could not be decoded.
    #[error("Undecodable timestamp on {chain} at {hash}: expected 8 bytes, got {len}")]
    TimestampDecode {
        chain: ChainId,
        hash: BlockHash,
        len: usize,
    },

    /// A facade call exceeded its timeout. Recoverable; nothing was cached.
    #[error("Facade timeout while {step}: {source}")]
    FacadeTimeout {
        step: ResolveStep,
        #[source]
        source: ClientError,
    },

    /// The facade reported a connection-level failure.
    #[error("Facade unavailable while {step}: {source}")]
    FacadeUnavailable {
        step: ResolveStep,
        #[source]
        source: ClientError,
    },

    /// The shared computation stopped without producing a result.
    #[error(transparent)]
    Aborted(#[from] InFlightAborted),
}

impl ResolveError {
    /// Classify a facade error raised during `step`.
    pub fn facade(step: ResolveStep, source: ClientError) -> Self {
        if source.is_timeout() {
            ResolveError::FacadeTimeout { step, source }
        } else {
            ResolveError::FacadeUnavailable { step, source }
        }
    }

    /// Create a `CorrelationInvariantViolated` error with details.
    pub fn invariant_violated(chain: ChainId, details: impl Into<String>) -> Self {
        ResolveError::CorrelationInvariantViolated {
            chain,
            details: details.into(),
        }
    }

    /// Whether retrying the same request may succeed
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ResolveError::FacadeTimeout { .. }
                | ResolveError::FacadeUnavailable { .. }
                | ResolveError::Aborted(_)
        )
    }
}
