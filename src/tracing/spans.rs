//! Span creation helpers for anchorscan operations.
//!
//! Telemetry concerns are kept out of business logic: instead of using
//! `#[instrument]` attributes, each instrumented operation has a
//! corresponding span helper in this module. The spans are attached to
//! futures with [`tracing::Instrument`], so they stay correct across await
//! points and spawned tasks.
//!
//! Usage pattern:
//! ```rust,ignore
//! pub async fn my_operation(&self, param: Type) -> Result<T> {
//!     let span = spans::my_operation(param_value);
//!     async move {
//!         // Business logic here
//!     }
//!     .instrument(span)
//!     .await
//! }
//! ```

use alloy_primitives::{BlockHash, BlockNumber};
use tracing::{Level, Span};

use crate::types::chain::{BlockReference, ChainId, Moment, SpecVersion};

/// Create span for resolving an anchor reference to a derived block.
///
/// This is the main public API entry point for correlation.
///
/// Parent: None (root span for this operation)
/// Children: compute_resolution span (only on a cache miss)
#[inline]
pub(crate) fn resolve_anchor_reference(reference: &BlockReference) -> Span {
    tracing::span!(
        Level::INFO,
        "anchorscan.resolve_anchor_reference",
        chain = %reference.chain(),
        at = %reference.at(),
    )
}

/// Create span for the coalesced computation of one resolution.
///
/// Runs on its own task; waiters joining later are not linked to it.
///
/// Parent: resolve_anchor_reference span of the leading caller
/// Children: search_derived_block span
#[inline]
pub(crate) fn compute_resolution(reference: &BlockReference) -> Span {
    tracing::debug_span!(
        "anchorscan.compute_resolution",
        chain = %reference.chain(),
        at = %reference.at(),
        anchor_height = tracing::field::Empty,
        derived_height = tracing::field::Empty,
    )
}

/// Create span for the binary search over derived-chain heights.
///
/// Parent: compute_resolution span
/// Children: probe_derived_height spans (one per probe)
#[inline]
pub(crate) fn search_derived_block(
    derived: &ChainId,
    anchor_timestamp: Moment,
    derived_best: BlockNumber,
) -> Span {
    tracing::debug_span!(
        "anchorscan.search_derived_block",
        chain = %derived,
        anchor_timestamp_ms = anchor_timestamp.as_millis(),
        derived_best = derived_best,
    )
}

/// Create span for reading the timestamp of one derived height.
///
/// Parent: search_derived_block span
/// Children: None
#[inline]
pub(crate) fn probe_derived_height(derived: &ChainId, height: BlockNumber) -> Span {
    tracing::trace_span!(
        "anchorscan.probe_derived_height",
        chain = %derived,
        height = height,
    )
}

/// Create span for a capability check.
///
/// Parent: None (root span for this operation)
/// Children: probe_capability span (only on a cache miss)
#[inline]
pub(crate) fn supports_optional_api(spec_version: SpecVersion) -> Span {
    tracing::debug_span!(
        "anchorscan.supports_optional_api",
        spec_version = spec_version.as_u32(),
    )
}

/// Create span for the single probe run for a spec version.
///
/// Parent: supports_optional_api span of the leading caller
/// Children: None
#[inline]
pub(crate) fn probe_capability(spec_version: SpecVersion, at: BlockHash) -> Span {
    tracing::debug_span!(
        "anchorscan.probe_capability",
        spec_version = spec_version.as_u32(),
        at = %at,
        supported = tracing::field::Empty,
    )
}
