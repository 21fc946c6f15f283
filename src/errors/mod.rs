//! Error types for the anchorscan library.
//!
//! This module provides strongly-typed errors for all public APIs in anchorscan.
//! It follows a hybrid approach:
//!
//! - **Module-specific errors** for fine-grained error handling (`ResolveError`,
//!   `CapabilityError`, etc.)
//! - **Unified error type** (`AnchorscanError`) for convenience when you don't need
//!   to distinguish between error sources
//!
//! # Architecture
//!
//! Each major module has its own error type:
//! - [`ResolveError`] - Errors from cross-chain block resolution
//! - [`CapabilityError`] - Errors from runtime capability probing
//!
//! Additionally, [`ClientError`] provides shared error variants for chain
//! client facade calls, and [`InFlightAborted`] reports a lost coalesced
//! computation.
//!
//! # Examples
//!
//! ## Using the unified error type
//!
//! ```rust,ignore
//! use anchorscan::{AnchorscanError, BlockReference};
//!
//! async fn example() -> Result<(), AnchorscanError> {
//!     let resolved = correlator.resolve_anchor_reference(&reference).await?;
//!     let supported = correlator.supports_optional_api_at(resolved.derived_hash).await?;
//!     // Errors automatically convert to AnchorscanError via From implementations
//!     Ok(())
//! }
//! ```

mod cache;
mod capability;
mod client;
mod resolve;

pub use cache::InFlightAborted;
pub use capability::CapabilityError;
pub use client::{ClientError, FacadeOperation};
pub use resolve::{ResolveError, ResolveStep};

/// Unified error type for all anchorscan operations.
///
/// All module-specific error types automatically convert to `AnchorscanError` via
/// `From` implementations, so you can use `?` to propagate errors naturally.
#[derive(Debug, Clone, thiserror::Error)]
pub enum AnchorscanError {
    /// Error from cross-chain resolution.
    #[error("Resolution error: {0}")]
    Resolve(#[from] ResolveError),

    /// Error from capability probing.
    #[error("Capability error: {0}")]
    Capability(#[from] CapabilityError),

    /// Error from a direct facade call.
    #[error("Chain client error: {0}")]
    Client(#[from] ClientError),
}
