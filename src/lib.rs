// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! # anchorscan
//!
//! Cross-chain block correlation and caching core for blockchain data
//! gateways.
//!
//! A parachain such as Asset Hub has no notion of relay chain block numbers
//! in its own storage, yet callers often want "the Asset Hub state as of relay
//! block N". anchorscan answers that question by timestamp: it finds the
//! latest derived-chain block whose on-chain timestamp is at or before the
//! anchor block's timestamp.
//!
//! ## Features
//!
//! - **Cross-chain resolution**: binary search over derived heights, guarded
//!   against chains whose timestamps go backwards
//! - **Request coalescing**: concurrent requests for the same anchor block or
//!   runtime version share one computation
//! - **Bounded caches**: LRU block store, resolution cache and capability
//!   cache, all with hit/miss/eviction statistics
//! - **Capability caching**: one probe per runtime spec version, with
//!   negative results remembered
//! - **Timeouts**: every chain client call is bounded per chain
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use anchorscan::{BlockReference, ChainId, Correlator, CorrelatorConfig};
//!
//! // `client` is the gateway's implementation of `ChainClient`
//! let correlator = Correlator::new(client, CorrelatorConfig::asset_hub_polkadot());
//!
//! let reference = BlockReference::height(ChainId::new("polkadot"), 20_000_000);
//! let resolved = correlator.resolve_anchor_reference(&reference).await?;
//!
//! println!(
//!     "Relay block #{} ({}) -> Asset Hub block #{} ({})",
//!     resolved.anchor_height,
//!     resolved.anchor_timestamp,
//!     resolved.derived_height,
//!     resolved.derived_timestamp,
//! );
//! ```
//!
//! ## Module Organization
//!
//! - [`client`]: chain client facade and timeout decorator
//! - [`blocks`]: block store backends
//! - [`capability`]: per-runtime capability cache and probes
//! - [`resolver`]: cross-chain resolution and its cache
//! - [`cache`]: shared LRU store and request coalescer
//! - [`config`]: configuration and defaults
//! - [`errors`]: error types

pub mod blocks;
pub mod cache;
pub mod capability;
pub mod client;
pub mod config;
mod correlator;
pub mod errors;
pub mod resolver;
mod tracing;
mod types;

// Core
pub use correlator::{Correlator, CorrelatorStats};
pub use resolver::{CrossChainResolver, ResolutionCache, ResolvedBlock};

// Facade
pub use client::{ChainClient, TimedClient};

// Caches
pub use blocks::{BlockStore, MemoryBlockStore, NoOpBlockStore};
pub use cache::CacheStats;
pub use capability::{CapabilityCache, CapabilityProbe, RuntimeApiProbe};

// Configuration
pub use config::{
    CacheCapacity, ChainConfig, CorrelatorConfig, CorrelatorConfigBuilder, OptionalApiConfig,
};

// Errors
pub use errors::{
    AnchorscanError, CapabilityError, ClientError, FacadeOperation, InFlightAborted, ResolveError,
    ResolveStep,
};

// Types
pub use types::chain::{
    BlockId, BlockPayload, BlockReference, ChainId, ChainRole, Moment, ParseBlockIdError,
    SpecVersion, StorageKey,
};

// Primitives used throughout the public API
pub use alloy_primitives::{BlockHash, BlockNumber, Bytes};
