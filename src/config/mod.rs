//! Configuration for anchorscan
//!
//! This module provides the configuration surface consumed when a
//! [`Correlator`](crate::Correlator) is constructed: chain identifiers, cache
//! capacities, facade timeouts and the optional runtime API to probe for.
//!
//! # Example: Using a preset
//!
//! ```rust
//! use anchorscan::CorrelatorConfig;
//!
//! // Polkadot relay chain anchoring Asset Hub Polkadot
//! let config = CorrelatorConfig::asset_hub_polkadot();
//! assert_eq!(config.anchor_chain.as_str(), "polkadot");
//! ```
//!
//! # Example: Custom configuration
//!
//! ```rust
//! use anchorscan::{ChainId, CorrelatorConfigBuilder};
//! use std::time::Duration;
//!
//! let config = CorrelatorConfigBuilder::new(ChainId::new("kusama"), ChainId::new("asset-hub-kusama"))
//!     .block_store_capacity(500)
//!     .facade_timeout(Duration::from_secs(10))
//!     .chain_timeout(ChainId::new("kusama"), Duration::from_secs(5))
//!     .build();
//! ```

use std::collections::HashMap;
use std::num::NonZeroUsize;
use std::time::Duration;

use crate::types::chain::{ChainId, ChainRole, SpecVersion};

pub mod constants;

use constants::{
    DEFAULT_BLOCK_STORE_CAPACITY, DEFAULT_CAPABILITY_CACHE_CAPACITY, DEFAULT_FACADE_TIMEOUT,
    DEFAULT_RESOLUTION_CACHE_CAPACITY,
};

/// Maximum number of entries a cache may hold
///
/// Always positive: a requested capacity of zero is raised to one.
///
/// # Example
/// ```
/// use anchorscan::CacheCapacity;
///
/// assert_eq!(CacheCapacity::new(0).as_usize(), 1);
/// assert_eq!(CacheCapacity::new(64).as_usize(), 64);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct CacheCapacity(NonZeroUsize);

impl CacheCapacity {
    pub const fn new(capacity: usize) -> Self {
        match NonZeroUsize::new(capacity) {
            Some(capacity) => Self(capacity),
            None => Self(NonZeroUsize::MIN),
        }
    }

    pub const fn as_usize(&self) -> usize {
        self.0.get()
    }

    pub const fn as_non_zero(&self) -> NonZeroUsize {
        self.0
    }
}

/// Optional runtime API whose availability is tracked per spec version
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionalApiConfig {
    /// Runtime API method called by the probe (e.g. `TransactionPaymentApi_query_fee_details`)
    pub method: String,

    /// Spec version from which the API is expected to exist
    ///
    /// Only a hint: versions below it are reported unsupported without
    /// probing, but a recorded probe result always takes precedence.
    pub min_spec_version: Option<SpecVersion>,
}

/// Chain-specific configuration overrides
#[derive(Debug, Clone, Default)]
pub struct ChainConfig {
    /// Override the facade call timeout for this chain
    pub facade_timeout: Option<Duration>,
}

/// Configuration for a [`Correlator`](crate::Correlator)
///
/// Use [`CorrelatorConfigBuilder`] for a fluent API to construct instances.
#[derive(Debug, Clone)]
pub struct CorrelatorConfig {
    /// Chain whose block references callers supply
    pub anchor_chain: ChainId,

    /// Chain whose corresponding blocks are located
    pub derived_chain: ChainId,

    /// Whether the anchor chain has deterministic finality
    ///
    /// When false no resolution is ever treated as final, so none is cached.
    /// Default: true
    pub anchor_finalizes: bool,

    /// Number of decoded blocks held by the block store
    /// Default: 1000
    pub block_store_capacity: CacheCapacity,

    /// Number of memoized finalized resolutions
    /// Default: 10000
    pub resolution_cache_capacity: CacheCapacity,

    /// Number of spec versions remembered by the capability cache
    /// Default: 256
    pub capability_cache_capacity: CacheCapacity,

    /// Upper bound for a single facade call
    /// Default: 30 seconds
    pub facade_timeout: Duration,

    /// Optional runtime API tracked by the capability cache
    pub optional_api: Option<OptionalApiConfig>,

    /// Chain-specific overrides
    pub chain_overrides: HashMap<ChainId, ChainConfig>,
}

impl CorrelatorConfig {
    /// Create a config with default limits for the given chain pair
    pub fn new(anchor_chain: ChainId, derived_chain: ChainId) -> Self {
        Self {
            anchor_chain,
            derived_chain,
            anchor_finalizes: true,
            block_store_capacity: CacheCapacity::new(DEFAULT_BLOCK_STORE_CAPACITY),
            resolution_cache_capacity: CacheCapacity::new(DEFAULT_RESOLUTION_CACHE_CAPACITY),
            capability_cache_capacity: CacheCapacity::new(DEFAULT_CAPABILITY_CACHE_CAPACITY),
            facade_timeout: DEFAULT_FACADE_TIMEOUT,
            optional_api: None,
            chain_overrides: HashMap::new(),
        }
    }

    /// Polkadot relay chain anchoring Asset Hub Polkadot
    ///
    /// Tracks `TransactionPaymentApi_query_fee_details`, expected from
    /// Asset Hub spec version 601.
    ///
    /// # Example
    ///
    /// ```rust
    /// use anchorscan::{CorrelatorConfig, SpecVersion};
    ///
    /// let config = CorrelatorConfig::asset_hub_polkadot();
    /// let api = config.optional_api.unwrap();
    /// assert_eq!(api.min_spec_version, Some(SpecVersion::new(601)));
    /// ```
    pub fn asset_hub_polkadot() -> Self {
        let mut config = Self::new(
            ChainId::new("polkadot"),
            ChainId::new("asset-hub-polkadot"),
        );
        config.optional_api = Some(OptionalApiConfig {
            method: "TransactionPaymentApi_query_fee_details".to_string(),
            min_spec_version: Some(SpecVersion::new(601)),
        });
        config
    }

    /// Get effective facade timeout for a specific chain
    ///
    /// Returns chain-specific override if set, otherwise returns global default.
    ///
    /// # Example
    ///
    /// ```rust
    /// use anchorscan::{ChainConfig, ChainId, CorrelatorConfig};
    /// use std::time::Duration;
    ///
    /// let mut config = CorrelatorConfig::asset_hub_polkadot();
    /// config.set_chain_override(
    ///     ChainId::new("polkadot"),
    ///     ChainConfig { facade_timeout: Some(Duration::from_secs(5)) },
    /// );
    ///
    /// assert_eq!(config.get_facade_timeout(&ChainId::new("polkadot")), Duration::from_secs(5));
    /// assert_eq!(
    ///     config.get_facade_timeout(&ChainId::new("asset-hub-polkadot")),
    ///     Duration::from_secs(30)
    /// );
    /// ```
    pub fn get_facade_timeout(&self, chain: &ChainId) -> Duration {
        self.chain_overrides
            .get(chain)
            .and_then(|c| c.facade_timeout)
            .unwrap_or(self.facade_timeout)
    }

    /// Chain playing `role` in this correlation
    pub fn chain(&self, role: ChainRole) -> &ChainId {
        match role {
            ChainRole::Anchor => &self.anchor_chain,
            ChainRole::Derived => &self.derived_chain,
        }
    }

    /// Set chain-specific override
    pub fn set_chain_override(&mut self, chain: ChainId, config: ChainConfig) {
        self.chain_overrides.insert(chain, config);
    }
}

/// Builder for [`CorrelatorConfig`]
///
/// # Example
///
/// ```rust
/// use anchorscan::{ChainId, CorrelatorConfigBuilder, SpecVersion};
///
/// let config = CorrelatorConfigBuilder::new(ChainId::new("polkadot"), ChainId::new("asset-hub-polkadot"))
///     .optional_api("TransactionPaymentApi_query_fee_details", Some(SpecVersion::new(601)))
///     .resolution_cache_capacity(50_000)
///     .build();
/// ```
pub struct CorrelatorConfigBuilder {
    config: CorrelatorConfig,
}

impl CorrelatorConfigBuilder {
    /// Create a new builder with default limits
    pub fn new(anchor_chain: ChainId, derived_chain: ChainId) -> Self {
        Self {
            config: CorrelatorConfig::new(anchor_chain, derived_chain),
        }
    }

    /// Start from an existing configuration, such as a preset
    pub fn from_config(config: CorrelatorConfig) -> Self {
        Self { config }
    }

    /// Set whether the anchor chain finalizes blocks
    pub fn anchor_finalizes(mut self, finalizes: bool) -> Self {
        self.config.anchor_finalizes = finalizes;
        self
    }

    /// Set block store capacity
    pub fn block_store_capacity(mut self, capacity: usize) -> Self {
        self.config.block_store_capacity = CacheCapacity::new(capacity);
        self
    }

    /// Set resolution cache capacity
    pub fn resolution_cache_capacity(mut self, capacity: usize) -> Self {
        self.config.resolution_cache_capacity = CacheCapacity::new(capacity);
        self
    }

    /// Set capability cache capacity
    pub fn capability_cache_capacity(mut self, capacity: usize) -> Self {
        self.config.capability_cache_capacity = CacheCapacity::new(capacity);
        self
    }

    /// Set global facade timeout
    pub fn facade_timeout(mut self, timeout: Duration) -> Self {
        self.config.facade_timeout = timeout;
        self
    }

    /// Track an optional runtime API in the capability cache
    pub fn optional_api(
        mut self,
        method: impl Into<String>,
        min_spec_version: Option<SpecVersion>,
    ) -> Self {
        self.config.optional_api = Some(OptionalApiConfig {
            method: method.into(),
            min_spec_version,
        });
        self
    }

    /// Add chain-specific configuration
    pub fn chain_config(mut self, chain: ChainId, config: ChainConfig) -> Self {
        self.config.set_chain_override(chain, config);
        self
    }

    /// Convenience: set facade timeout for a specific chain
    pub fn chain_timeout(mut self, chain: ChainId, timeout: Duration) -> Self {
        let mut chain_config = self
            .config
            .chain_overrides
            .remove(&chain)
            .unwrap_or_default();
        chain_config.facade_timeout = Some(timeout);
        self.config.set_chain_override(chain, chain_config);
        self
    }

    /// Build the final configuration
    pub fn build(self) -> CorrelatorConfig {
        self.config
    }
}
