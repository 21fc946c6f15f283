// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Per-runtime capability cache
//!
//! Whether an optional runtime API exists is a pure function of the runtime
//! spec version, so each version is probed at most once and the outcome,
//! positive or negative, is remembered for the life of the process.
//!
//! # Examples
//!
//! ```rust,ignore
//! use anchorscan::{CapabilityCache, RuntimeApiProbe, SpecVersion};
//! use std::sync::Arc;
//!
//! let probe = RuntimeApiProbe::new(client, chain, "TransactionPaymentApi_query_fee_details");
//! let cache = CapabilityCache::new(Arc::new(probe))
//!     .with_min_spec_version(SpecVersion::new(601));
//!
//! // Probes once, then answers from memory
//! let supported = cache.supports(SpecVersion::new(1_004_000), at).await?;
//! ```

use alloy_primitives::BlockHash;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, Instrument, Span};

use crate::cache::{CacheStats, Coalescer, LruStore};
use crate::config::constants::DEFAULT_CAPABILITY_CACHE_CAPACITY;
use crate::config::CacheCapacity;
use crate::errors::CapabilityError;
use crate::tracing::spans;
use crate::types::chain::SpecVersion;

mod probe;

pub use probe::{CapabilityProbe, RuntimeApiProbe};

type Records = Arc<Mutex<LruStore<SpecVersion, bool>>>;

/// Remembers, per spec version, whether the optional API is available
///
/// Constructed empty; entries appear as versions are first asked about.
///
/// - The first [`supports`](Self::supports) call for a version runs exactly
///   one probe, and concurrent first calls share it.
/// - Negative outcomes are cached like positive ones and never re-probed.
/// - Probe transport failures are returned to every waiter and not cached.
/// - Versions below the optional minimum hint answer `false` without
///   probing, unless an outcome was recorded for them.
pub struct CapabilityCache {
    records: Records,
    probes: Coalescer<SpecVersion, bool, CapabilityError>,
    probe: Arc<dyn CapabilityProbe>,
    min_spec_version: Option<SpecVersion>,
}

impl CapabilityCache {
    /// Creates an empty cache with the default capacity
    pub fn new(probe: Arc<dyn CapabilityProbe>) -> Self {
        Self {
            records: Arc::new(Mutex::new(LruStore::new(CacheCapacity::new(
                DEFAULT_CAPABILITY_CACHE_CAPACITY,
            )))),
            probes: Coalescer::new(),
            probe,
            min_spec_version: None,
        }
    }

    /// Bounds the number of remembered spec versions
    pub fn with_capacity(mut self, capacity: CacheCapacity) -> Self {
        self.records = Arc::new(Mutex::new(LruStore::new(capacity)));
        self
    }

    /// Answers `false` without probing for versions below `min`
    pub fn with_min_spec_version(mut self, min: SpecVersion) -> Self {
        self.min_spec_version = Some(min);
        self
    }

    /// Whether the runtime with `spec_version` provides the optional API
    ///
    /// `at` must be a block executing that runtime; it is only used if a
    /// probe is needed.
    pub async fn supports(
        &self,
        spec_version: SpecVersion,
        at: BlockHash,
    ) -> Result<bool, CapabilityError> {
        let span = spans::supports_optional_api(spec_version);
        async move {
            if let Some(supported) = self.records.lock().await.get(&spec_version).copied() {
                return Ok(supported);
            }

            if self.below_hint(spec_version) {
                debug!(
                    spec_version = spec_version.as_u32(),
                    "Spec version below minimum hint, skipping probe"
                );
                return Ok(false);
            }

            let records = Arc::clone(&self.records);
            let probe = Arc::clone(&self.probe);
            self.probes
                .run(spec_version, move || {
                    run_probe(records, probe, spec_version, at)
                        .instrument(spans::probe_capability(spec_version, at))
                })
                .await
        }
        .instrument(span)
        .await
    }

    /// Recorded outcome for `spec_version`, without probing
    pub async fn known(&self, spec_version: SpecVersion) -> Option<bool> {
        self.records.lock().await.peek(&spec_version).copied()
    }

    /// Records an outcome obtained elsewhere
    ///
    /// A recorded outcome is final: later calls never probe this version.
    pub async fn record(&self, spec_version: SpecVersion, supported: bool) {
        self.records.lock().await.put(spec_version, supported);
    }

    pub async fn stats(&self) -> CacheStats {
        self.records.lock().await.stats()
    }

    fn below_hint(&self, spec_version: SpecVersion) -> bool {
        self.min_spec_version
            .is_some_and(|min| spec_version < min)
    }
}

impl std::fmt::Debug for CapabilityCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CapabilityCache")
            .field("probes", &self.probes)
            .field("min_spec_version", &self.min_spec_version)
            .finish_non_exhaustive()
    }
}

async fn run_probe(
    records: Records,
    probe: Arc<dyn CapabilityProbe>,
    spec_version: SpecVersion,
    at: BlockHash,
) -> Result<bool, CapabilityError> {
    // Another leader may have finished between our lookup and joining
    if let Some(supported) = records.lock().await.peek(&spec_version).copied() {
        return Ok(supported);
    }

    let supported = probe
        .probe(spec_version, at)
        .await
        .map_err(|source| CapabilityError::Probe {
            spec_version,
            source,
        })?;

    Span::current().record("supported", supported);
    debug!(
        spec_version = spec_version.as_u32(),
        supported, "Recorded capability probe outcome"
    );
    records.lock().await.put(spec_version, supported);
    Ok(supported)
}
