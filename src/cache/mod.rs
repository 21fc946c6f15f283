// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Shared caching infrastructure
//!
//! This module provides the building blocks used by every cache in the
//! crate:
//! - [`LruStore`]: a bounded least-recently-used map that keeps statistics
//! - [`Coalescer`]: at-most-one concurrent computation per key
//! - [`CacheStats`]: hit/miss/eviction counters reported by all caches

use serde::{Deserialize, Serialize};
use std::fmt;

mod coalesce;
mod lru_store;

pub use coalesce::Coalescer;
pub use lru_store::LruStore;

/// Statistics about cache performance
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStats {
    /// Number of cache hits (successful retrievals)
    pub hits: u64,
    /// Number of cache misses (key not found)
    pub misses: u64,
    /// Number of entries evicted due to the capacity bound
    pub evictions: u64,
    /// Current number of entries in the cache
    pub entries: usize,
    /// Maximum number of entries the cache may hold
    pub capacity: usize,
}

impl CacheStats {
    /// Calculates the cache hit rate as a percentage (0.0 to 100.0)
    ///
    /// # Example
    ///
    /// ```
    /// use anchorscan::CacheStats;
    ///
    /// let stats = CacheStats { hits: 3, misses: 1, ..Default::default() };
    /// assert_eq!(stats.hit_rate(), 75.0);
    /// ```
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            (self.hits as f64 / total as f64) * 100.0
        }
    }
}

impl fmt::Display for CacheStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "hits={}, misses={}, evictions={}, entries={}/{}, hit_rate={:.1}%",
            self.hits,
            self.misses,
            self.evictions,
            self.entries,
            self.capacity,
            self.hit_rate()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hit_rate_without_traffic() {
        assert_eq!(CacheStats::default().hit_rate(), 0.0);
    }

    #[test]
    fn test_stats_display() {
        let stats = CacheStats {
            hits: 3,
            misses: 1,
            evictions: 2,
            entries: 4,
            capacity: 4,
        };
        assert_eq!(
            stats.to_string(),
            "hits=3, misses=1, evictions=2, entries=4/4, hit_rate=75.0%"
        );
    }
}
