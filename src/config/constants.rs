//! Well-known storage keys and default limits
//!
//! This module centralizes magic constants used throughout the anchorscan
//! crate, improving discoverability and maintainability.

use std::time::Duration;

use crate::types::chain::StorageKey;

/// Raw bytes of the `Timestamp::Now` storage key
///
/// `twox128("Timestamp") ++ twox128("Now")`. The value is a SCALE `u64`
/// holding milliseconds since the Unix epoch.
const TIMESTAMP_NOW_KEY: [u8; 32] =
    alloy_primitives::hex!("f0c365c3cf59d671eb72da0e7a4113c49f1f0515f462cdcf84e0f1d6045dfcbb");

/// Storage key of the on-chain timestamp read by the resolver
pub const TIMESTAMP_NOW: StorageKey = StorageKey::from_static(&TIMESTAMP_NOW_KEY);

/// Default number of decoded blocks held by the block store
pub const DEFAULT_BLOCK_STORE_CAPACITY: usize = 1_000;

/// Default number of memoized anchor resolutions
pub const DEFAULT_RESOLUTION_CACHE_CAPACITY: usize = 10_000;

/// Default number of spec versions remembered by the capability cache
pub const DEFAULT_CAPABILITY_CACHE_CAPACITY: usize = 256;

/// Default upper bound for a single facade call
pub const DEFAULT_FACADE_TIMEOUT: Duration = Duration::from_secs(30);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timestamp_now_key() {
        assert_eq!(TIMESTAMP_NOW.as_bytes().len(), 32);
        assert_eq!(
            TIMESTAMP_NOW.to_string(),
            "0xf0c365c3cf59d671eb72da0e7a4113c49f1f0515f462cdcf84e0f1d6045dfcbb"
        );
    }

    #[test]
    fn test_defaults_are_positive() {
        assert!(DEFAULT_BLOCK_STORE_CAPACITY > 0);
        assert!(DEFAULT_RESOLUTION_CACHE_CAPACITY > 0);
        assert!(DEFAULT_CAPABILITY_CACHE_CAPACITY > 0);
        assert!(!DEFAULT_FACADE_TIMEOUT.is_zero());
    }
}
