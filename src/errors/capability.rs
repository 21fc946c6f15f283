//! Error types for runtime capability checks.

use alloy_primitives::BlockHash;

use super::{ClientError, InFlightAborted};
use crate::types::chain::SpecVersion;

/// Errors that can occur while checking whether a runtime API is available.
///
/// A negative probe outcome is *not* an error: it is recorded as
/// "unsupported" and returned as `Ok(false)`. These variants cover failures
/// that prevented a probe from producing an outcome at all, which are never
/// cached.
#[derive(Debug, Clone, thiserror::Error)]
pub enum CapabilityError {
    /// The probe could not reach the chain.
    #[error("Capability probe for spec version {spec_version} failed: {source}")]
    Probe {
        spec_version: SpecVersion,
        #[source]
        source: ClientError,
    },

    /// The runtime spec version of a block could not be read.
    #[error("Failed to read runtime spec version at {at}: {source}")]
    SpecVersionLookup {
        at: BlockHash,
        #[source]
        source: ClientError,
    },

    /// No optional runtime API is configured to probe for.
    #[error("No optional runtime API configured")]
    NotConfigured,

    /// The shared probe stopped without producing a result.
    #[error(transparent)]
    Aborted(#[from] InFlightAborted),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::FacadeOperation;
    use crate::types::chain::ChainId;
    use std::time::Duration;

    #[test]
    fn test_probe_error_keeps_source() {
        let error = CapabilityError::Probe {
            spec_version: SpecVersion::new(1_004_000),
            source: ClientError::timeout(
                ChainId::new("asset-hub-polkadot"),
                FacadeOperation::CallRuntimeApi,
                Duration::from_secs(30),
            ),
        };
        assert!(error.to_string().contains("spec version 1004000"));
        assert!(std::error::Error::source(&error).is_some());
    }

    #[test]
    fn test_aborted_is_transparent() {
        let error = CapabilityError::from(InFlightAborted::new(SpecVersion::new(601)));
        assert_eq!(
            error.to_string(),
            "In-flight computation for 601 ended without a result"
        );
    }
}
