//! Error types for shared cache machinery.

/// A coalesced computation ended without delivering a result.
///
/// Only reachable if the task running the computation panicked or the
/// runtime shut down underneath it. Waiters receive this error instead of
/// hanging; nothing is cached for the key.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("In-flight computation for {key} ended without a result")]
pub struct InFlightAborted {
    /// Display form of the key whose computation was lost
    pub key: String,
}

impl InFlightAborted {
    pub fn new(key: impl std::fmt::Display) -> Self {
        Self {
            key: key.to_string(),
        }
    }
}
