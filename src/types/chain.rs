// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Strong types for chains, block references and on-chain values
//!
//! These types are shared by the facade, the caches and the resolver so a
//! block height can never be confused with a spec version or a timestamp.

use alloy_primitives::{BlockHash, BlockNumber, Bytes};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Name of a chain as configured by the gateway (e.g. `"polkadot"`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChainId(String);

impl ChainId {
    /// Creates a chain identifier from its configured name
    pub fn new(name: impl AsRef<str>) -> Self {
        Self(name.as_ref().to_string())
    }

    /// Returns the configured name
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ChainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ChainId {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// Role a chain plays in a correlation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChainRole {
    /// The chain whose block reference is supplied by the caller
    Anchor,
    /// The chain whose corresponding block is located
    Derived,
}

impl fmt::Display for ChainRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChainRole::Anchor => f.write_str("anchor"),
            ChainRole::Derived => f.write_str("derived"),
        }
    }
}

/// A block identified either by height or by hash
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockId {
    Height(BlockNumber),
    Hash(BlockHash),
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BlockId::Height(height) => write!(f, "{height}"),
            BlockId::Hash(hash) => write!(f, "{hash}"),
        }
    }
}

impl From<BlockNumber> for BlockId {
    fn from(height: BlockNumber) -> Self {
        BlockId::Height(height)
    }
}

impl From<BlockHash> for BlockId {
    fn from(hash: BlockHash) -> Self {
        BlockId::Hash(hash)
    }
}

/// Error returned when a block identifier cannot be parsed
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid block identifier `{input}`: expected a height or a 0x-prefixed 32 byte hash")]
pub struct ParseBlockIdError {
    input: String,
}

impl FromStr for BlockId {
    type Err = ParseBlockIdError;

    /// Parses the format used by `at`-style query parameters: a decimal
    /// height, or a `0x`-prefixed 32 byte hex hash.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let invalid = || ParseBlockIdError {
            input: s.to_string(),
        };

        if trimmed.starts_with("0x") || trimmed.starts_with("0X") {
            return BlockHash::from_str(trimmed)
                .map(BlockId::Hash)
                .map_err(|_| invalid());
        }

        trimmed
            .parse::<BlockNumber>()
            .map(BlockId::Height)
            .map_err(|_| invalid())
    }
}

/// A block reference scoped to a named chain
///
/// Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlockReference {
    chain: ChainId,
    at: BlockId,
}

impl BlockReference {
    pub fn new(chain: ChainId, at: impl Into<BlockId>) -> Self {
        Self {
            chain,
            at: at.into(),
        }
    }

    pub fn height(chain: ChainId, height: BlockNumber) -> Self {
        Self::new(chain, BlockId::Height(height))
    }

    pub fn hash(chain: ChainId, hash: BlockHash) -> Self {
        Self::new(chain, BlockId::Hash(hash))
    }

    pub fn chain(&self) -> &ChainId {
        &self.chain
    }

    pub fn at(&self) -> BlockId {
        self.at
    }
}

impl fmt::Display for BlockReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.chain, self.at)
    }
}

/// On-chain timestamp in milliseconds since the Unix epoch
///
/// This is the unit of the Substrate `Timestamp::Now` storage item.
///
/// # Examples
///
/// ```
/// use anchorscan::Moment;
///
/// let moment = Moment::from_millis(1_700_000_000_000);
/// assert_eq!(moment.to_string(), "2023-11-14T22:13:20+00:00");
/// ```
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Moment(u64);

impl Moment {
    pub const fn from_millis(millis: u64) -> Self {
        Self(millis)
    }

    pub const fn as_millis(&self) -> u64 {
        self.0
    }

    /// Decodes a SCALE-encoded `u64` storage value (8 bytes, little endian)
    ///
    /// Returns `None` when the value has the wrong length.
    pub fn decode(raw: &[u8]) -> Option<Self> {
        let bytes: [u8; 8] = raw.try_into().ok()?;
        Some(Self(u64::from_le_bytes(bytes)))
    }

    /// Converts to a UTC datetime, if representable
    pub fn to_datetime(&self) -> Option<DateTime<Utc>> {
        i64::try_from(self.0)
            .ok()
            .and_then(DateTime::from_timestamp_millis)
    }
}

impl fmt::Display for Moment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_datetime() {
            Some(dt) => write!(f, "{}", dt.to_rfc3339()),
            None => write!(f, "{}ms", self.0),
        }
    }
}

/// Runtime spec version
///
/// Capabilities are a pure function of this value.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct SpecVersion(u32);

impl SpecVersion {
    pub const fn new(version: u32) -> Self {
        Self(version)
    }

    pub const fn as_u32(&self) -> u32 {
        self.0
    }
}

impl From<u32> for SpecVersion {
    fn from(version: u32) -> Self {
        Self(version)
    }
}

impl fmt::Display for SpecVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Raw key of a storage item
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StorageKey(Bytes);

impl StorageKey {
    pub const fn from_static(key: &'static [u8]) -> Self {
        Self(Bytes::from_static(key))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for StorageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Decoded facts about a block held by the block store
///
/// The resolver stores header facts with an empty `body`; gateway
/// collaborators may cache fully decoded bodies under the same hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockPayload {
    pub height: BlockNumber,
    pub timestamp: Moment,
    pub body: Bytes,
}

impl BlockPayload {
    /// Creates a payload carrying only header facts
    pub fn header(height: BlockNumber, timestamp: Moment) -> Self {
        Self {
            height,
            timestamp,
            body: Bytes::new(),
        }
    }

    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }
}
