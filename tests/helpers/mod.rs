// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Test helpers for anchorscan integration tests
//!
//! Provides a mock chain client serving synthetic chains, so resolution and
//! capability logic can be tested without a node.

#![allow(dead_code)]

use alloy_primitives::{BlockHash, BlockNumber, Bytes};
use anchorscan::{ChainClient, ChainId, ClientError, FacadeOperation, SpecVersion, StorageKey};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use std::time::Duration;

pub const RELAY: &str = "polkadot";
pub const ASSET_HUB: &str = "asset-hub-polkadot";

/// Storage value of a synthetic block's timestamp
#[derive(Debug, Clone)]
enum TimestampValue {
    Millis(u64),
    Raw(Vec<u8>),
    Absent,
}

#[derive(Debug)]
struct MockChain {
    index: u8,
    timestamps: Vec<TimestampValue>,
    finalized: BlockNumber,
    /// Non-canonical blocks: hash -> (height, timestamp)
    forks: HashMap<BlockHash, (BlockNumber, u64)>,
}

/// Mock ChainClient serving synthetic chains
///
/// Block `h` of the `i`-th registered chain has a deterministic hash, see
/// [`MockChainClient::hash_of`]. Every call is counted per facade primitive.
///
/// # Example
///
/// ```rust,ignore
/// let client = MockChainClient::new()
///     .with_chain(RELAY, (0..=1000).map(|h| h * 5).collect())
///     .with_chain(ASSET_HUB, (0..=20).map(|h| 4300 + h * 50).collect())
///     .with_finalized(RELAY, 999);
/// ```
#[derive(Debug, Default)]
pub struct MockChainClient {
    chains: HashMap<ChainId, MockChain>,
    delay: Duration,
    spec_version: u32,
    optional_api_from: Option<u32>,
    stalled: AtomicBool,
    unavailable: AtomicBool,
    /// Heights whose next `block_hash` still answers with the fork block
    pending_reorgs: Mutex<HashSet<(ChainId, BlockNumber)>>,
    calls: Mutex<HashMap<FacadeOperation, usize>>,
}

impl MockChainClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a chain whose block `h` has timestamp `timestamps[h]`
    ///
    /// The best and finalized heights are the last block.
    pub fn with_chain(mut self, name: &str, timestamps: Vec<u64>) -> Self {
        let index = self.chains.len() as u8 + 1;
        let finalized = timestamps.len().saturating_sub(1) as BlockNumber;
        self.chains.insert(
            ChainId::new(name),
            MockChain {
                index,
                timestamps: timestamps.into_iter().map(TimestampValue::Millis).collect(),
                finalized,
                forks: HashMap::new(),
            },
        );
        self
    }

    pub fn with_finalized(mut self, name: &str, height: BlockNumber) -> Self {
        if let Some(chain) = self.chains.get_mut(&ChainId::new(name)) {
            chain.finalized = height;
        }
        self
    }

    /// Stores `raw` as the timestamp storage value of block `height`
    pub fn with_raw_timestamp(mut self, name: &str, height: BlockNumber, raw: Vec<u8>) -> Self {
        if let Some(chain) = self.chains.get_mut(&ChainId::new(name)) {
            chain.timestamps[height as usize] = TimestampValue::Raw(raw);
        }
        self
    }

    /// Leaves the timestamp of block `height` without a storage value
    pub fn with_absent_timestamp(mut self, name: &str, height: BlockNumber) -> Self {
        if let Some(chain) = self.chains.get_mut(&ChainId::new(name)) {
            chain.timestamps[height as usize] = TimestampValue::Absent;
        }
        self
    }

    /// Adds a non-canonical block at `height` with its own timestamp
    ///
    /// The block is known to `block_height` and `read_storage`, but
    /// `block_hash` answers with the canonical block. See
    /// [`MockChainClient::fork_hash_of`].
    pub fn with_fork_block(mut self, name: &str, height: BlockNumber, timestamp: u64) -> Self {
        if let Some(chain) = self.chains.get_mut(&ChainId::new(name)) {
            let hash = fork_hash(chain.index, height);
            chain.forks.insert(hash, (height, timestamp));
        }
        self
    }

    /// Answers the next `block_hash` at `height` with the fork block, then
    /// switches to the canonical block
    ///
    /// Models a reorg landing while a resolution is in progress. Requires
    /// [`MockChainClient::with_fork_block`] at the same height.
    pub fn with_pending_reorg(self, name: &str, height: BlockNumber) -> Self {
        self.pending_reorgs
            .lock()
            .unwrap()
            .insert((ChainId::new(name), height));
        self
    }

    /// Delays every call by `delay`
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Spec version of every block's runtime
    pub fn with_spec_version(mut self, spec_version: u32) -> Self {
        self.spec_version = spec_version;
        self
    }

    /// Runtime API calls succeed from `spec_version` onwards
    pub fn with_optional_api_from(mut self, spec_version: u32) -> Self {
        self.optional_api_from = Some(spec_version);
        self
    }

    /// Makes every subsequent call hang until unstalled
    pub fn set_stalled(&self, stalled: bool) {
        self.stalled.store(stalled, Ordering::SeqCst);
    }

    /// Makes every subsequent call fail with a connection error
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Hash of block `height` on chain `name`
    pub fn hash_of(&self, name: &str, height: BlockNumber) -> BlockHash {
        let index = self.chains[&ChainId::new(name)].index;
        mock_hash(index, height)
    }

    /// Hash of the fork block at `height` on chain `name`
    pub fn fork_hash_of(&self, name: &str, height: BlockNumber) -> BlockHash {
        let index = self.chains[&ChainId::new(name)].index;
        fork_hash(index, height)
    }

    /// Number of calls made to `operation`
    pub fn calls_of(&self, operation: FacadeOperation) -> usize {
        self.calls
            .lock()
            .unwrap()
            .get(&operation)
            .copied()
            .unwrap_or(0)
    }

    /// Number of calls made to any primitive
    pub fn total_calls(&self) -> usize {
        self.calls.lock().unwrap().values().sum()
    }

    async fn enter(&self, chain: &ChainId, operation: FacadeOperation) -> Result<(), ClientError> {
        *self.calls.lock().unwrap().entry(operation).or_insert(0) += 1;

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        if self.stalled.load(Ordering::SeqCst) {
            tokio::time::sleep(Duration::from_secs(3600)).await;
        }
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(ClientError::unavailable(
                chain.clone(),
                operation,
                std::io::Error::other("connection refused"),
            ));
        }
        Ok(())
    }

    fn chain(&self, chain: &ChainId) -> &MockChain {
        &self.chains[chain]
    }

    fn height_of(&self, chain: &ChainId, hash: BlockHash) -> Option<BlockNumber> {
        let mock = self.chain(chain);
        if let Some((height, _)) = mock.forks.get(&hash) {
            return Some(*height);
        }
        let height = BlockNumber::from_be_bytes(hash.0[24..].try_into().ok()?);
        (mock_hash(mock.index, height) == hash && (height as usize) < mock.timestamps.len())
            .then_some(height)
    }
}

fn fork_hash(index: u8, height: BlockNumber) -> BlockHash {
    let mut hash = mock_hash(index, height);
    hash.0[1] = 0xff;
    hash
}

fn mock_hash(index: u8, height: BlockNumber) -> BlockHash {
    let mut bytes = [0u8; 32];
    bytes[0] = index;
    bytes[24..].copy_from_slice(&height.to_be_bytes());
    BlockHash::from(bytes)
}

#[async_trait]
impl ChainClient for MockChainClient {
    async fn block_hash(
        &self,
        chain: &ChainId,
        height: BlockNumber,
    ) -> Result<Option<BlockHash>, ClientError> {
        self.enter(chain, FacadeOperation::BlockHash).await?;
        let mock = self.chain(chain);
        if self
            .pending_reorgs
            .lock()
            .unwrap()
            .remove(&(chain.clone(), height))
        {
            return Ok(Some(fork_hash(mock.index, height)));
        }
        Ok(((height as usize) < mock.timestamps.len()).then(|| mock_hash(mock.index, height)))
    }

    async fn block_height(
        &self,
        chain: &ChainId,
        hash: BlockHash,
    ) -> Result<Option<BlockNumber>, ClientError> {
        self.enter(chain, FacadeOperation::BlockHeight).await?;
        Ok(self.height_of(chain, hash))
    }

    async fn read_storage(
        &self,
        chain: &ChainId,
        at: BlockHash,
        _key: &StorageKey,
    ) -> Result<Option<Bytes>, ClientError> {
        self.enter(chain, FacadeOperation::ReadStorage).await?;
        if let Some((_, ms)) = self.chain(chain).forks.get(&at) {
            return Ok(Some(Bytes::from(ms.to_le_bytes().to_vec())));
        }
        let Some(height) = self.height_of(chain, at) else {
            return Ok(None);
        };
        let value = match &self.chain(chain).timestamps[height as usize] {
            TimestampValue::Millis(ms) => Some(Bytes::from(ms.to_le_bytes().to_vec())),
            TimestampValue::Raw(raw) => Some(Bytes::from(raw.clone())),
            TimestampValue::Absent => None,
        };
        Ok(value)
    }

    async fn best_height(&self, chain: &ChainId) -> Result<BlockNumber, ClientError> {
        self.enter(chain, FacadeOperation::BestHeight).await?;
        Ok(self.chain(chain).timestamps.len().saturating_sub(1) as BlockNumber)
    }

    async fn finalized_height(&self, chain: &ChainId) -> Result<BlockNumber, ClientError> {
        self.enter(chain, FacadeOperation::FinalizedHeight).await?;
        Ok(self.chain(chain).finalized)
    }

    async fn runtime_spec_version(
        &self,
        chain: &ChainId,
        _at: BlockHash,
    ) -> Result<SpecVersion, ClientError> {
        self.enter(chain, FacadeOperation::RuntimeSpecVersion).await?;
        Ok(SpecVersion::new(self.spec_version))
    }

    async fn call_runtime_api(
        &self,
        chain: &ChainId,
        at: BlockHash,
        method: &str,
        _params: &[u8],
    ) -> Result<Bytes, ClientError> {
        self.enter(chain, FacadeOperation::CallRuntimeApi).await?;
        match self.optional_api_from {
            Some(from) if self.spec_version >= from => Ok(Bytes::from_static(&[0x01])),
            _ => Err(ClientError::runtime_api(
                chain.clone(),
                at,
                method,
                format!("{method} not found in runtime {}", self.spec_version),
            )),
        }
    }
}

/// Anchor chain: block `h` at `5 * h` ms, heights 0..=1000
pub fn relay_timestamps() -> Vec<u64> {
    (0..=1000).map(|h| h * 5).collect()
}

/// Derived chain: block `h` at `4300 + 50 * h` ms, heights 0..=20
///
/// Heights 10..=20 span 4800..=5300.
pub fn asset_hub_timestamps() -> Vec<u64> {
    (0..=20).map(|h| 4300 + h * 50).collect()
}

/// Relay and Asset Hub chains with the timestamps above
pub fn scenario_client() -> MockChainClient {
    MockChainClient::new()
        .with_chain(RELAY, relay_timestamps())
        .with_chain(ASSET_HUB, asset_hub_timestamps())
}

pub fn relay() -> ChainId {
    ChainId::new(RELAY)
}

pub fn asset_hub() -> ChainId {
    ChainId::new(ASSET_HUB)
}

/// Installs a fmt subscriber honoring `RUST_LOG`; safe to call repeatedly
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
