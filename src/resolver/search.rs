// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Timestamp binary search over derived-chain heights

use alloy_primitives::{BlockHash, BlockNumber};
use async_trait::async_trait;
use tracing::{trace, Instrument};

use crate::errors::ResolveError;
use crate::tracing::spans;
use crate::types::chain::{ChainId, Moment};

/// A derived block whose timestamp was read during the search
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ProbedBlock {
    pub height: BlockNumber,
    pub hash: BlockHash,
    pub timestamp: Moment,
}

/// Source of derived-chain timestamps by height
#[async_trait]
pub(crate) trait TimestampSource: Send + Sync {
    async fn probe(&self, height: BlockNumber) -> Result<ProbedBlock, ResolveError>;
}

/// Final bracket of a successful search
///
/// `lo` is the latest block with a timestamp at or before the target. `hi`,
/// when the search observed one, is the block right after it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Bracket {
    pub lo: ProbedBlock,
    pub hi: Option<ProbedBlock>,
}

/// Finds the latest height in `[0, best]` whose timestamp is `<= target`
///
/// Ties resolve to the highest height. Returns `Ok(None)` when even height 0
/// is later than `target`.
///
/// # Binary Search Invariants
///
/// - **Loop invariant**: all heights below `low` have timestamp <= target
/// - **Loop invariant**: all heights above `high` have timestamp > target
/// - **Termination**: `low` and `high` cross after O(log2(best)) probes
///
/// These only hold on a chain whose timestamps never decrease. The bracket is
/// re-checked against every observed timestamp before it is returned, and a
/// violation fails the search instead of returning a wrong block.
pub(crate) async fn find_last_at_or_before<S>(
    source: &S,
    chain: &ChainId,
    best: BlockNumber,
    target: Moment,
) -> Result<Option<Bracket>, ResolveError>
where
    S: TimestampSource + ?Sized,
{
    let mut low = 0u64;
    let mut high = best;
    let mut lo: Option<ProbedBlock> = None;
    let mut hi: Option<ProbedBlock> = None;
    let mut observed: Vec<ProbedBlock> = Vec::new();

    while low <= high {
        let mid = low + (high - low) / 2;
        let block = source
            .probe(mid)
            .instrument(spans::probe_derived_height(chain, mid))
            .await?;
        trace!(height = mid, timestamp_ms = block.timestamp.as_millis(), "Probed derived height");
        observed.push(block);

        if block.timestamp <= target {
            // Candidate; later heights may also qualify
            lo = Some(block);
            match mid.checked_add(1) {
                Some(next) => low = next,
                None => break,
            }
        } else {
            hi = Some(block);
            if mid == 0 {
                break;
            }
            high = mid - 1;
        }
    }

    let Some(lo) = lo else {
        return Ok(None);
    };

    verify_bracket(chain, target, lo, hi, &mut observed)?;
    Ok(Some(Bracket { lo, hi }))
}

/// Checks that the bracket is consistent with every observed timestamp
fn verify_bracket(
    chain: &ChainId,
    target: Moment,
    lo: ProbedBlock,
    hi: Option<ProbedBlock>,
    observed: &mut [ProbedBlock],
) -> Result<(), ResolveError> {
    if lo.timestamp > target {
        return Err(ResolveError::invariant_violated(
            chain.clone(),
            format!(
                "height {} has timestamp {} after target {}",
                lo.height,
                lo.timestamp.as_millis(),
                target.as_millis()
            ),
        ));
    }

    if let Some(hi) = hi {
        if hi.height != lo.height + 1 || hi.timestamp <= target {
            return Err(ResolveError::invariant_violated(
                chain.clone(),
                format!(
                    "bracket [{}, {}] does not straddle target {}",
                    lo.height,
                    hi.height,
                    target.as_millis()
                ),
            ));
        }
    }

    observed.sort_unstable_by_key(|block| block.height);
    for pair in observed.windows(2) {
        let (earlier, later) = (pair[0], pair[1]);
        if later.timestamp < earlier.timestamp {
            return Err(ResolveError::invariant_violated(
                chain.clone(),
                format!(
                    "timestamp decreases between heights {} and {}",
                    earlier.height, later.height
                ),
            ));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Chain whose block at height `h` has timestamp `timestamps[h]`
    struct VecChain {
        timestamps: Vec<u64>,
        probes: AtomicUsize,
    }

    impl VecChain {
        fn new(timestamps: Vec<u64>) -> Self {
            Self {
                timestamps,
                probes: AtomicUsize::new(0),
            }
        }

        fn best(&self) -> BlockNumber {
            self.timestamps.len() as u64 - 1
        }
    }

    #[async_trait]
    impl TimestampSource for VecChain {
        async fn probe(&self, height: BlockNumber) -> Result<ProbedBlock, ResolveError> {
            self.probes.fetch_add(1, Ordering::SeqCst);
            Ok(ProbedBlock {
                height,
                hash: BlockHash::with_last_byte(height as u8),
                timestamp: Moment::from_millis(self.timestamps[height as usize]),
            })
        }
    }

    fn chain() -> ChainId {
        ChainId::new("asset-hub-polkadot")
    }

    async fn search(source: &VecChain, target: u64) -> Result<Option<Bracket>, ResolveError> {
        find_last_at_or_before(source, &chain(), source.best(), Moment::from_millis(target)).await
    }

    #[tokio::test]
    async fn test_finds_latest_block_at_or_before() {
        // Heights 0..=20; 10..=20 run 4800..=5300 in steps of 50
        let timestamps: Vec<u64> = (0..=20u64)
            .map(|h| if h < 10 { 4000 + h * 50 } else { 4800 + (h - 10) * 50 })
            .collect();
        let source = VecChain::new(timestamps);

        let bracket = search(&source, 5000).await.unwrap().unwrap();
        assert_eq!(bracket.lo.height, 14);
        assert_eq!(bracket.lo.timestamp, Moment::from_millis(5000));
        assert_eq!(bracket.hi.map(|b| b.height), Some(15));
        assert!(source.probes.load(Ordering::SeqCst) <= 6);
    }

    #[tokio::test]
    async fn test_ties_resolve_to_highest_height() {
        let source = VecChain::new(vec![100, 200, 200, 200, 300]);
        let bracket = search(&source, 200).await.unwrap().unwrap();
        assert_eq!(bracket.lo.height, 3);
    }

    #[tokio::test]
    async fn test_target_before_genesis() {
        let source = VecChain::new(vec![6000, 6050, 6100]);
        assert_eq!(search(&source, 5000).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_target_after_best() {
        let source = VecChain::new(vec![10, 20, 30]);
        let bracket = search(&source, 1_000).await.unwrap().unwrap();
        assert_eq!(bracket.lo.height, 2);
        assert_eq!(bracket.hi, None);
    }

    #[tokio::test]
    async fn test_single_block_chain() {
        let source = VecChain::new(vec![10]);
        assert_eq!(search(&source, 10).await.unwrap().unwrap().lo.height, 0);
        assert_eq!(search(&source, 9).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_decreasing_timestamp_fails_closed() {
        // Height 3 goes backwards in time after height 2 was probed
        let source = VecChain::new(vec![50, 60, 240, 100, 500]);
        let error = search(&source, 250).await.unwrap_err();
        assert!(matches!(
            error,
            ResolveError::CorrelationInvariantViolated { .. }
        ));
    }

    proptest! {
        #[test]
        fn prop_matches_linear_scan(
            deltas in prop::collection::vec(0u64..100, 1..200),
            start in 0u64..10_000,
            target in 0u64..30_000,
        ) {
            let timestamps: Vec<u64> = deltas
                .iter()
                .scan(start, |ts, delta| {
                    *ts += delta;
                    Some(*ts)
                })
                .collect();
            let expected = timestamps.iter().rposition(|ts| *ts <= target);
            let source = VecChain::new(timestamps);

            let runtime = tokio::runtime::Builder::new_current_thread()
                .build()
                .unwrap();
            let found = runtime.block_on(search(&source, target)).unwrap();

            prop_assert_eq!(found.map(|bracket| bracket.lo.height as usize), expected);
            if let Some(bracket) = found {
                prop_assert!(bracket.lo.timestamp.as_millis() <= target);
                if let Some(hi) = bracket.hi {
                    prop_assert!(hi.timestamp.as_millis() > target);
                }
            }
        }
    }
}
