use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::traits::BlockProvider;
use crate::{Result, StakingError};

/// Measured block time and the block span it was measured over
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockTimeSample {
    pub average_block_time: f64,
    /// Blocks actually spanned, after clamping to the chain height
    pub samples: u64,
    pub latest_block: u64,
}

/// Average seconds per block over the last `sample_blocks` blocks.
///
/// Costs three RPC calls, so the round status path uses the configured
/// constant instead and this is only used on demand.
pub async fn sample_average_block_time(
    provider: &dyn BlockProvider,
    sample_blocks: u64,
) -> Result<BlockTimeSample> {
    let latest = provider.block_number().await?;
    if latest == 0 {
        return Err(StakingError::Chain("chain has no blocks to sample".into()));
    }

    let span = sample_blocks.clamp(1, latest);
    let oldest = latest - span;

    let (latest_ts, oldest_ts) = futures::try_join!(
        provider.block_timestamp(latest),
        provider.block_timestamp(oldest)
    )?;

    let elapsed = latest_ts - oldest_ts;
    if elapsed <= 0 {
        return Err(StakingError::Chain(format!(
            "block timestamps not increasing between {} and {}",
            oldest, latest
        )));
    }

    let average = elapsed as f64 / span as f64;
    debug!(latest, span, average, "Sampled average block time");
    Ok(BlockTimeSample {
        average_block_time: average,
        samples: span,
        latest_block: latest,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::MockBlockProvider;

    fn provider(latest: u64) -> MockBlockProvider {
        let mut provider = MockBlockProvider::new();
        provider.expect_block_number().returning(move || Ok(latest));
        // 12s blocks starting at t=1_000_000
        provider
            .expect_block_timestamp()
            .returning(|n| Ok(1_000_000 + n as i64 * 12));
        provider
    }

    #[tokio::test]
    async fn test_average_over_sample() {
        let sample = sample_average_block_time(&provider(20_000), 100).await.unwrap();
        assert_eq!(sample.average_block_time, 12.0);
        assert_eq!(sample.samples, 100);
        assert_eq!(sample.latest_block, 20_000);
    }

    #[tokio::test]
    async fn test_sample_clamped_to_chain_height() {
        let sample = sample_average_block_time(&provider(10), 1000).await.unwrap();
        assert_eq!(sample.average_block_time, 12.0);
        assert_eq!(sample.samples, 10);
        let sample = sample_average_block_time(&provider(10), 0).await.unwrap();
        assert_eq!(sample.average_block_time, 12.0);
        assert_eq!(sample.samples, 1);
    }

    #[tokio::test]
    async fn test_empty_chain_errors() {
        let mut provider = MockBlockProvider::new();
        provider.expect_block_number().returning(|| Ok(0));
        assert!(sample_average_block_time(&provider, 10).await.is_err());
    }

    #[tokio::test]
    async fn test_non_increasing_timestamps_error() {
        let mut provider = MockBlockProvider::new();
        provider.expect_block_number().returning(|| Ok(50));
        provider.expect_block_timestamp().returning(|_| Ok(1_000));
        assert!(matches!(
            sample_average_block_time(&provider, 10).await,
            Err(StakingError::Chain(_))
        ));
    }
}
