use std::sync::Arc;

use stakeline_common::utils::current_timestamp;
use stakeline_common::RoundStatus;
use tracing::debug;

use crate::traits::{BlockProvider, RoundsManagerReader};
use crate::{Result, StakingError};

const SECONDS_PER_HOUR: f64 = 3600.0;

/// Raw on-chain values a status is derived from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoundReadings {
    pub current_round: u64,
    pub round_length: u64,
    pub start_block: u64,
    pub initialized: bool,
    pub current_block: u64,
}

/// Estimates when the current round ends.
///
/// Remaining blocks are turned into wall-clock time with a fixed average
/// block time from configuration; the status path never samples recent
/// blocks (see [`crate::rounds::sample_average_block_time`]).
pub struct RoundStatusEstimator {
    rounds_manager: Option<Arc<dyn RoundsManagerReader>>,
    blocks: Option<Arc<dyn BlockProvider>>,
    average_block_time: f64,
}

impl RoundStatusEstimator {
    pub fn new(
        rounds_manager: Option<Arc<dyn RoundsManagerReader>>,
        blocks: Option<Arc<dyn BlockProvider>>,
        average_block_time: f64,
    ) -> Self {
        Self {
            rounds_manager,
            blocks,
            average_block_time,
        }
    }

    pub fn average_block_time(&self) -> f64 {
        self.average_block_time
    }

    pub fn block_provider(&self) -> Option<Arc<dyn BlockProvider>> {
        self.blocks.clone()
    }

    pub async fn status(&self) -> Result<RoundStatus> {
        self.status_at(current_timestamp()).await
    }

    /// `now` is unix seconds.
    pub async fn status_at(&self, now: i64) -> Result<RoundStatus> {
        let rounds = self.rounds_manager.as_ref().ok_or_else(|| {
            StakingError::Configuration("rounds manager contract is not configured".into())
        })?;
        let blocks = self.blocks.as_ref().ok_or_else(|| {
            StakingError::Configuration("settlement chain block provider is not configured".into())
        })?;

        let (current_round, round_length, start_block, initialized) = futures::try_join!(
            rounds.current_round(),
            rounds.round_length(),
            rounds.current_round_start_block(),
            rounds.current_round_initialized()
        )?;
        let current_block = blocks.block_number().await?;

        let readings = RoundReadings {
            current_round,
            round_length,
            start_block,
            // contracts without the flag are treated as initialized
            initialized: initialized.unwrap_or(true),
            current_block,
        };
        debug!(?readings, "Read round state");

        Ok(estimate_round_status(readings, self.average_block_time, now))
    }
}

pub fn estimate_round_status(readings: RoundReadings, average_block_time: f64, now: i64) -> RoundStatus {
    let elapsed = readings.current_block.saturating_sub(readings.start_block);
    let blocks_remaining = if readings.initialized && readings.round_length > 0 {
        readings.round_length.saturating_sub(elapsed)
    } else {
        0
    };

    let seconds_remaining = (blocks_remaining as f64 * average_block_time).max(0.0);
    let hours = seconds_remaining / SECONDS_PER_HOUR;
    let hours_rounded = hours.round() as u64;

    RoundStatus {
        current_round: readings.current_round,
        round_length: readings.round_length,
        start_block: readings.start_block,
        current_block: readings.current_block,
        initialized: readings.initialized,
        blocks_into_round: elapsed,
        blocks_remaining,
        average_block_time,
        estimated_next_round_at: now + seconds_remaining.ceil() as i64,
        estimated_hours: (hours * 10.0).round() / 10.0,
        estimated_hours_rounded: hours_rounded,
        estimated_time_text: describe_hours(hours_rounded),
    }
}

fn describe_hours(hours: u64) -> String {
    match hours {
        0 => "less than an hour".to_string(),
        1 => "1 hour".to_string(),
        n => format!("{} hours", n),
    }
}
