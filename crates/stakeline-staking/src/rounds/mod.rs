//! Reward round timing

mod block_time;
mod status;

pub use block_time::{sample_average_block_time, BlockTimeSample};
pub use status::{estimate_round_status, RoundReadings, RoundStatusEstimator};
