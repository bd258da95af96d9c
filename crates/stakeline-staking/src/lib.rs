//! Staking core for stakeline.
//!
//! Linked-list hint computation and active-set simulation for the bonding
//! manager, yield projections, round timing, and the delegation service that
//! turns those into contract calls.

pub mod cache;
pub mod delegation;
pub mod hints;
pub mod rewards;
pub mod rounds;
pub mod traits;

use thiserror::Error;

pub use cache::{Cache, Clock, ManualClock, MemoryCache, SystemClock};
pub use delegation::{ContractCall, DelegationService};
pub use hints::{get_hint, simulate_new_active_set_order, ActiveSetChange, StakeAction};
pub use rewards::{YieldCalculation, YieldCalculator, YieldError, YieldRequest};
pub use rounds::{sample_average_block_time, BlockTimeSample, RoundStatusEstimator};
pub use traits::{BlockProvider, CallSubmitter, PriceFeed, RoundsManagerReader, ValidatorSource};

/// Errors that can occur in staking operations
#[derive(Error, Debug)]
pub enum StakingError {
    #[error("Invalid stake amount: {0}")]
    InvalidStakeAmount(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Price feed error: {0}")]
    PriceFeed(String),

    #[error("Chain RPC error: {0}")]
    Chain(String),

    #[error("Validator source error: {0}")]
    ValidatorSource(String),

    #[error("Call submission failed: {0}")]
    Submission(String),

    #[error("Not configured: {0}")]
    Configuration(String),

    #[error(transparent)]
    Common(#[from] stakeline_common::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, StakingError>;
