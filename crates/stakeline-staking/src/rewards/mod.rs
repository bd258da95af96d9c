//! Yield projections for delegated stake

mod calculation;
mod price;

pub use calculation::{
    compounding_cycle_days, project, MarketValue, NativeAmounts, NumericInput, PeriodYield,
    Projection, YieldCalculation, YieldCalculator, YieldError, YieldRequest,
    ROUND_DURATION_HOURS,
};
pub use price::CachedPriceFeed;
