//! Compounded yield projections.
//!
//! Rewards compound once per protocol round. A calendar period is converted to
//! a (fractional) number of rounds and the annual rate is de-annualized to a
//! per-round rate with compound interest. The fractional round count makes
//! this a continuous approximation of discrete reward events; outputs are
//! display estimates and use `f64`, unlike the exact stake simulator.
//!
//! All compounding happens in native-token units. Fiat figures are derived
//! from the native result with the same unit price used to convert the
//! principal.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use stakeline_common::{Currency, YieldPeriod};
use thiserror::Error;
use tracing::{debug, warn};

use crate::traits::PriceFeed;

/// One protocol round: 21 hours 40 minutes.
pub const ROUND_DURATION_HOURS: f64 = 21.0 + 40.0 / 60.0;

const DAYS_PER_YEAR: f64 = 365.0;

pub fn compounding_cycle_days() -> f64 {
    ROUND_DURATION_HOURS / 24.0
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum YieldError {
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Invalid APY: {0}")]
    InvalidApy(String),

    #[error("Invalid period: {0}")]
    InvalidPeriod(String),

    #[error("Invalid currency: {0}")]
    InvalidCurrency(String),

    #[error("Result out of range: {0}")]
    OutOfRange(String),

    #[error("Price unavailable for {currency}: {reason}")]
    PriceUnavailable { currency: Currency, reason: String },
}

/// A number sent either as JSON number or string ("1000", "12.5%").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NumericInput {
    Number(f64),
    Text(String),
}

impl From<f64> for NumericInput {
    fn from(value: f64) -> Self {
        NumericInput::Number(value)
    }
}

impl From<&str> for NumericInput {
    fn from(value: &str) -> Self {
        NumericInput::Text(value.to_string())
    }
}

impl NumericInput {
    fn parse(&self, strip_percent: bool) -> Option<f64> {
        let value = match self {
            NumericInput::Number(n) => *n,
            NumericInput::Text(s) => {
                let s = s.trim();
                let s = if strip_percent {
                    s.strip_suffix('%').unwrap_or(s).trim_end()
                } else {
                    s
                };
                s.parse::<f64>().ok()?
            }
        };
        value.is_finite().then_some(value)
    }

    fn describe(&self) -> String {
        match self {
            NumericInput::Number(n) => n.to_string(),
            NumericInput::Text(s) => format!("'{}'", s),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YieldRequest {
    pub amount: NumericInput,
    pub apy: NumericInput,
    /// One of the fixed periods; all periods when absent
    #[serde(default)]
    pub period: Option<String>,
    /// Attach the market value block for fiat currencies (default true)
    #[serde(default)]
    pub include_currency_conversion: Option<bool>,
    /// USD when absent
    #[serde(default)]
    pub currency: Option<String>,
}

impl YieldRequest {
    pub fn new(amount: impl Into<NumericInput>, apy: impl Into<NumericInput>) -> Self {
        Self {
            amount: amount.into(),
            apy: apy.into(),
            period: None,
            include_currency_conversion: None,
            currency: None,
        }
    }

    pub fn period(mut self, period: &str) -> Self {
        self.period = Some(period.to_string());
        self
    }

    pub fn currency(mut self, currency: &str) -> Self {
        self.currency = Some(currency.to_string());
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    pub compounding_periods: f64,
    pub periodic_rate: f64,
    pub final_amount: f64,
    pub reward_amount: f64,
}

/// Compounds `principal` at `apy` percent over `days`, once per round.
pub fn project(principal: f64, apy: f64, days: f64) -> Projection {
    let cycle_days = compounding_cycle_days();
    let compounding_periods = days / cycle_days;
    let periodic_rate = (1.0 + apy / 100.0).powf(cycle_days / DAYS_PER_YEAR) - 1.0;
    let final_amount = principal * (1.0 + periodic_rate).powf(compounding_periods);

    Projection {
        compounding_periods,
        periodic_rate,
        final_amount,
        reward_amount: final_amount - principal,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NativeAmounts {
    pub principal: f64,
    pub final_amount: f64,
    pub reward_amount: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodYield {
    pub period: YieldPeriod,
    pub days: f64,
    pub compounding_periods: f64,
    pub periodic_rate: f64,
    /// In the requested currency
    pub final_amount: f64,
    pub reward_amount: f64,
    /// Native-token figures behind a fiat result
    #[serde(skip_serializing_if = "Option::is_none")]
    pub native: Option<NativeAmounts>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketValue {
    pub currency: Currency,
    /// Native-token unit price in `currency`
    pub price: f64,
    /// Units of `currency` per USD, for non-USD fiat
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exchange_rate: Option<f64>,
    pub principal_native: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YieldCalculation {
    pub initial_amount: f64,
    pub apy: f64,
    pub currency: Currency,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub market_value: Option<MarketValue>,
    pub periods: Vec<PeriodYield>,
}

/// Large but valid inputs can overflow `f64`; never report those as numbers.
fn finite(what: &str, value: f64) -> Result<f64, YieldError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(YieldError::OutOfRange(format!("{} is not representable ({})", what, value)))
    }
}

pub struct YieldCalculator {
    price_feed: Arc<dyn PriceFeed>,
}

impl YieldCalculator {
    pub fn new(price_feed: Arc<dyn PriceFeed>) -> Self {
        Self { price_feed }
    }

    /// Validation and price failures come back as `YieldError`; a failed
    /// price lookup aborts the whole calculation rather than mixing units.
    pub async fn calculate(&self, request: &YieldRequest) -> Result<YieldCalculation, YieldError> {
        let amount = request
            .amount
            .parse(false)
            .filter(|a| *a > 0.0)
            .ok_or_else(|| {
                YieldError::InvalidAmount(format!(
                    "{} must be a positive number",
                    request.amount.describe()
                ))
            })?;

        let apy = request
            .apy
            .parse(true)
            .filter(|a| *a > 0.0)
            .ok_or_else(|| {
                YieldError::InvalidApy(format!(
                    "{} must be a positive number or percentage",
                    request.apy.describe()
                ))
            })?;

        let periods = match request.period.as_deref() {
            Some(period) => vec![period
                .parse::<YieldPeriod>()
                .map_err(|e| YieldError::InvalidPeriod(e.to_string()))?],
            None => YieldPeriod::ALL.to_vec(),
        };

        let currency = match request.currency.as_deref() {
            Some(code) => code
                .parse::<Currency>()
                .map_err(|e| YieldError::InvalidCurrency(e.to_string()))?,
            None => Currency::default(),
        };

        let (price, exchange_rate) = self.prices(currency).await?;
        let principal_native = finite("native principal", amount / price)?;

        debug!(amount, apy, %currency, price, "Calculating yield");

        let periods = periods
            .into_iter()
            .map(|period| {
                let projection = project(principal_native, apy, period.days());
                let final_native = finite("final amount", projection.final_amount)?;
                let reward_native = finite("reward amount", projection.reward_amount)?;

                Ok(PeriodYield {
                    period,
                    days: period.days(),
                    compounding_periods: projection.compounding_periods,
                    periodic_rate: finite("periodic rate", projection.periodic_rate)?,
                    final_amount: finite("final amount", final_native * price)?,
                    reward_amount: finite("reward amount", reward_native * price)?,
                    native: (!currency.is_native()).then_some(NativeAmounts {
                        principal: principal_native,
                        final_amount: final_native,
                        reward_amount: reward_native,
                    }),
                })
            })
            .collect::<Result<Vec<_>, YieldError>>()?;

        let market_value = (!currency.is_native()
            && request.include_currency_conversion.unwrap_or(true))
        .then(|| MarketValue {
            currency,
            price,
            exchange_rate,
            principal_native,
        });

        Ok(YieldCalculation {
            initial_amount: amount,
            apy,
            currency,
            market_value,
            periods,
        })
    }

    /// Unit price in `currency` and, for non-USD fiat, the rate against USD.
    async fn prices(&self, currency: Currency) -> Result<(f64, Option<f64>), YieldError> {
        if currency.is_native() {
            return Ok((1.0, None));
        }

        let price = self.lookup(currency).await?;
        let exchange_rate = match currency {
            Currency::Usd | Currency::Lpt => None,
            Currency::Gbp | Currency::Ngn => Some(price / self.lookup(Currency::Usd).await?),
        };

        Ok((price, exchange_rate))
    }

    async fn lookup(&self, currency: Currency) -> Result<f64, YieldError> {
        match self.price_feed.price(currency).await {
            Ok(price) if price.is_finite() && price > 0.0 => Ok(price),
            Ok(price) => Err(YieldError::PriceUnavailable {
                currency,
                reason: format!("feed returned unusable price {}", price),
            }),
            Err(e) => {
                warn!(%currency, "Price lookup failed: {}", e);
                Err(YieldError::PriceUnavailable {
                    currency,
                    reason: e.to_string(),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::MockPriceFeed;
    use crate::StakingError;

    const TOLERANCE: f64 = 1e-9;

    fn feed_with(prices: &'static [(Currency, f64)]) -> Arc<dyn PriceFeed> {
        let mut feed = MockPriceFeed::new();
        feed.expect_price().returning(move |currency| {
            prices
                .iter()
                .find(|(c, _)| *c == currency)
                .map(|(_, p)| *p)
                .ok_or_else(|| StakingError::PriceFeed(format!("no quote for {}", currency)))
        });
        Arc::new(feed)
    }

    fn native_only() -> YieldCalculator {
        YieldCalculator::new(Arc::new(MockPriceFeed::new()))
    }

    #[test]
    fn test_cycle_length() {
        assert!((compounding_cycle_days() - 0.902_777_777_777_777_8).abs() < TOLERANCE);
    }

    #[test]
    fn test_one_year_reproduces_annual_multiplier() {
        let p = project(1000.0, 50.0, 365.0);
        assert!((p.compounding_periods - 404.307_692_307_692_3).abs() < 1e-6);
        let expected_rate = 1.5f64.powf(compounding_cycle_days() / 365.0) - 1.0;
        assert!((p.periodic_rate - expected_rate).abs() < TOLERANCE);
        assert!((p.final_amount - 1500.0).abs() < 1e-6);
        assert!((p.reward_amount - 500.0).abs() < 1e-6);
    }

    #[tokio::test]
    async fn test_native_currency_needs_no_price() {
        let result = native_only()
            .calculate(&YieldRequest::new(1000.0, 50.0).period("1 year").currency("LPT"))
            .await
            .unwrap();

        assert_eq!(result.currency, Currency::Lpt);
        assert!(result.market_value.is_none());
        assert_eq!(result.periods.len(), 1);
        let year = &result.periods[0];
        assert!(year.native.is_none());
        assert!((year.final_amount - 1500.0).abs() < 1e-6);
    }

    #[tokio::test]
    async fn test_all_periods_when_unspecified() {
        let result = native_only()
            .calculate(&YieldRequest::new(100.0, "12.5%").currency("lpt"))
            .await
            .unwrap();

        let days: Vec<f64> = result.periods.iter().map(|p| p.days).collect();
        assert_eq!(days, vec![1.0, 7.0, 30.0, 182.5, 365.0]);
        assert_eq!(result.apy, 12.5);
        let rewards: Vec<f64> = result.periods.iter().map(|p| p.reward_amount).collect();
        assert!(rewards.windows(2).all(|w| w[0] < w[1]));
    }

    #[tokio::test]
    async fn test_fiat_result_matches_native_times_price() {
        static PRICES: &[(Currency, f64)] = &[(Currency::Usd, 8.0)];
        let calc = YieldCalculator::new(feed_with(PRICES));

        let native = native_only()
            .calculate(&YieldRequest::new(250.0, 40.0).period("6 months").currency("LPT"))
            .await
            .unwrap();
        let usd = calc
            .calculate(&YieldRequest::new(2000.0, 40.0).period("6 months"))
            .await
            .unwrap();

        let native_reward = native.periods[0].reward_amount;
        let usd_period = &usd.periods[0];
        assert!((usd_period.reward_amount - native_reward * 8.0).abs() < 1e-9);
        let backing = usd_period.native.as_ref().unwrap();
        assert!((backing.principal - 250.0).abs() < TOLERANCE);
        assert!((backing.reward_amount - native_reward).abs() < TOLERANCE);

        let market = usd.market_value.unwrap();
        assert_eq!(market.price, 8.0);
        assert!(market.exchange_rate.is_none());
    }

    #[tokio::test]
    async fn test_non_usd_fiat_reports_exchange_rate() {
        static PRICES: &[(Currency, f64)] = &[(Currency::Usd, 10.0), (Currency::Gbp, 8.0)];
        let calc = YieldCalculator::new(feed_with(PRICES));

        let result = calc
            .calculate(&YieldRequest::new(80.0, 20.0).period("1 week").currency("GBP"))
            .await
            .unwrap();
        let market = result.market_value.unwrap();
        assert_eq!(market.currency, Currency::Gbp);
        assert!((market.exchange_rate.unwrap() - 0.8).abs() < TOLERANCE);
        assert!((market.principal_native - 10.0).abs() < TOLERANCE);
    }

    #[tokio::test]
    async fn test_market_value_can_be_omitted() {
        static PRICES: &[(Currency, f64)] = &[(Currency::Usd, 5.0)];
        let calc = YieldCalculator::new(feed_with(PRICES));
        let mut request = YieldRequest::new(100.0, 10.0).period("1 day");
        request.include_currency_conversion = Some(false);

        let result = calc.calculate(&request).await.unwrap();
        assert!(result.market_value.is_none());
        assert!(result.periods[0].native.is_some());
    }

    #[tokio::test]
    async fn test_price_failure_aborts() {
        static PRICES: &[(Currency, f64)] = &[(Currency::Gbp, 8.0)];
        let calc = YieldCalculator::new(feed_with(PRICES));

        let usd = calc.calculate(&YieldRequest::new(100.0, 10.0)).await;
        assert!(matches!(usd, Err(YieldError::PriceUnavailable { currency: Currency::Usd, .. })));

        // GBP quote alone is not enough: the USD rate is required too
        let gbp = calc.calculate(&YieldRequest::new(100.0, 10.0).currency("GBP")).await;
        assert!(matches!(gbp, Err(YieldError::PriceUnavailable { .. })));
    }

    #[tokio::test]
    async fn test_validation_failures_are_structured() {
        let calc = native_only();

        let cases = [
            YieldRequest::new(0.0, 10.0),
            YieldRequest::new(-5.0, 10.0),
            YieldRequest::new("abc", 10.0),
            YieldRequest::new(100.0, 0.0),
            YieldRequest::new(100.0, "abc%"),
            YieldRequest::new(100.0, "NaN"),
            YieldRequest::new(100.0, 10.0).period("2 years"),
            YieldRequest::new(100.0, 10.0).currency("EUR"),
        ];

        let errors: Vec<YieldError> = futures::future::join_all(cases.iter().map(|r| calc.calculate(r)))
            .await
            .into_iter()
            .map(|r| r.unwrap_err())
            .collect();

        assert!(matches!(errors[0], YieldError::InvalidAmount(_)));
        assert!(matches!(errors[1], YieldError::InvalidAmount(_)));
        assert!(matches!(errors[2], YieldError::InvalidAmount(_)));
        assert!(matches!(errors[3], YieldError::InvalidApy(_)));
        assert!(matches!(errors[4], YieldError::InvalidApy(_)));
        assert!(matches!(errors[5], YieldError::InvalidApy(_)));
        assert!(matches!(errors[6], YieldError::InvalidPeriod(_)));
        assert!(matches!(errors[7], YieldError::InvalidCurrency(_)));
    }

    #[tokio::test]
    async fn test_overflowing_results_are_rejected() {
        let request = YieldRequest::new(1e306, 1e6).period("1 year").currency("LPT");
        let err = native_only().calculate(&request).await.unwrap_err();
        assert!(matches!(err, YieldError::OutOfRange(_)));

        // the fiat-to-native conversion can overflow on its own
        let calc = YieldCalculator::new(feed_with(&[(Currency::Usd, 1e-10)]));
        let err = calc.calculate(&YieldRequest::new(1e300, 10.0)).await.unwrap_err();
        assert!(matches!(err, YieldError::OutOfRange(_)));
    }

    #[test]
    fn test_request_accepts_numbers_and_strings() {
        let request: YieldRequest =
            serde_json::from_str(r#"{"amount":"1000","apy":"55%","period":"1 month"}"#).unwrap();
        assert_eq!(request.amount, NumericInput::Text("1000".into()));
        let request: YieldRequest = serde_json::from_str(r#"{"amount":1000,"apy":55}"#).unwrap();
        assert_eq!(request.apy, NumericInput::Number(55.0));
    }
}
