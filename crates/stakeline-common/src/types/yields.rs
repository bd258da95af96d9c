//! Display currencies and projection horizons for yield estimates

use {
    serde::{Deserialize, Serialize},
    std::{fmt, str::FromStr},
};

use crate::errors::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    #[default]
    Usd,
    Gbp,
    Ngn,
    /// Native staking token
    Lpt,
}

impl Currency {
    pub const ALL: [Currency; 4] = [Currency::Usd, Currency::Gbp, Currency::Ngn, Currency::Lpt];
    /// Currencies that need an external quote
    pub const FIAT: [Currency; 3] = [Currency::Usd, Currency::Gbp, Currency::Ngn];

    pub fn code(self) -> &'static str {
        match self {
            Currency::Usd => "USD",
            Currency::Gbp => "GBP",
            Currency::Ngn => "NGN",
            Currency::Lpt => "LPT",
        }
    }

    pub fn is_native(self) -> bool {
        self == Currency::Lpt
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Currency {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Currency::ALL
            .into_iter()
            .find(|c| c.code().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                Error::Parse(format!(
                    "unsupported currency '{}', expected one of USD, GBP, NGN, LPT",
                    s
                ))
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum YieldPeriod {
    #[serde(rename = "1 day")]
    Day,
    #[serde(rename = "1 week")]
    Week,
    #[serde(rename = "1 month")]
    Month,
    #[serde(rename = "6 months")]
    HalfYear,
    #[serde(rename = "1 year")]
    Year,
}

impl YieldPeriod {
    pub const ALL: [YieldPeriod; 5] = [
        YieldPeriod::Day,
        YieldPeriod::Week,
        YieldPeriod::Month,
        YieldPeriod::HalfYear,
        YieldPeriod::Year,
    ];

    pub fn label(self) -> &'static str {
        match self {
            YieldPeriod::Day => "1 day",
            YieldPeriod::Week => "1 week",
            YieldPeriod::Month => "1 month",
            YieldPeriod::HalfYear => "6 months",
            YieldPeriod::Year => "1 year",
        }
    }

    pub fn days(self) -> f64 {
        match self {
            YieldPeriod::Day => 1.0,
            YieldPeriod::Week => 7.0,
            YieldPeriod::Month => 30.0,
            YieldPeriod::HalfYear => 182.5,
            YieldPeriod::Year => 365.0,
        }
    }
}

impl fmt::Display for YieldPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for YieldPeriod {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        YieldPeriod::ALL
            .into_iter()
            .find(|p| p.label() == s.trim())
            .ok_or_else(|| {
                Error::Parse(format!(
                    "invalid period '{}', expected one of 1 day, 1 week, 1 month, 6 months, 1 year",
                    s
                ))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_currency_parsing() {
        assert_eq!("usd".parse::<Currency>().unwrap(), Currency::Usd);
        assert_eq!("LPT".parse::<Currency>().unwrap(), Currency::Lpt);
        assert!("EUR".parse::<Currency>().is_err());
        assert_eq!(Currency::default(), Currency::Usd);
    }

    #[test]
    fn test_period_days() {
        assert_eq!("6 months".parse::<YieldPeriod>().unwrap().days(), 182.5);
        assert!("2 years".parse::<YieldPeriod>().is_err());
        let json = serde_json::to_string(&YieldPeriod::Week).unwrap();
        assert_eq!(json, "\"1 week\"");
    }
}
