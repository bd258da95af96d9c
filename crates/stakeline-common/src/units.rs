//! Fixed-point stake amounts.
//!
//! Stake is carried on the wire as decimal strings in whole-token units and
//! converted here to the smallest on-chain unit (18 decimal places) so that
//! repeated delegate/undelegate previews never accumulate floating point drift.

use crate::errors::{Error, Result};

/// Smallest-unit amount. 1 token = 10^18 units.
pub type StakeUnits = u128;

/// Number of decimal places of the staking token
pub const TOKEN_DECIMALS: u32 = 18;

/// Conversion factor: 1 token = 10^18 smallest units
pub const UNITS_PER_TOKEN: StakeUnits = 10u128.pow(TOKEN_DECIMALS);

/// Parses a non-negative decimal string ("1500", "0.25", "12.000000000000000001")
/// into smallest units. Fractional digits past the 18th are truncated.
pub fn parse_units(value: &str) -> Result<StakeUnits> {
    let value = value.trim();
    if value.is_empty() {
        return Err(Error::InvalidAmount("empty amount".into()));
    }

    let (whole, fraction) = match value.split_once('.') {
        Some((whole, fraction)) => (whole, fraction),
        None => (value, ""),
    };

    if whole.is_empty() && fraction.is_empty() {
        return Err(Error::InvalidAmount(format!("'{}' is not a decimal number", value)));
    }
    if !whole.bytes().all(|b| b.is_ascii_digit()) || !fraction.bytes().all(|b| b.is_ascii_digit()) {
        return Err(Error::InvalidAmount(format!("'{}' is not a decimal number", value)));
    }

    let whole_units = if whole.is_empty() {
        0
    } else {
        whole
            .parse::<u128>()
            .ok()
            .and_then(|w| w.checked_mul(UNITS_PER_TOKEN))
            .ok_or_else(|| Error::InvalidAmount(format!("'{}' overflows stake units", value)))?
    };

    let digits = fraction.len().min(TOKEN_DECIMALS as usize);
    let fraction_units = if digits == 0 {
        0
    } else {
        let scale = 10u128.pow(TOKEN_DECIMALS - digits as u32);
        fraction[..digits]
            .parse::<u128>()
            .map_err(|e| Error::Parse(e.to_string()))?
            * scale
    };

    whole_units
        .checked_add(fraction_units)
        .ok_or_else(|| Error::InvalidAmount(format!("'{}' overflows stake units", value)))
}

/// Renders smallest units back to a decimal token string with trailing
/// zeros trimmed. Whole amounts render without a fractional part.
pub fn format_units(units: StakeUnits) -> String {
    let whole = units / UNITS_PER_TOKEN;
    let fraction = units % UNITS_PER_TOKEN;

    if fraction == 0 {
        return whole.to_string();
    }

    let fraction = format!("{:018}", fraction);
    format!("{}.{}", whole, fraction.trim_end_matches('0'))
}

/// Serde adapter for smallest-unit amounts. Accepts a JSON string of digits or
/// a non-negative integer, always serializes as a string so values above 2^53
/// survive JavaScript clients.
pub mod serde_units {
    use super::StakeUnits;
    use serde::{de, Deserialize, Deserializer, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        Text(String),
        Number(u64),
    }

    pub fn serialize<S>(value: &StakeUnits, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&value.to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<StakeUnits, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Repr::deserialize(deserializer)? {
            Repr::Number(n) => Ok(n as StakeUnits),
            Repr::Text(s) => s
                .trim()
                .parse::<StakeUnits>()
                .map_err(|_| de::Error::custom(format!("'{}' is not an integer amount", s))),
        }
    }
}
