//! Validator (transcoder) snapshot entries and linked-list hints.
//!
//! Records arrive from the subgraph as loosely shaped JSON. They are converted
//! into [`Validator`] at the boundary, so the staking core only ever sees an
//! entry with a non-empty id and a parseable stake.

use {
    serde::{Deserialize, Serialize},
    std::convert::TryFrom,
};

use crate::errors::Error;
use crate::units::{parse_units, StakeUnits};

/// Null address used by the bonding manager as the "no neighbour" hint.
pub const EMPTY_ADDRESS: &str = "0x0000000000000000000000000000000000000000";

/// A stake-ranked validator entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "RawValidator")]
pub struct Validator {
    pub id: String,
    pub total_stake: String,
}

/// Unvalidated transcoder record as returned by the subgraph.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawValidator {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub total_stake: Option<String>,
}

impl Validator {
    pub fn new(id: impl Into<String>, total_stake: impl Into<String>) -> crate::Result<Self> {
        let id = id.into();
        let total_stake = total_stake.into();

        if id.trim().is_empty() {
            return Err(Error::InvalidValidator("validator id is empty".into()));
        }
        parse_units(&total_stake).map_err(|e| {
            Error::InvalidValidator(format!("validator {} has invalid stake: {}", id, e))
        })?;

        Ok(Self { id, total_stake })
    }

    /// Stake in smallest units. Infallible for values built through `new`.
    pub fn stake_units(&self) -> StakeUnits {
        parse_units(&self.total_stake).unwrap_or_default()
    }

    /// Addresses are compared case-insensitively.
    pub fn has_id(&self, id: &str) -> bool {
        self.id.eq_ignore_ascii_case(id)
    }
}

impl TryFrom<RawValidator> for Validator {
    type Error = Error;

    fn try_from(raw: RawValidator) -> Result<Self, Self::Error> {
        let id = raw
            .id
            .ok_or_else(|| Error::InvalidValidator("missing id".into()))?;
        let stake = raw.total_stake.unwrap_or_else(|| "0".to_string());
        Validator::new(id, stake)
    }
}

/// Neighbours at a validator's position in the bonding manager's sorted list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hint {
    pub new_pos_prev: String,
    pub new_pos_next: String,
}

impl Hint {
    pub fn new(prev: impl Into<String>, next: impl Into<String>) -> Self {
        Self {
            new_pos_prev: prev.into(),
            new_pos_next: next.into(),
        }
    }

    pub fn empty() -> Self {
        Self::new(EMPTY_ADDRESS, EMPTY_ADDRESS)
    }

    pub fn is_empty(&self) -> bool {
        self.new_pos_prev == EMPTY_ADDRESS && self.new_pos_next == EMPTY_ADDRESS
    }
}

impl Default for Hint {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validator_validation() {
        assert!(Validator::new("0xabc", "100.5").is_ok());
        assert!(Validator::new("", "1").is_err());
        assert!(Validator::new("0xabc", "lots").is_err());
    }

    #[test]
    fn test_validator_from_raw_json() {
        let v: Validator = serde_json::from_str(r#"{"id":"0xAbC","totalStake":"42"}"#).unwrap();
        assert!(v.has_id("0xabc"));
        assert_eq!(v.total_stake, "42");

        let missing_stake: Validator = serde_json::from_str(r#"{"id":"0x1"}"#).unwrap();
        assert_eq!(missing_stake.total_stake, "0");

        assert!(serde_json::from_str::<Validator>(r#"{"totalStake":"1"}"#).is_err());
    }

    #[test]
    fn test_empty_hint() {
        let hint = Hint::default();
        assert!(hint.is_empty());
        let json = serde_json::to_value(&hint).unwrap();
        assert_eq!(json["newPosPrev"], EMPTY_ADDRESS);
    }
}
