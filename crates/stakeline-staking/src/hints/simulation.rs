//! Predicts the active set ordering after a pending stake change.
//!
//! This is an optimistic preview used to compute hints before the
//! transaction is sent. Stakes floor at zero instead of rejecting an
//! over-sized undelegate, so it must not stand in for real pre-flight
//! validation of a contract call.
//!
//! Arithmetic is exact in smallest units (see `stakeline_common::units`).
//! Yield projections use floating point; the two are kept apart on purpose.

use serde::{Deserialize, Serialize};
use stakeline_common::units::{format_units, serde_units, StakeUnits};
use stakeline_common::{Validator, EMPTY_ADDRESS};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StakeAction {
    Delegate,
    Undelegate,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveSetChange {
    pub action: StakeAction,
    /// Smallest on-chain units
    #[serde(with = "serde_units")]
    pub amount: StakeUnits,
    pub target_validator: String,
    /// Debited on `Delegate` when stake moves between validators
    #[serde(default)]
    pub source_validator: Option<String>,
}

impl ActiveSetChange {
    pub fn delegate(target: impl Into<String>, amount: StakeUnits) -> Self {
        Self {
            action: StakeAction::Delegate,
            amount,
            target_validator: target.into(),
            source_validator: None,
        }
    }

    pub fn undelegate(target: impl Into<String>, amount: StakeUnits) -> Self {
        Self {
            action: StakeAction::Undelegate,
            amount,
            target_validator: target.into(),
            source_validator: None,
        }
    }

    pub fn from_source(mut self, source: impl Into<String>) -> Self {
        self.source_validator = Some(source.into());
        self
    }

    fn effective_source(&self) -> Option<&str> {
        match self.source_validator.as_deref() {
            Some(source)
                if !source.is_empty()
                    && !source.eq_ignore_ascii_case(EMPTY_ADDRESS)
                    && !source.eq_ignore_ascii_case(&self.target_validator) =>
            {
                Some(source)
            }
            _ => None,
        }
    }
}

/// Returns a new list reflecting `change`, re-sorted descending by stake.
/// The caller's slice is left untouched. When the target is not in the list
/// the copy is returned as-is.
pub fn simulate_new_active_set_order(
    validators: &[Validator],
    change: &ActiveSetChange,
) -> Vec<Validator> {
    let mut stakes: Vec<(String, StakeUnits)> = validators
        .iter()
        .map(|v| (v.id.clone(), v.stake_units()))
        .collect();

    let Some(target) = stakes
        .iter()
        .position(|(id, _)| id.eq_ignore_ascii_case(&change.target_validator))
    else {
        return validators.to_vec();
    };

    match change.action {
        StakeAction::Delegate => {
            stakes[target].1 = stakes[target].1.saturating_add(change.amount);

            if let Some(source) = change.effective_source() {
                if let Some(entry) = stakes
                    .iter_mut()
                    .find(|(id, _)| id.eq_ignore_ascii_case(source))
                {
                    entry.1 = entry.1.saturating_sub(change.amount);
                }
            }
        }
        StakeAction::Undelegate => {
            stakes[target].1 = stakes[target].1.saturating_sub(change.amount);
        }
    }

    // stable: equal stakes keep their relative order
    stakes.sort_by(|a, b| b.1.cmp(&a.1));

    stakes
        .into_iter()
        .map(|(id, units)| Validator {
            id,
            total_stake: format_units(units),
        })
        .collect()
}
