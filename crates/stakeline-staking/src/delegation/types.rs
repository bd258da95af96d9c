use serde::{Deserialize, Serialize};
use stakeline_common::units::{serde_units, StakeUnits};

use crate::delegation::ContractCall;

/// Delegate `amount` to `to`, moving stake away from `current_delegate` when
/// the delegator is already bonded elsewhere.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BondRequest {
    #[serde(with = "serde_units")]
    pub amount: StakeUnits,
    pub to: String,
    #[serde(default)]
    pub current_delegate: Option<String>,
    #[serde(default)]
    pub wallet_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnbondRequest {
    #[serde(with = "serde_units")]
    pub amount: StakeUnits,
    pub delegate: String,
    #[serde(default)]
    pub wallet_id: Option<String>,
}

/// Re-bond an unbonding lock. With `from_unbonded` the delegator has no
/// active delegation and the lock is bonded to `delegate` afresh.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RebondRequest {
    pub unbonding_lock_id: u64,
    /// Amount held by the lock, used to preview the new ordering
    #[serde(with = "serde_units")]
    pub amount: StakeUnits,
    pub delegate: String,
    #[serde(default)]
    pub from_unbonded: bool,
    #[serde(default)]
    pub wallet_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreparedCall {
    pub call: ContractCall,
    /// Set when the call was handed to the wallet service
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_hash: Option<String>,
}
