//! Bonding manager call assembly. Arguments are kept as strings (decimal
//! uints, hex addresses) and ABI-encoded only when the call is submitted.

use serde::{Deserialize, Serialize};
use stakeline_common::units::StakeUnits;
use stakeline_common::Hint;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractCall {
    /// Contract address
    pub to: String,
    pub function: String,
    /// Solidity signature, e.g. `unbondWithHint(uint256,address,address)`
    pub signature: String,
    pub args: Vec<String>,
}

impl ContractCall {
    fn new(to: &str, function: &str, param_types: &[&str], args: Vec<String>) -> Self {
        Self {
            to: to.to_string(),
            function: function.to_string(),
            signature: format!("{}({})", function, param_types.join(",")),
            args,
        }
    }
}

pub fn bond_with_hint(
    bonding_manager: &str,
    amount: StakeUnits,
    to: &str,
    old_delegate: &Hint,
    new_delegate: &Hint,
) -> ContractCall {
    ContractCall::new(
        bonding_manager,
        "bondWithHint",
        &["uint256", "address", "address", "address", "address", "address"],
        vec![
            amount.to_string(),
            to.to_string(),
            old_delegate.new_pos_prev.clone(),
            old_delegate.new_pos_next.clone(),
            new_delegate.new_pos_prev.clone(),
            new_delegate.new_pos_next.clone(),
        ],
    )
}

pub fn unbond_with_hint(bonding_manager: &str, amount: StakeUnits, hint: &Hint) -> ContractCall {
    ContractCall::new(
        bonding_manager,
        "unbondWithHint",
        &["uint256", "address", "address"],
        vec![
            amount.to_string(),
            hint.new_pos_prev.clone(),
            hint.new_pos_next.clone(),
        ],
    )
}

pub fn rebond_with_hint(bonding_manager: &str, unbonding_lock_id: u64, hint: &Hint) -> ContractCall {
    ContractCall::new(
        bonding_manager,
        "rebondWithHint",
        &["uint256", "address", "address"],
        vec![
            unbonding_lock_id.to_string(),
            hint.new_pos_prev.clone(),
            hint.new_pos_next.clone(),
        ],
    )
}

pub fn rebond_from_unbonded_with_hint(
    bonding_manager: &str,
    to: &str,
    unbonding_lock_id: u64,
    hint: &Hint,
) -> ContractCall {
    ContractCall::new(
        bonding_manager,
        "rebondFromUnbondedWithHint",
        &["address", "uint256", "address", "address"],
        vec![
            to.to_string(),
            unbonding_lock_id.to_string(),
            hint.new_pos_prev.clone(),
            hint.new_pos_next.clone(),
        ],
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use stakeline_common::EMPTY_ADDRESS;

    #[test]
    fn test_signatures() {
        let hint = Hint::new("0xprev", EMPTY_ADDRESS);

        let call = unbond_with_hint("0xbm", 5, &hint);
        assert_eq!(call.signature, "unbondWithHint(uint256,address,address)");
        assert_eq!(call.args, vec!["5", "0xprev", EMPTY_ADDRESS]);

        let call = bond_with_hint("0xbm", 1, "0xto", &Hint::empty(), &hint);
        assert_eq!(
            call.signature,
            "bondWithHint(uint256,address,address,address,address,address)"
        );
        assert_eq!(call.args.len(), 6);

        let call = rebond_from_unbonded_with_hint("0xbm", "0xto", 3, &hint);
        assert_eq!(call.args[..2], ["0xto".to_string(), "3".to_string()]);
        assert_eq!(call.to, "0xbm");
    }
}
