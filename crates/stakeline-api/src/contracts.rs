//! Protocol contract bindings and calldata for prepared bonding manager calls.

use alloy::primitives::{Address, Bytes, U256};
use alloy::sol;
use alloy::sol_types::SolCall;
use anyhow::{anyhow, bail, Context, Result};

use stakeline_staking::ContractCall;

sol! {
    #[sol(rpc)]
    interface RoundsManager {
        function currentRound() external view returns (uint256);
        function roundLength() external view returns (uint256);
        function currentRoundStartBlock() external view returns (uint256);
        function currentRoundInitialized() external view returns (bool);
    }

    interface BondingManager {
        function bondWithHint(
            uint256 amount,
            address to,
            address oldDelegateNewPosPrev,
            address oldDelegateNewPosNext,
            address currDelegateNewPosPrev,
            address currDelegateNewPosNext
        ) external;
        function unbondWithHint(uint256 amount, address newPosPrev, address newPosNext) external;
        function rebondWithHint(uint256 unbondingLockId, address newPosPrev, address newPosNext) external;
        function rebondFromUnbondedWithHint(
            address to,
            uint256 unbondingLockId,
            address newPosPrev,
            address newPosNext
        ) external;
    }
}

fn uint(value: &str) -> Result<U256> {
    value
        .parse::<U256>()
        .with_context(|| format!("'{}' is not a uint256", value))
}

fn address(value: &str) -> Result<Address> {
    value
        .parse::<Address>()
        .with_context(|| format!("'{}' is not an address", value))
}

fn args<const N: usize>(call: &ContractCall) -> Result<[&str; N]> {
    let args: Vec<&str> = call.args.iter().map(String::as_str).collect();
    args.try_into().map_err(|args: Vec<&str>| {
        anyhow!("{} expects {} arguments, got {}", call.signature, N, args.len())
    })
}

/// ABI-encodes a prepared bonding manager call.
pub fn encode_call(call: &ContractCall) -> Result<Bytes> {
    let data = match call.function.as_str() {
        "bondWithHint" => {
            let [amount, to, old_prev, old_next, curr_prev, curr_next] = args::<6>(call)?;
            BondingManager::bondWithHintCall {
                amount: uint(amount)?,
                to: address(to)?,
                oldDelegateNewPosPrev: address(old_prev)?,
                oldDelegateNewPosNext: address(old_next)?,
                currDelegateNewPosPrev: address(curr_prev)?,
                currDelegateNewPosNext: address(curr_next)?,
            }
            .abi_encode()
        }
        "unbondWithHint" => {
            let [amount, prev, next] = args::<3>(call)?;
            BondingManager::unbondWithHintCall {
                amount: uint(amount)?,
                newPosPrev: address(prev)?,
                newPosNext: address(next)?,
            }
            .abi_encode()
        }
        "rebondWithHint" => {
            let [lock_id, prev, next] = args::<3>(call)?;
            BondingManager::rebondWithHintCall {
                unbondingLockId: uint(lock_id)?,
                newPosPrev: address(prev)?,
                newPosNext: address(next)?,
            }
            .abi_encode()
        }
        "rebondFromUnbondedWithHint" => {
            let [to, lock_id, prev, next] = args::<4>(call)?;
            BondingManager::rebondFromUnbondedWithHintCall {
                to: address(to)?,
                unbondingLockId: uint(lock_id)?,
                newPosPrev: address(prev)?,
                newPosNext: address(next)?,
            }
            .abi_encode()
        }
        other => bail!("unsupported bonding manager function '{}'", other),
    };
    Ok(Bytes::from(data))
}
