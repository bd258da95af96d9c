// src/eth_client.rs

use alloy::contract::Error as ContractError;
use alloy::primitives::{Address, U256};
use alloy::providers::{DynProvider, Provider, ProviderBuilder};
use alloy::rpc::types::BlockNumberOrTag;
use alloy::transports::http::reqwest::Url;
use anyhow::Context;
use async_trait::async_trait;
use tracing::debug;

use stakeline_staking::{BlockProvider, Result, RoundsManagerReader, StakingError};

use crate::contracts::RoundsManager;

fn chain_err(e: impl std::fmt::Display) -> StakingError {
    StakingError::Chain(e.to_string())
}

/// HTTP JSON-RPC connection to an Ethereum-compatible chain
#[derive(Clone)]
pub struct EthRpcClient {
    provider: DynProvider,
}

impl EthRpcClient {
    pub fn connect(rpc_url: &str) -> anyhow::Result<Self> {
        let url: Url = rpc_url
            .parse()
            .with_context(|| format!("invalid RPC URL '{}'", rpc_url))?;
        Ok(Self {
            provider: ProviderBuilder::new().connect_http(url).erased(),
        })
    }

    pub fn provider(&self) -> &DynProvider {
        &self.provider
    }
}

#[async_trait]
impl BlockProvider for EthRpcClient {
    async fn block_number(&self) -> Result<u64> {
        self.provider.get_block_number().await.map_err(chain_err)
    }

    async fn block_timestamp(&self, number: u64) -> Result<i64> {
        let block = self
            .provider
            .get_block_by_number(BlockNumberOrTag::Number(number))
            .await
            .map_err(chain_err)?
            .ok_or_else(|| StakingError::Chain(format!("block {} not found", number)))?;

        i64::try_from(block.header.timestamp)
            .map_err(|_| StakingError::Chain(format!("block {} timestamp out of range", number)))
    }
}

/// Read-only binding to the rounds manager contract
pub struct RoundsManagerContract {
    contract: RoundsManager::RoundsManagerInstance<DynProvider>,
}

impl RoundsManagerContract {
    pub fn new(rpc: &EthRpcClient, address: Address) -> Self {
        Self {
            contract: RoundsManager::new(address, rpc.provider().clone()),
        }
    }

    pub fn address(&self) -> &Address {
        self.contract.address()
    }
}

fn to_u64(name: &str, value: U256) -> Result<u64> {
    u64::try_from(value).map_err(|_| StakingError::Chain(format!("{} {} does not fit in u64", name, value)))
}

#[async_trait]
impl RoundsManagerReader for RoundsManagerContract {
    async fn current_round(&self) -> Result<u64> {
        let round = self.contract.currentRound().call().await.map_err(chain_err)?;
        to_u64("currentRound", round)
    }

    async fn round_length(&self) -> Result<u64> {
        let length = self.contract.roundLength().call().await.map_err(chain_err)?;
        to_u64("roundLength", length)
    }

    async fn current_round_start_block(&self) -> Result<u64> {
        let start = self
            .contract
            .currentRoundStartBlock()
            .call()
            .await
            .map_err(chain_err)?;
        to_u64("currentRoundStartBlock", start)
    }

    async fn current_round_initialized(&self) -> Result<Option<bool>> {
        match self.contract.currentRoundInitialized().call().await {
            Ok(initialized) => Ok(Some(initialized)),
            // transport failures are real errors
            Err(ContractError::TransportError(e)) if !e.is_error_resp() => Err(chain_err(e)),
            // reverted, or no such function on this deployment
            Err(e) => {
                debug!(address = %self.address(), "currentRoundInitialized unavailable: {}", e);
                Ok(None)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_bad_url() {
        assert!(EthRpcClient::connect("not a url").is_err());
    }

    #[test]
    fn test_to_u64_bounds() {
        assert_eq!(to_u64("roundLength", U256::from(6377u64)).unwrap(), 6377);
        assert!(matches!(
            to_u64("roundLength", U256::MAX),
            Err(StakingError::Chain(_))
        ));
    }

    #[tokio::test]
    async fn test_unreachable_node_is_chain_error() {
        let client = EthRpcClient::connect("http://127.0.0.1:9").unwrap();
        assert!(matches!(client.block_number().await, Err(StakingError::Chain(_))));

        let rounds = RoundsManagerContract::new(&client, Address::ZERO);
        assert!(matches!(rounds.current_round().await, Err(StakingError::Chain(_))));
        // unreachable node is not mistaken for a missing function
        assert!(rounds.current_round_initialized().await.is_err());
    }
}
