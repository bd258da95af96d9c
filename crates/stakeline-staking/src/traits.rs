//! Collaborator seams. Everything behind these traits is an external service
//! (subgraph, price API, chain RPC, wallet custody) and is implemented in the
//! API crate; the staking core only depends on the shapes below.

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use stakeline_common::{Currency, Validator};

use crate::delegation::ContractCall;
use crate::Result;

/// Source of the stake-ranked validator snapshot.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ValidatorSource: Send + Sync + 'static {
    /// Active validators, ideally sorted descending by stake
    async fn active_validators(&self) -> Result<Vec<Validator>>;
}

/// Native-token unit price in a display currency.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait PriceFeed: Send + Sync + 'static {
    async fn price(&self, currency: Currency) -> Result<f64>;

    /// Quotes for several currencies at once. Feeds that can batch should
    /// override this; the result may omit currencies the feed could not price.
    async fn prices(&self, currencies: &[Currency]) -> Result<Vec<(Currency, f64)>> {
        let mut quotes = Vec::with_capacity(currencies.len());
        for &currency in currencies {
            quotes.push((currency, self.price(currency).await?));
        }
        Ok(quotes)
    }
}

/// Read-only view of the rounds manager contract on the rollup.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait RoundsManagerReader: Send + Sync + 'static {
    async fn current_round(&self) -> Result<u64>;

    /// Round length in settlement-chain blocks
    async fn round_length(&self) -> Result<u64>;

    async fn current_round_start_block(&self) -> Result<u64>;

    /// `None` when the deployed contract does not expose the flag
    async fn current_round_initialized(&self) -> Result<Option<bool>>;
}

/// Block queries against the settlement chain.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait BlockProvider: Send + Sync + 'static {
    async fn block_number(&self) -> Result<u64>;

    /// Unix seconds
    async fn block_timestamp(&self, number: u64) -> Result<i64>;
}

/// Hands a prepared contract call to the wallet custody service, which signs
/// and broadcasts it. Returns the transaction hash.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait CallSubmitter: Send + Sync + 'static {
    async fn submit(&self, wallet_id: &str, call: &ContractCall) -> Result<String>;
}
