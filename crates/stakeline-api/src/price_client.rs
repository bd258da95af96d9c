// src/price_client.rs

use async_trait::async_trait;
use std::collections::HashMap;
use tracing::{debug, warn};

use stakeline_common::Currency;
use stakeline_staking::{PriceFeed, Result, StakingError};

const TOKEN_ID: &str = "livepeer";

/// `simple/price` response: token id -> (currency code -> price)
type SimplePrice = HashMap<String, HashMap<String, f64>>;

/// CoinGecko-compatible price API client
#[derive(Debug, Clone)]
pub struct CoinGeckoClient {
    base_url: String,
    client: reqwest::Client,
}

impl CoinGeckoClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    fn url(&self, currencies: &[Currency]) -> String {
        let codes = currencies
            .iter()
            .map(|c| c.code().to_ascii_lowercase())
            .collect::<Vec<_>>()
            .join(",");
        format!(
            "{}/simple/price?ids={}&vs_currencies={}",
            self.base_url, TOKEN_ID, codes
        )
    }

    async fn fetch(&self, currencies: &[Currency]) -> Result<SimplePrice> {
        self.client
            .get(self.url(currencies))
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| StakingError::PriceFeed(e.to_string()))?
            .json::<SimplePrice>()
            .await
            .map_err(|e| StakingError::PriceFeed(format!("invalid price response: {}", e)))
    }
}

/// Pull one quote out of a `simple/price` payload.
pub fn extract_price(body: &SimplePrice, currency: Currency) -> Result<f64> {
    let key = currency.code().to_ascii_lowercase();
    let price = body
        .get(TOKEN_ID)
        .and_then(|quotes| quotes.get(&key))
        .copied()
        .ok_or_else(|| StakingError::PriceFeed(format!("no {} quote in response", currency)))?;

    if !price.is_finite() || price <= 0.0 {
        return Err(StakingError::PriceFeed(format!(
            "invalid {} quote: {}",
            currency, price
        )));
    }
    Ok(price)
}

/// Every usable quote in a `simple/price` payload. Missing or invalid
/// quotes are logged and left out.
pub fn collect_prices(body: &SimplePrice, currencies: &[Currency]) -> Vec<(Currency, f64)> {
    currencies
        .iter()
        .filter_map(|&currency| match extract_price(body, currency) {
            Ok(price) => Some((currency, price)),
            Err(e) => {
                warn!(%currency, error = %e, "Skipping price quote");
                None
            }
        })
        .collect()
}

#[async_trait]
impl PriceFeed for CoinGeckoClient {
    async fn price(&self, currency: Currency) -> Result<f64> {
        if currency.is_native() {
            return Ok(1.0);
        }

        let body = self.fetch(&[currency]).await?;
        debug!(%currency, "Price quote received");
        extract_price(&body, currency)
    }

    async fn prices(&self, currencies: &[Currency]) -> Result<Vec<(Currency, f64)>> {
        let mut quotes: Vec<(Currency, f64)> = currencies
            .iter()
            .filter(|c| c.is_native())
            .map(|&c| (c, 1.0))
            .collect();
        let fiat: Vec<Currency> = currencies.iter().copied().filter(|c| !c.is_native()).collect();
        if fiat.is_empty() {
            return Ok(quotes);
        }

        let body = self.fetch(&fiat).await?;
        quotes.extend(collect_prices(&body, &fiat));
        debug!(count = quotes.len(), "Price quotes received");
        Ok(quotes)
    }
}
