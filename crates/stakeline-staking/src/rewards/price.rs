use async_trait::async_trait;
use std::sync::Arc;
use stakeline_common::Currency;
use tracing::debug;

use crate::cache::Cache;
use crate::traits::PriceFeed;
use crate::{Result, StakingError};

/// Price feed decorator that reuses quotes for the cache TTL.
///
/// A miss refreshes every fiat quote in one upstream call, so switching
/// display currency within the TTL does not hit the feed again.
pub struct CachedPriceFeed {
    inner: Arc<dyn PriceFeed>,
    cache: Arc<dyn Cache<f64>>,
}

impl CachedPriceFeed {
    pub fn new(inner: Arc<dyn PriceFeed>, cache: Arc<dyn Cache<f64>>) -> Self {
        Self { inner, cache }
    }

    fn key(currency: Currency) -> String {
        format!("price:{}", currency)
    }
}

#[async_trait]
impl PriceFeed for CachedPriceFeed {
    async fn price(&self, currency: Currency) -> Result<f64> {
        if currency.is_native() {
            return Ok(1.0);
        }

        let key = Self::key(currency);
        if let Some(price) = self.cache.get(&key) {
            return Ok(price);
        }

        let quotes = self.inner.prices(&Currency::FIAT).await?;
        let mut requested = None;
        for (quoted, price) in quotes {
            debug!(currency = %quoted, price, "Caching token price");
            self.cache.set(&Self::key(quoted), price);
            if quoted == currency {
                requested = Some(price);
            }
        }

        requested.ok_or_else(|| StakingError::PriceFeed(format!("no {} quote available", currency)))
    }
}
