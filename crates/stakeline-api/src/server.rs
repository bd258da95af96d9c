// src/server.rs

use alloy::primitives::Address;
use anyhow::{Context, Result};
use std::collections::HashMap;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{info, warn};

use stakeline_common::{ServiceConfig, Validator};
use stakeline_staking::rewards::CachedPriceFeed;
use stakeline_staking::{
    BlockProvider, DelegationService, MemoryCache, PriceFeed, RoundStatusEstimator,
    RoundsManagerReader,
};

use crate::eth_client::{EthRpcClient, RoundsManagerContract};
use crate::health::async_check;
use crate::price_client::CoinGeckoClient;
use crate::rest::{ApiConfig, ApiServer};
use crate::subgraph_client::SubgraphClient;
use crate::types::{HealthCheckResult, HealthStatus};
use crate::wallet_client::WalletClient;

const UPSTREAM_CHECK_TIMEOUT: Duration = Duration::from_secs(5);

/// Builds the delegation service and round estimator from configuration.
pub fn build_services(
    config: &ServiceConfig,
) -> Result<(Arc<DelegationService>, Arc<RoundStatusEstimator>)> {
    let ttl = config.cache_ttl();

    let prices: Arc<dyn PriceFeed> = Arc::new(CachedPriceFeed::new(
        Arc::new(CoinGeckoClient::new(&config.integrations.price_api_url)),
        Arc::new(MemoryCache::<f64>::new(ttl)),
    ));

    let mut delegation = DelegationService::new(
        Arc::new(SubgraphClient::new(&config.integrations.subgraph_url)),
        prices,
        Arc::new(MemoryCache::<Vec<Validator>>::new(ttl)),
        config.chain.bonding_manager(),
    );

    let integrations = &config.integrations;
    match (
        &integrations.wallet_api_url,
        &integrations.wallet_app_id,
        &integrations.wallet_app_secret,
    ) {
        (Some(url), Some(id), Some(secret)) => {
            delegation = delegation.with_submitter(Arc::new(WalletClient::new(url, id, secret)));
        }
        (Some(_), _, _) => warn!("Wallet API URL set without app credentials, submission disabled"),
        _ => info!("No wallet API configured, delegation calls are returned unsent"),
    }

    let rounds_manager: Option<Arc<dyn RoundsManagerReader>> = match (
        &config.chain.rollup_rpc_url,
        &config.chain.rounds_manager_address,
    ) {
        (Some(url), Some(address)) => {
            let address: Address = address
                .parse()
                .with_context(|| format!("invalid rounds manager address '{}'", address))?;
            let rollup = EthRpcClient::connect(url)?;
            Some(Arc::new(RoundsManagerContract::new(&rollup, address)) as Arc<dyn RoundsManagerReader>)
        }
        _ => {
            warn!("Rounds manager not configured, round status is unavailable");
            None
        }
    };

    let blocks: Option<Arc<dyn BlockProvider>> = match &config.chain.settlement_rpc_url {
        Some(url) => Some(Arc::new(EthRpcClient::connect(url)?) as Arc<dyn BlockProvider>),
        None => None,
    };

    let rounds = RoundStatusEstimator::new(
        rounds_manager,
        blocks,
        config.chain.average_block_time_secs,
    );

    Ok((Arc::new(delegation), Arc::new(rounds)))
}

/// Runs `check` with a timeout and reports its latency.
async fn timed<F>(name: &'static str, check: F) -> HealthCheckResult
where
    F: Future<Output = std::result::Result<String, String>>,
{
    let timer = Instant::now();
    let outcome = tokio::time::timeout(UPSTREAM_CHECK_TIMEOUT, check).await;
    let elapsed = timer.elapsed().as_millis() as u64;

    let mut result = match outcome {
        Ok(Ok(details)) => HealthCheckResult::healthy(details),
        Ok(Err(e)) => HealthCheckResult::unhealthy(format!("{} check failed: {}", name, e)),
        Err(_) => HealthCheckResult::unhealthy(format!(
            "{} check timed out after {}ms",
            name,
            UPSTREAM_CHECK_TIMEOUT.as_millis()
        )),
    };
    if result.status == HealthStatus::Healthy {
        result.metrics = Some(HashMap::from([(
            "response_time_ms".to_string(),
            serde_json::Value::from(elapsed),
        )]));
    }
    result
}

async fn register_health_checks(
    server: &ApiServer,
    delegation: Arc<DelegationService>,
    rounds: Arc<RoundStatusEstimator>,
) {
    let health = server.health();
    health.register("api", Arc::new(|| true)).await;

    health
        .register_async(
            "subgraph",
            async_check(move || {
                let delegation = delegation.clone();
                async move {
                    timed("subgraph", async {
                        delegation
                            .validators()
                            .await
                            .map(|v| format!("{} active validators", v.len()))
                            .map_err(|e| e.to_string())
                    })
                    .await
                }
            }),
        )
        .await;

    if let Some(blocks) = rounds.block_provider() {
        health
            .register_async(
                "settlement_chain",
                async_check(move || {
                    let blocks = blocks.clone();
                    async move {
                        timed("settlement_chain", async {
                            blocks
                                .block_number()
                                .await
                                .map(|n| format!("latest block {}", n))
                                .map_err(|e| e.to_string())
                        })
                        .await
                    }
                }),
            )
            .await;
    }
}

/// Run the API server until ctrl-c
pub async fn run(config: ServiceConfig) -> Result<()> {
    config.validate()?;

    let bind_addr: SocketAddr = config
        .bind_addr
        .parse()
        .with_context(|| format!("invalid bind address {}", config.bind_addr))?;

    let api_config = ApiConfig {
        bind_addr,
        enable_metrics: config.metrics_enabled,
        path_prefix: config.path_prefix.clone(),
        ..ApiConfig::default()
    };

    info!("Starting API server for {} v{}", api_config.service_name, api_config.version);

    let (delegation, rounds) = build_services(&config)?;
    let server = ApiServer::new(api_config, delegation.clone(), rounds.clone());
    register_health_checks(&server, delegation, rounds).await;

    server.serve(shutdown_signal()).await
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_build_services_without_chain() {
        let config = ServiceConfig::default();
        let (_, rounds) = build_services(&config).unwrap();
        assert!(rounds.block_provider().is_none());
        assert!(matches!(
            rounds.status().await,
            Err(stakeline_staking::StakingError::Configuration(_))
        ));
    }

    #[test]
    fn test_build_services_rejects_bad_contract_address() {
        let mut config = ServiceConfig::default();
        config.chain.rollup_rpc_url = Some("http://127.0.0.1:8545".into());
        config.chain.rounds_manager_address = Some("0xnot-an-address".into());
        assert!(build_services(&config).is_err());

        config.chain.rounds_manager_address =
            Some("0xdd6f56DcC28D3F5f27084381fE8Df634985cc39f".into());
        config.chain.settlement_rpc_url = Some("http://127.0.0.1:8546".into());
        let (_, rounds) = build_services(&config).unwrap();
        assert!(rounds.block_provider().is_some());
    }

    #[tokio::test]
    async fn test_timed_check() {
        let ok = timed("x", async { Ok::<_, String>("fine".to_string()) }).await;
        assert_eq!(ok.status, HealthStatus::Healthy);
        assert!(ok.metrics.is_some());

        let failed = timed("x", async { Err::<String, _>("down".to_string()) }).await;
        assert_eq!(failed.status, HealthStatus::Unhealthy);
    }
}
