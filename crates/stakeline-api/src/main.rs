use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

use stakeline_common::ServiceConfig;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// JSON configuration file
    #[arg(long, env = "STAKELINE_CONFIG")]
    config: Option<PathBuf>,

    /// Server bind address
    #[arg(long, env = "BIND_ADDR")]
    bind_addr: Option<String>,

    /// Log level used when RUST_LOG is unset
    #[arg(long, env = "LOG_LEVEL")]
    log_level: Option<String>,

    /// Protocol subgraph endpoint
    #[arg(long, env = "SUBGRAPH_URL")]
    subgraph_url: Option<String>,

    /// Price API base URL
    #[arg(long, env = "PRICE_API_URL")]
    price_api_url: Option<String>,

    /// Rollup RPC (rounds and bonding manager)
    #[arg(long, env = "ROLLUP_RPC_URL")]
    rollup_rpc_url: Option<String>,

    /// Settlement chain RPC (round timing)
    #[arg(long, env = "SETTLEMENT_RPC_URL")]
    settlement_rpc_url: Option<String>,

    #[arg(long, env = "BONDING_MANAGER_ADDRESS")]
    bonding_manager_address: Option<String>,

    #[arg(long, env = "ROUNDS_MANAGER_ADDRESS")]
    rounds_manager_address: Option<String>,

    /// Seconds per settlement chain block
    #[arg(long, env = "AVERAGE_BLOCK_TIME")]
    average_block_time: Option<f64>,

    #[arg(long, env = "WALLET_API_URL")]
    wallet_api_url: Option<String>,

    #[arg(long, env = "WALLET_APP_ID")]
    wallet_app_id: Option<String>,

    #[arg(long, env = "WALLET_APP_SECRET", hide_env_values = true)]
    wallet_app_secret: Option<String>,
}

impl Args {
    /// Flags and environment take precedence over the config file.
    fn into_config(self) -> Result<ServiceConfig> {
        let mut config = match &self.config {
            Some(path) => ServiceConfig::from_file(path)?,
            None => ServiceConfig::default(),
        };

        if let Some(v) = self.bind_addr {
            config.bind_addr = v;
        }
        if let Some(v) = self.log_level {
            config.log_level = v;
        }
        if let Some(v) = self.subgraph_url {
            config.integrations.subgraph_url = v;
        }
        if let Some(v) = self.price_api_url {
            config.integrations.price_api_url = v;
        }
        if let Some(v) = self.average_block_time {
            config.chain.average_block_time_secs = v;
        }

        let chain = &mut config.chain;
        chain.rollup_rpc_url = self.rollup_rpc_url.or(chain.rollup_rpc_url.take());
        chain.settlement_rpc_url = self.settlement_rpc_url.or(chain.settlement_rpc_url.take());
        chain.bonding_manager_address = self
            .bonding_manager_address
            .or(chain.bonding_manager_address.take());
        chain.rounds_manager_address = self
            .rounds_manager_address
            .or(chain.rounds_manager_address.take());

        let integrations = &mut config.integrations;
        integrations.wallet_api_url = self.wallet_api_url.or(integrations.wallet_api_url.take());
        integrations.wallet_app_id = self.wallet_app_id.or(integrations.wallet_app_id.take());
        integrations.wallet_app_secret = self
            .wallet_app_secret
            .or(integrations.wallet_app_secret.take());

        config.validate()?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    let config = Args::parse().into_config()?;

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "stakeline_api={level},stakeline_staking={level},tower_http=info",
            level = config.log_level
        ))
    });
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .init();

    info!("Starting stakeline API on {}", config.bind_addr);
    stakeline_api::run(config).await
}
