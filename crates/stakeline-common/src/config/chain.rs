use serde::{Deserialize, Serialize};

pub const DEFAULT_AVERAGE_BLOCK_TIME_SECS: f64 = 12.0;

/// Bonding manager proxy on Arbitrum One
pub const DEFAULT_BONDING_MANAGER_ADDRESS: &str = "0x35Bcf3c30594191d53231E4FF333E8A770453e40";

/// Chain endpoints and contract addresses.
///
/// The rounds manager and bonding manager live on the rollup, while round
/// timing is measured in blocks of the settlement chain.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainConfig {
    #[serde(default)]
    pub rollup_rpc_url: Option<String>,
    #[serde(default)]
    pub settlement_rpc_url: Option<String>,
    #[serde(default)]
    pub bonding_manager_address: Option<String>,
    #[serde(default)]
    pub rounds_manager_address: Option<String>,
    #[serde(default = "default_block_time")]
    pub average_block_time_secs: f64,
}

fn default_block_time() -> f64 {
    DEFAULT_AVERAGE_BLOCK_TIME_SECS
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            rollup_rpc_url: None,
            settlement_rpc_url: None,
            bonding_manager_address: None,
            rounds_manager_address: None,
            average_block_time_secs: DEFAULT_AVERAGE_BLOCK_TIME_SECS,
        }
    }
}

impl ChainConfig {
    pub fn bonding_manager(&self) -> &str {
        self.bonding_manager_address
            .as_deref()
            .unwrap_or(DEFAULT_BONDING_MANAGER_ADDRESS)
    }
}
