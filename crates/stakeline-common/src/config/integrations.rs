use serde::{Deserialize, Serialize};

pub const DEFAULT_SUBGRAPH_URL: &str =
    "https://api.thegraph.com/subgraphs/name/livepeer/arbitrum-one";
pub const DEFAULT_PRICE_API_URL: &str = "https://api.coingecko.com/api/v3";

/// Third-party HTTP services the API fronts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntegrationConfig {
    #[serde(default = "default_subgraph_url")]
    pub subgraph_url: String,
    #[serde(default = "default_price_api_url")]
    pub price_api_url: String,
    /// Wallet custody API used to sign and send prepared contract calls
    #[serde(default)]
    pub wallet_api_url: Option<String>,
    #[serde(default)]
    pub wallet_app_id: Option<String>,
    #[serde(default)]
    pub wallet_app_secret: Option<String>,
}

fn default_subgraph_url() -> String {
    DEFAULT_SUBGRAPH_URL.to_string()
}

fn default_price_api_url() -> String {
    DEFAULT_PRICE_API_URL.to_string()
}

impl Default for IntegrationConfig {
    fn default() -> Self {
        Self {
            subgraph_url: default_subgraph_url(),
            price_api_url: default_price_api_url(),
            wallet_api_url: None,
            wallet_app_id: None,
            wallet_app_secret: None,
        }
    }
}
