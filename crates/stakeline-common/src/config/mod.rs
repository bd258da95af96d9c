//! Configuration types for the stakeline service

mod chain;
mod integrations;

pub use chain::ChainConfig;
pub use integrations::IntegrationConfig;

use {
    serde::{Deserialize, Serialize},
    std::{fs, path::Path, time::Duration},
};

use crate::errors::{Error, Result};

pub const DEFAULT_CACHE_TTL_SECS: u64 = 30;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default = "default_path_prefix")]
    pub path_prefix: Option<String>,
    #[serde(default = "default_true")]
    pub metrics_enabled: bool,
    #[serde(default = "default_cache_ttl")]
    pub cache_ttl_secs: u64,
    #[serde(default)]
    pub chain: ChainConfig,
    #[serde(default)]
    pub integrations: IntegrationConfig,
}

fn default_bind_addr() -> String {
    "0.0.0.0:3001".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_path_prefix() -> Option<String> {
    Some("/api".to_string())
}

fn default_true() -> bool {
    true
}

fn default_cache_ttl() -> u64 {
    DEFAULT_CACHE_TTL_SECS
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            log_level: default_log_level(),
            path_prefix: default_path_prefix(),
            metrics_enabled: true,
            cache_ttl_secs: DEFAULT_CACHE_TTL_SECS,
            chain: ChainConfig::default(),
            integrations: IntegrationConfig::default(),
        }
    }
}

impl ServiceConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config = serde_json::from_str::<Self>(&contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.cache_ttl_secs == 0 {
            return Err(Error::Config("cache_ttl_secs must be positive".into()));
        }
        if !(self.chain.average_block_time_secs.is_finite() && self.chain.average_block_time_secs > 0.0) {
            return Err(Error::Config(format!(
                "average_block_time_secs must be positive, got {}",
                self.chain.average_block_time_secs
            )));
        }
        if self.bind_addr.parse::<std::net::SocketAddr>().is_err() {
            return Err(Error::Config(format!("invalid bind address '{}'", self.bind_addr)));
        }
        Ok(())
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = ServiceConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.chain.average_block_time_secs, 12.0);
        assert_eq!(config.cache_ttl(), Duration::from_secs(30));
        assert_eq!(config.chain.bonding_manager(), chain::DEFAULT_BONDING_MANAGER_ADDRESS);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: ServiceConfig = serde_json::from_str(
            r#"{"bind_addr":"127.0.0.1:8080","chain":{"average_block_time_secs":2.5}}"#,
        )
        .unwrap();
        assert_eq!(config.bind_addr, "127.0.0.1:8080");
        assert_eq!(config.chain.average_block_time_secs, 2.5);
        assert_eq!(config.log_level, "info");
        assert_eq!(config.path_prefix.as_deref(), Some("/api"));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = ServiceConfig::default();
        config.chain.average_block_time_secs = 0.0;
        assert!(config.validate().is_err());

        let mut config = ServiceConfig::default();
        config.cache_ttl_secs = 0;
        assert!(config.validate().is_err());

        let mut config = ServiceConfig::default();
        config.bind_addr = "nowhere".into();
        assert!(config.validate().is_err());
    }
}
