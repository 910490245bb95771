use ::config::{NetworkConfig, NetworkType, TokenConfig};
use serde::{Deserialize, Serialize};
use std::{path::Path, time::Duration};

const DEFAULT_CHAIN_POLL_INTERVAL_SECS: u64 = 4;

/// Top-level dashboard configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// RPC endpoint url
    pub rpc_url: String,

    /// Network the dashboard expects the endpoint to serve
    #[serde(default)]
    pub network: NetworkType,

    /// Token contract; the address may be left as the `0x...` placeholder
    #[serde(default)]
    pub token: TokenConfig,

    /// Seconds between chain id polls; 0 disables chain change detection
    #[serde(default = "default_chain_poll_interval_secs")]
    pub chain_poll_interval_secs: u64,
}

const fn default_chain_poll_interval_secs() -> u64 {
    DEFAULT_CHAIN_POLL_INTERVAL_SECS
}

impl Config {
    pub fn from_file(path: impl AsRef<Path>) -> eyre::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&contents)?;

        Ok(config)
    }

    pub const fn network_config(&self) -> NetworkConfig {
        NetworkConfig::from_network_type(self.network)
    }

    pub const fn chain_poll_interval(&self) -> Option<Duration> {
        match self.chain_poll_interval_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ::config::TokenAddress;

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config: Config = toml::from_str(r#"rpc_url = "http://localhost:8545""#).unwrap();

        assert_eq!(config.network, NetworkType::Sepolia);
        assert_eq!(config.token.address, TokenAddress::Placeholder);
        assert_eq!(config.token.symbol, "AsP");
        assert_eq!(config.chain_poll_interval(), Some(Duration::from_secs(4)));
    }

    #[test]
    fn test_zero_interval_disables_polling() {
        let config: Config = toml::from_str(
            r#"
            rpc_url = "http://localhost:8545"
            chain_poll_interval_secs = 0
            "#,
        )
        .unwrap();

        assert_eq!(config.chain_poll_interval(), None);
    }

    #[test]
    fn test_mainnet_network() {
        let config: Config = toml::from_str(
            r#"
            rpc_url = "http://localhost:8545"
            network = "mainnet"
            "#,
        )
        .unwrap();

        assert_eq!(config.network_config().chain_id, 1);
    }
}
