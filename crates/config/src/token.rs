//! Token contract configuration.
//!
//! The deployed token address may be left as the `0x...` placeholder. In
//! that case token balances and transfers are switched off instead of
//! failing at startup.

use alloy_primitives::Address;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use thiserror::Error;

/// Value used in config files before the token is deployed.
pub const TOKEN_ADDRESS_PLACEHOLDER: &str = "0x...";

/// Default ticker shown next to token amounts.
pub const DEFAULT_TOKEN_SYMBOL: &str = "AsP";

#[derive(Error, Debug, PartialEq, Eq)]
#[error("Invalid token address {input:?}: {reason}")]
pub struct TokenAddressError {
    input: String,
    reason: String,
}

/// The configured token contract address.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum TokenAddress {
    /// Not deployed yet; token features are disabled.
    #[default]
    Placeholder,
    /// Deployed contract address.
    Deployed(Address),
}

impl TokenAddress {
    /// The contract address, if one is configured.
    pub const fn deployed(&self) -> Option<Address> {
        match self {
            Self::Placeholder => None,
            Self::Deployed(address) => Some(*address),
        }
    }

    pub const fn is_configured(&self) -> bool {
        matches!(self, Self::Deployed(_))
    }
}

impl FromStr for TokenAddress {
    type Err = TokenAddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() || s == TOKEN_ADDRESS_PLACEHOLDER {
            return Ok(Self::Placeholder);
        }

        s.parse::<Address>()
            .map(Self::Deployed)
            .map_err(|e| TokenAddressError {
                input: s.to_string(),
                reason: e.to_string(),
            })
    }
}

impl TryFrom<String> for TokenAddress {
    type Error = TokenAddressError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TokenAddress> for String {
    fn from(value: TokenAddress) -> Self {
        value.to_string()
    }
}

impl From<Address> for TokenAddress {
    fn from(value: Address) -> Self {
        Self::Deployed(value)
    }
}

impl fmt::Display for TokenAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Placeholder => f.write_str(TOKEN_ADDRESS_PLACEHOLDER),
            Self::Deployed(address) => write!(f, "{address}"),
        }
    }
}

/// Token section of the config file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenConfig {
    /// ERC20 contract address
    #[serde(default)]
    pub address: TokenAddress,
    /// Ticker used when rendering amounts
    #[serde(default = "default_symbol")]
    pub symbol: String,
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            address: TokenAddress::Placeholder,
            symbol: default_symbol(),
        }
    }
}

fn default_symbol() -> String {
    DEFAULT_TOKEN_SYMBOL.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::address;

    #[test]
    fn test_placeholder_is_not_configured() {
        let token: TokenAddress = "0x...".parse().unwrap();
        assert_eq!(token, TokenAddress::Placeholder);
        assert!(!token.is_configured());
        assert_eq!(token.deployed(), None);
    }

    #[test]
    fn test_empty_is_placeholder() {
        let token: TokenAddress = "  ".parse().unwrap();
        assert_eq!(token, TokenAddress::Placeholder);
    }

    #[test]
    fn test_deployed_address() {
        let token: TokenAddress = "0x1111111111111111111111111111111111111111".parse().unwrap();
        assert_eq!(
            token.deployed(),
            Some(address!("1111111111111111111111111111111111111111"))
        );
    }

    #[test]
    fn test_invalid_address() {
        let err = "0x1234".parse::<TokenAddress>().unwrap_err();
        assert!(err.to_string().contains("0x1234"));
    }

    #[test]
    fn test_token_config_from_toml() {
        let config: TokenConfig = toml::from_str(r#"address = "0x...""#).unwrap();
        assert_eq!(config.address, TokenAddress::Placeholder);
        assert_eq!(config.symbol, "AsP");

        let config: TokenConfig = toml::from_str(
            r#"
            address = "0x2222222222222222222222222222222222222222"
            symbol = "TKN"
            "#,
        )
        .unwrap();
        assert!(config.address.is_configured());
        assert_eq!(config.symbol, "TKN");
    }

    #[test]
    fn test_token_config_rejects_bad_address() {
        let result = toml::from_str::<TokenConfig>(r#"address = "not-an-address""#);
        assert!(result.is_err());
    }
}
