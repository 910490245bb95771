//! Config file loading.


use config::{NetworkType, TokenAddress};
use dashboard::config::Config;
use setup::load_test_config;

#[test]
fn test_load_test_config() {
    let config = load_test_config();

    assert_eq!(config.network, NetworkType::Sepolia);
    assert_eq!(config.token.address, TokenAddress::Placeholder);
    assert_eq!(config.token.symbol, "AsP");
    assert_eq!(config.chain_poll_interval(), None);
}

#[test]
fn test_missing_config_file() {
    assert!(Config::from_file("tests/does-not-exist.toml").is_err());
}

#[test]
fn test_invalid_token_address_rejected() {
    let path = std::env::temp_dir().join("dashboard-invalid-token.toml");
    std::fs::write(
        &path,
        r#"
        rpc_url = "http://localhost:8545"

        [token]
        address = "0xnot-an-address"
        "#,
    )
    .unwrap();

    let result = Config::from_file(&path);
    std::fs::remove_file(&path).ok();

    assert!(result.is_err());
}
