//! Text views of the dashboard.
//!
//! Every view is a pure function of the state it shows, so rendering is
//! the same whether it is printed once or on every state change.

use ::config::NetworkConfig;
use alloy_primitives::Address;
use session::{SessionState, TransferState, TransferStatus};

const APP_NAME: &str = "AsP Payments";
const RULE: &str = "────────────────────────────────────────────";

const TRADE_LINKS: [(&str, &str); 2] = [
    ("Trade on PancakeSwap", "https://pancakeswap.finance"),
    ("Trade on Uniswap", "https://uniswap.org"),
];

/// `0xABCD...1234` form of a checksummed address.
pub fn format_address(address: &Address) -> String {
    let full = address.to_checksum(None);
    format!("{}...{}", &full[..6], &full[full.len() - 4..])
}

/// Round a whole-unit decimal string for display; unparsable input shows as zero.
pub fn format_fixed(value: &str, places: usize) -> String {
    let value = value.trim().parse::<f64>().unwrap_or(0.0);
    format!("{value:.places$}")
}

pub fn header(network: &NetworkConfig) -> String {
    [
        RULE.to_string(),
        format!(" {APP_NAME}  ·  {}", network.display_name),
        RULE.to_string(),
    ]
    .join("\n")
}

pub fn footer() -> String {
    [
        RULE.to_string(),
        format!(" {APP_NAME} · ERC-20 utility token for blockchain payments"),
        " Built for learning and demonstration purposes.".to_string(),
    ]
    .join("\n")
}

/// Shown while no account is connected.
pub fn connect_prompt(state: &SessionState, symbol: &str) -> String {
    let mut lines = vec![
        "Connect Your Wallet".to_string(),
        format!("Connect your wallet to access your {symbol} tokens and start making payments."),
    ];

    if let Some(error) = &state.error_message {
        lines.push(format!("! {error}"));
    }

    let button = if state.is_connecting {
        "[ Connecting... ]"
    } else {
        "[ Connect Wallet ]"
    };
    lines.push(button.to_string());

    lines.push(format!("About {symbol}"));
    lines.extend(
        [
            "ERC-20 utility token for blockchain payments",
            "Fixed supply with transparent smart contracts",
            "Secure wallet-based transactions",
            "Testnet deployed for demonstration",
        ]
        .iter()
        .map(|item| format!("  - {item}")),
    );

    lines.join("\n")
}

/// Address, balances and network of the connected account.
pub fn dashboard(state: &SessionState, network: &NetworkConfig, symbol: &str) -> String {
    let address = state
        .address
        .as_ref()
        .map_or_else(|| "-".to_string(), format_address);

    let mut lines = vec![
        "Your Wallet                      [ Disconnect ]".to_string(),
        format!("Connected Address  {address}  [ Copy ]"),
        format!("ETH Balance        {} ETH", format_fixed(&state.native_balance, 4)),
        format!(
            "{:<19}{} {symbol}",
            format!("{symbol} Balance"),
            format_fixed(&state.token_balance, 2)
        ),
        format!("Network            {}", network.display_name),
        "Token Type         ERC-20".to_string(),
    ];

    lines.extend(
        TRADE_LINKS
            .iter()
            .map(|(label, url)| format!("  {label}: {url}")),
    );

    lines.join("\n")
}

/// Transfer form with the status of the current request.
pub fn transfer_form(state: &TransferState, network: &NetworkConfig, symbol: &str) -> String {
    let field = |value: &str, placeholder: &str| {
        if value.is_empty() {
            placeholder.to_string()
        } else {
            value.to_string()
        }
    };

    let mut lines = vec![
        format!("Send {symbol} Tokens"),
        format!("Recipient Address  {}", field(&state.recipient, "0x...")),
        format!("Amount ({symbol})       {}", field(&state.amount, "0.0")),
    ];

    if let Some(message) = &state.result_message {
        let marker = match state.status {
            TransferStatus::Failed => "!",
            _ => "✓",
        };
        lines.push(format!("{marker} {message}"));
    }

    if let Some(tx_hash) = &state.last_tx_hash {
        lines.push(format!("  {}", network.tx_url(tx_hash)));
    }

    let button = if state.is_submitting() {
        "[ Sending... ]"
    } else if state.can_submit() {
        "[ Send Tokens ]"
    } else {
        "[ Send Tokens ] (fill in recipient and amount)"
    };
    lines.push(button.to_string());

    lines.push("Transfer Information".to_string());
    lines.extend(
        [
            "Transfers are processed on the blockchain and may take a few seconds",
            "Make sure the recipient address is correct before sending",
            "A small gas fee will be required for the transaction",
            "Transactions are irreversible once confirmed",
        ]
        .iter()
        .map(|item| format!("  - {item}")),
    );

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::{address, TxHash};

    const ALICE: Address = address!("abcd000000000000000000000000000000001234");

    #[test]
    fn test_format_address() {
        let formatted = format_address(&ALICE);
        assert!(formatted.starts_with("0x"));
        assert_eq!(formatted.len(), 6 + 3 + 4);
        assert!(formatted.ends_with("1234"));
        assert_eq!(formatted.to_lowercase(), "0xabcd...1234");
    }

    #[test]
    fn test_format_fixed() {
        assert_eq!(format_fixed("2.5", 4), "2.5000");
        assert_eq!(format_fixed("1.0", 2), "1.00");
        assert_eq!(format_fixed("0", 2), "0.00");
        assert_eq!(format_fixed("garbage", 2), "0.00");
    }

    #[test]
    fn test_connect_prompt_shows_error() {
        let state = SessionState {
            error_message: Some("Wallet provider not installed".to_string()),
            ..SessionState::default()
        };

        let view = connect_prompt(&state, "AsP");
        assert!(view.contains("! Wallet provider not installed"));
        assert!(view.contains("[ Connect Wallet ]"));
    }

    #[test]
    fn test_connect_prompt_while_connecting() {
        let state = SessionState {
            is_connecting: true,
            ..SessionState::default()
        };

        assert!(connect_prompt(&state, "AsP").contains("[ Connecting... ]"));
    }

    #[test]
    fn test_dashboard_balances() {
        let mut state = SessionState::connected(ALICE, "2.5".to_string());
        state.token_balance = "1.0".to_string();

        let view = dashboard(&state, &NetworkConfig::sepolia(), "AsP");
        assert!(view.contains("2.5000 ETH"));
        assert!(view.contains("1.00 AsP"));
        assert!(view.contains("Ethereum Sepolia Testnet"));
        assert!(view.contains("...1234"));
    }

    #[test]
    fn test_transfer_form_states() {
        let network = NetworkConfig::sepolia();

        let idle = TransferState::default();
        assert!(transfer_form(&idle, &network, "AsP").contains("(fill in recipient and amount)"));

        let submitting = TransferState {
            recipient: ALICE.to_string(),
            amount: "1".to_string(),
            status: TransferStatus::Submitting,
            result_message: Some("Transaction submitted. Waiting for confirmation...".to_string()),
            last_tx_hash: Some(TxHash::repeat_byte(1)),
        };
        let view = transfer_form(&submitting, &network, "AsP");
        assert!(view.contains("[ Sending... ]"));
        assert!(view.contains("✓ Transaction submitted"));
        assert!(view.contains("https://sepolia.etherscan.io/tx/0x0101"));

        let failed = TransferState {
            status: TransferStatus::Failed,
            result_message: Some("Token contract address not configured".to_string()),
            ..TransferState::default()
        };
        assert!(transfer_form(&failed, &network, "AsP")
            .contains("! Token contract address not configured"));
    }
}
