//! Commands read from stdin while `watch` is running.

use std::str::FromStr;

/// Wallet-side action typed at the watch console.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleCommand {
    /// Drop the account; the wallet reports an empty account list.
    Lock,
    /// Restore the key the dashboard was started with.
    Unlock,
    /// Switch to the account of another private key.
    Account(String),
}

impl FromStr for ConsoleCommand {
    type Err = eyre::Report;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut words = line.split_whitespace();
        let command = match (words.next(), words.next()) {
            (Some("lock"), None) => Self::Lock,
            (Some("unlock"), None) => Self::Unlock,
            (Some("account"), Some(key)) => Self::Account(key.to_string()),
            _ => eyre::bail!(
                "Unknown command {:?}, expected `lock`, `unlock` or `account <private-key>`",
                line.trim()
            ),
        };

        if words.next().is_some() {
            eyre::bail!("Unexpected arguments in {:?}", line.trim());
        }
        Ok(command)
    }
}
