//! Wallet provider and token contract boundary.
//!
//! The dashboard never signs or encodes anything itself. Everything it needs
//! from the chain goes through the traits in this crate:
//! - [`WalletProvider`]: account access, native balances, signer handles and
//!   account/chain change notifications
//! - [`TokenContract`] / [`SignedToken`]: the ERC20 reads and the `transfer`
//!   write
//! - [`PendingTransfer`]: a submitted transaction whose inclusion is awaited
//!   separately
//!
//! [`RpcWallet`] implements the provider over an HTTP JSON-RPC endpoint and
//! a locally held key.

mod erc20;
mod rpc;

pub use erc20::Erc20;
pub use rpc::{create_provider, create_wallet_provider, RpcPending, RpcSigner, RpcWallet};

use alloy_primitives::{Address, TxHash, U256};
use std::future::Future;
use thiserror::Error;
use tokio::sync::broadcast;

/// EIP-1193 error code for a request the user declined.
pub const USER_REJECTED_CODE: i64 = 4001;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WalletError {
    /// The user declined the connection or transaction prompt
    #[error("User rejected the request")]
    UserRejected,

    /// No account is unlocked in the wallet
    #[error("No account connected")]
    NoAccount,

    /// Error parsing or validating URLs
    #[error("Invalid RPC URL: {0}")]
    InvalidUrl(String),

    /// Error with private key
    #[error("Invalid private key: {0}")]
    InvalidPrivateKey(String),

    /// Recipient or holder address could not be parsed
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    /// JSON-RPC transport failure, message passed through
    #[error("{0}")]
    Rpc(String),

    /// Contract call failure, message passed through
    #[error("{0}")]
    Contract(String),

    /// Transaction was included but reverted
    #[error("Transaction reverted: {0}")]
    Reverted(TxHash),
}

impl From<alloy_transport::TransportError> for WalletError {
    fn from(err: alloy_transport::TransportError) -> Self {
        if err
            .as_error_resp()
            .is_some_and(|payload| payload.code == USER_REJECTED_CODE)
        {
            return Self::UserRejected;
        }
        Self::Rpc(err.to_string())
    }
}

impl From<alloy_contract::Error> for WalletError {
    fn from(err: alloy_contract::Error) -> Self {
        match err {
            alloy_contract::Error::TransportError(err) => err.into(),
            other => Self::Contract(other.to_string()),
        }
    }
}

/// Notification pushed by the wallet provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderEvent {
    /// The exposed account list changed; empty means locked or disconnected.
    AccountsChanged(Vec<Address>),
    /// The wallet switched networks.
    ChainChanged(u64),
}

/// Outcome of an included transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferReceipt {
    /// Transaction hash
    pub tx_hash: TxHash,
    /// Block number where transaction was included
    pub block_number: Option<u64>,
}

/// A wallet capable of exposing accounts and handing out signers.
pub trait WalletProvider: Send + Sync {
    /// Read-only token contract bound to this provider.
    type Token: TokenContract;
    /// Signing handle for the connected account.
    type Signer: Signer;

    /// Ask the wallet for account access.
    ///
    /// May suspend until the user answers the wallet's own prompt.
    fn request_accounts(&self) -> impl Future<Output = Result<Vec<Address>, WalletError>> + Send;

    /// Native balance in wei.
    fn get_balance(&self, address: Address)
        -> impl Future<Output = Result<U256, WalletError>> + Send;

    /// Signer for the currently connected account.
    fn signer(&self) -> impl Future<Output = Result<Self::Signer, WalletError>> + Send;

    /// Token contract at `address`, bound for reads.
    fn token(&self, address: Address) -> Self::Token;

    /// Subscribe to account and chain notifications.
    fn subscribe(&self) -> broadcast::Receiver<ProviderEvent>;
}

/// Signing handle obtained from a [`WalletProvider`].
pub trait Signer: Send + Sync {
    type Token: SignedToken;

    /// Address transactions are sent from.
    fn address(&self) -> Address;

    /// Token contract at `address`, bound to this signer for writes.
    fn token(&self, address: Address) -> Self::Token;
}

/// ERC20 read surface.
pub trait TokenContract: Send + Sync {
    fn address(&self) -> Address;

    /// Balance of `owner` in the token's smallest unit.
    fn balance_of(&self, owner: Address) -> impl Future<Output = Result<U256, WalletError>> + Send;

    fn decimals(&self) -> impl Future<Output = Result<u8, WalletError>> + Send;
}

/// ERC20 contract bound to a signer.
pub trait SignedToken: TokenContract {
    type Pending: PendingTransfer;

    /// Submit `transfer(recipient, amount)`.
    ///
    /// `recipient` is parsed here, at the boundary. Returns once the
    /// transaction is accepted by the node, before inclusion.
    fn transfer(
        &self,
        recipient: &str,
        amount: U256,
    ) -> impl Future<Output = Result<Self::Pending, WalletError>> + Send;
}

/// A submitted transaction awaiting inclusion.
pub trait PendingTransfer: Send {
    fn tx_hash(&self) -> TxHash;

    /// Wait for the transaction to be included.
    fn confirm(self) -> impl Future<Output = Result<TransferReceipt, WalletError>> + Send;
}
