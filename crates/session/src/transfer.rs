//! Token transfer flow.
//!
//! A transfer runs strictly in sequence: signer, `decimals()`, amount
//! scaling, `transfer(..)`, confirmation. Nothing is retried. The
//! controller does not lock against a second submission; callers check
//! [`TransferState::can_submit`] first, the same way a form disables its
//! submit button.

use alloy_primitives::TxHash;
use balance::units::{self, UnitsError};
use config::TokenAddress;
use thiserror::Error;
use tokio::sync::watch;
use tracing::{debug, info, warn};
use wallet::{
    PendingTransfer, SignedToken, Signer, TokenContract, TransferReceipt, WalletError,
    WalletProvider,
};

pub const SUBMITTED_MESSAGE: &str = "Transaction submitted. Waiting for confirmation...";
pub const SUCCESS_MESSAGE: &str = "Transfer successful!";
pub const FALLBACK_FAILURE_MESSAGE: &str = "Transfer failed. Please try again.";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransferError {
    #[error("Token contract address not configured")]
    NotConfigured,

    #[error("Wallet provider not installed")]
    ProviderUnavailable,

    /// The amount has more fractional digits than the token supports
    #[error("Amount has more than {decimals} decimal places")]
    AmountPrecisionExceeded { decimals: u8 },

    #[error("{0}")]
    InvalidAmount(String),

    #[error("User rejected the request")]
    UserRejected,

    /// Reason reported by the wallet or the contract, passed through as is
    #[error("{0}")]
    TransferFailed(String),
}

impl TransferError {
    /// Text shown in the transfer form.
    pub fn user_message(&self) -> String {
        match self {
            Self::TransferFailed(reason) if reason.trim().is_empty() => {
                FALLBACK_FAILURE_MESSAGE.to_string()
            }
            other => other.to_string(),
        }
    }
}

impl From<WalletError> for TransferError {
    fn from(err: WalletError) -> Self {
        match err {
            WalletError::UserRejected => Self::UserRejected,
            other => Self::TransferFailed(other.to_string()),
        }
    }
}

impl From<UnitsError> for TransferError {
    fn from(err: UnitsError) -> Self {
        match err {
            UnitsError::PrecisionExceeded { decimals } => {
                Self::AmountPrecisionExceeded { decimals }
            }
            other => Self::InvalidAmount(other.to_string()),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TransferStatus {
    #[default]
    Idle,
    Submitting,
    Confirmed,
    Failed,
}

/// Transfer form fields plus the status of the current request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransferState {
    pub recipient: String,
    pub amount: String,
    pub status: TransferStatus,
    pub result_message: Option<String>,
    /// Hash of the most recently submitted transfer
    pub last_tx_hash: Option<TxHash>,
}

impl TransferState {
    pub fn is_submitting(&self) -> bool {
        self.status == TransferStatus::Submitting
    }

    /// Whether the form may submit: nothing in flight and both fields set.
    pub fn can_submit(&self) -> bool {
        !self.is_submitting()
            && !self.recipient.trim().is_empty()
            && !self.amount.trim().is_empty()
    }
}

/// Submits token transfers through the wallet's signer.
pub struct TransferController<W> {
    wallet: Option<W>,
    token: TokenAddress,
    state: watch::Sender<TransferState>,
}

impl<W> TransferController<W>
where
    W: WalletProvider,
{
    pub fn new(wallet: Option<W>, token: TokenAddress) -> Self {
        let (state, _) = watch::channel(TransferState::default());
        Self {
            wallet,
            token,
            state,
        }
    }

    pub fn state(&self) -> TransferState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<TransferState> {
        self.state.subscribe()
    }

    pub fn set_recipient(&self, recipient: impl Into<String>) {
        let recipient = recipient.into();
        self.state.send_modify(|state| state.recipient = recipient);
    }

    pub fn set_amount(&self, amount: impl Into<String>) {
        let amount = amount.into();
        self.state.send_modify(|state| state.amount = amount);
    }

    /// Send `amount` whole tokens to `recipient` and wait for inclusion.
    ///
    /// The outcome is always written to the transfer state; the result is
    /// returned as well for callers that need it.
    pub async fn submit_transfer(
        &self,
        recipient: &str,
        amount: &str,
    ) -> Result<TransferReceipt, TransferError> {
        let result = self.execute(recipient, amount).await;

        match &result {
            Ok(receipt) => {
                info!(
                    tx_hash = %receipt.tx_hash,
                    block_number = ?receipt.block_number,
                    "Token transfer confirmed"
                );
                let tx_hash = receipt.tx_hash;
                self.state.send_modify(|state| {
                    state.status = TransferStatus::Confirmed;
                    state.result_message = Some(SUCCESS_MESSAGE.to_string());
                    state.last_tx_hash = Some(tx_hash);
                    state.recipient.clear();
                    state.amount.clear();
                });
            }
            Err(err) => {
                warn!(error = %err, recipient, amount, "Token transfer failed");
                let message = err.user_message();
                self.state.send_modify(|state| {
                    state.status = TransferStatus::Failed;
                    state.result_message = Some(message);
                });
            }
        }

        result
    }

    async fn execute(
        &self,
        recipient: &str,
        amount: &str,
    ) -> Result<TransferReceipt, TransferError> {
        let token = self.token.deployed().ok_or(TransferError::NotConfigured)?;
        let wallet = self
            .wallet
            .as_ref()
            .ok_or(TransferError::ProviderUnavailable)?;

        self.state.send_modify(|state| {
            state.status = TransferStatus::Submitting;
            state.result_message = None;
        });

        let signer = wallet.signer().await?;
        let contract = signer.token(token);

        let decimals = contract.decimals().await?;
        let value = units::parse_units(amount, decimals)?;
        debug!(
            from = %signer.address(),
            token = %token,
            recipient,
            amount,
            decimals,
            value = %value,
            "Submitting token transfer"
        );

        let pending = contract.transfer(recipient, value).await?;
        let tx_hash = pending.tx_hash();
        info!(tx_hash = %tx_hash, "Token transfer submitted, waiting for confirmation");

        self.state.send_modify(|state| {
            state.result_message = Some(SUBMITTED_MESSAGE.to_string());
            state.last_tx_hash = Some(tx_hash);
        });

        let receipt = pending.confirm().await?;
        Ok(receipt)
    }
}
