//! Wallet connection flow.
//!
//! [`ConnectionController`] owns the [`SessionStore`] and is the only code
//! that writes to it. Connect failures end up in
//! [`SessionState::error_message`]; nothing is returned to the caller.
//!
//! Two `connect` calls are not serialized against each other. An
//! accounts-changed notification that arrives while a manual connect is
//! still waiting on the wallet starts a second flow, and whichever finishes
//! last decides the state.

use crate::state::{SessionState, SessionStore};
use alloy_primitives::Address;
use balance::{monitor::BalanceMonitor, BalanceQuery, Monitor};
use config::TokenAddress;
use thiserror::Error;
use tokio::sync::{broadcast::error::RecvError, watch};
use tracing::{debug, info, warn};
use wallet::{ProviderEvent, WalletError, WalletProvider};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConnectError {
    /// No wallet provider was injected
    #[error("Wallet provider not installed")]
    ProviderUnavailable,

    /// The wallet granted access but exposed no account
    #[error("Wallet returned no accounts")]
    NoAccounts,

    /// Native balance could not be read
    #[error("{0}")]
    Balance(String),

    /// Token balance could not be read; logged, never shown
    #[error("Token balance unavailable: {0}")]
    TokenBalanceUnavailable(String),

    #[error(transparent)]
    Wallet(#[from] WalletError),
}

/// Why [`ConnectionController::listen`] stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListenOutcome {
    /// The wallet switched chains; the application must be rebuilt.
    Reload { chain_id: u64 },
    /// The provider's event channel is gone (or there is no provider).
    Closed,
}

/// Drives connect, disconnect and provider notifications.
pub struct ConnectionController<W> {
    wallet: Option<W>,
    token: TokenAddress,
    store: SessionStore,
}

impl<W> ConnectionController<W>
where
    W: WalletProvider,
{
    /// `wallet` is `None` when no provider is installed.
    pub fn new(wallet: Option<W>, token: TokenAddress) -> Self {
        Self {
            wallet,
            token,
            store: SessionStore::new(),
        }
    }

    /// Copy of the current session state.
    pub fn state(&self) -> SessionState {
        self.store.snapshot()
    }

    /// Receiver notified on every session change.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.store.subscribe()
    }

    pub const fn wallet(&self) -> Option<&W> {
        self.wallet.as_ref()
    }

    /// Connect to the wallet and load balances.
    ///
    /// Sets `is_connecting` for the duration of the account request and the
    /// native balance query. The token balance is loaded afterwards. Its
    /// failure is only logged and leaves the rest of the session intact.
    pub async fn connect(&self) {
        let Some(wallet) = &self.wallet else {
            warn!("Connect requested without a wallet provider");
            self.store.update(|state| {
                state.is_connecting = false;
                state.error_message = Some(ConnectError::ProviderUnavailable.to_string());
            });
            return;
        };

        self.store.update(|state| {
            state.is_connecting = true;
            state.error_message = None;
        });

        let monitor = BalanceMonitor::new(wallet);

        let (address, native_balance) = match load_account(wallet, &monitor).await {
            Ok(loaded) => loaded,
            Err(err) => {
                warn!(error = %err, "Wallet connection failed");
                self.store.update(|state| {
                    state.is_connecting = false;
                    state.error_message = Some(err.to_string());
                });
                return;
            }
        };

        info!(address = %address, balance = %native_balance, "Wallet connected");
        self.store
            .replace(SessionState::connected(address, native_balance));

        let Some(token) = self.token.deployed() else {
            debug!("Token address not configured, skipping token balance");
            return;
        };

        let query = BalanceQuery::ERC20Balance {
            token,
            holder: address,
        };
        match monitor.query_balance(query).await {
            Ok(balance) => {
                let formatted = balance.formatted();
                debug!(token = %token, balance = %formatted, "Token balance loaded");
                self.store.update(|state| {
                    // Skip if the session moved on while we were waiting.
                    if state.address == Some(address) {
                        state.token_balance = formatted;
                    }
                });
            }
            Err(err) => {
                let err = ConnectError::TokenBalanceUnavailable(err.to_string());
                warn!(token = %token, error = %err, "Failed to load token balance");
            }
        }
    }

    /// Forget the session. Wallets have no disconnect call, so this is local.
    pub fn disconnect(&self) {
        info!("Wallet disconnected");
        self.store.replace(SessionState::default());
    }

    /// Apply one provider notification.
    ///
    /// Returns `Some` when the application has to stop and be rebuilt.
    pub async fn handle_event(&self, event: ProviderEvent) -> Option<ListenOutcome> {
        match event {
            ProviderEvent::AccountsChanged(accounts) if accounts.is_empty() => {
                info!("Wallet exposed no accounts");
                self.disconnect();
                None
            }
            ProviderEvent::AccountsChanged(accounts) => {
                info!(accounts = ?accounts, "Wallet accounts changed, reconnecting");
                self.connect().await;
                None
            }
            ProviderEvent::ChainChanged(chain_id) => {
                info!(chain_id, "Wallet chain changed, reloading");
                Some(ListenOutcome::Reload { chain_id })
            }
        }
    }

    /// Follow provider notifications until a chain change or channel close.
    ///
    /// Subscribes on entry; dropping the future drops the subscription.
    pub async fn listen(&self) -> ListenOutcome {
        let Some(wallet) = &self.wallet else {
            return ListenOutcome::Closed;
        };

        let mut events = wallet.subscribe();
        loop {
            match events.recv().await {
                Ok(event) => {
                    if let Some(outcome) = self.handle_event(event).await {
                        return outcome;
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "Missed wallet notifications");
                }
                Err(RecvError::Closed) => return ListenOutcome::Closed,
            }
        }
    }
}

/// Request the account and read its native balance.
async fn load_account<W, M>(wallet: &W, monitor: &M) -> Result<(Address, String), ConnectError>
where
    W: WalletProvider,
    M: Monitor,
{
    let accounts = wallet.request_accounts().await?;
    let address = *accounts.first().ok_or(ConnectError::NoAccounts)?;

    let balance = monitor
        .query_balance(BalanceQuery::NativeBalance { address })
        .await
        .map_err(|e| ConnectError::Balance(e.to_string()))?;

    Ok((address, balance.formatted()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{MockWallet, ALICE, BOB, TOKEN};
    use alloy_primitives::U256;

    fn eth(amount: u128) -> U256 {
        U256::from(amount) * U256::from(10u128.pow(18)) / U256::from(10)
    }

    #[tokio::test]
    async fn test_connect_loads_native_and_token_balance() {
        let wallet = MockWallet::with_account(ALICE);
        wallet.set_native_balance(ALICE, U256::from(2_500_000_000_000_000_000u128));
        wallet.set_token_balance(Some(U256::from(1_000_000_000_000_000_000u128)), 18);

        let controller = ConnectionController::new(Some(wallet), TOKEN.into());
        controller.connect().await;

        let state = controller.state();
        assert_eq!(state.address, Some(ALICE));
        assert_eq!(state.native_balance, "2.5");
        assert_eq!(state.token_balance, "1.0");
        assert!(!state.is_connecting);
        assert_eq!(state.error_message, None);
    }

    #[tokio::test]
    async fn test_is_connecting_only_while_in_flight() {
        let wallet = MockWallet::with_account(ALICE);
        let gate = wallet.hold_account_requests();
        let controller = ConnectionController::new(Some(wallet), TokenAddress::Placeholder);
        let rx = controller.subscribe();

        assert!(!controller.state().is_connecting);

        let ((), observed) = tokio::join!(controller.connect(), async {
            tokio::task::yield_now().await;
            let observed = rx.borrow().is_connecting;
            gate.notify_one();
            observed
        });

        assert!(observed);
        let state = controller.state();
        assert!(!state.is_connecting);
        assert_eq!(state.address, Some(ALICE));
    }

    #[tokio::test]
    async fn test_connect_without_provider() {
        let controller: ConnectionController<MockWallet> =
            ConnectionController::new(None, TOKEN.into());
        controller.connect().await;

        let state = controller.state();
        assert_eq!(state.address, None);
        assert_eq!(
            state.error_message.as_deref(),
            Some("Wallet provider not installed")
        );
        assert!(!state.is_connecting);
    }

    #[tokio::test]
    async fn test_connect_user_rejected() {
        let wallet = MockWallet::with_account(ALICE);
        wallet.reject_account_requests();
        let controller = ConnectionController::new(Some(wallet), TOKEN.into());

        controller.connect().await;

        let state = controller.state();
        assert_eq!(state.address, None);
        assert_eq!(
            state.error_message.as_deref(),
            Some("User rejected the request")
        );
        assert!(!state.is_connecting);
        assert_eq!(state.native_balance, "0");
    }

    #[tokio::test]
    async fn test_connect_with_no_accounts() {
        let wallet = MockWallet::default();
        let controller = ConnectionController::new(Some(wallet), TOKEN.into());

        controller.connect().await;

        assert_eq!(
            controller.state().error_message.as_deref(),
            Some("Wallet returned no accounts")
        );
    }

    #[tokio::test]
    async fn test_retry_clears_previous_error() {
        let wallet = MockWallet::with_account(ALICE);
        wallet.reject_account_requests();
        let controller = ConnectionController::new(Some(wallet.clone()), TOKEN.into());

        controller.connect().await;
        assert!(controller.state().error_message.is_some());

        wallet.accept_account_requests();
        controller.connect().await;
        let state = controller.state();
        assert_eq!(state.error_message, None);
        assert_eq!(state.address, Some(ALICE));
    }

    #[tokio::test]
    async fn test_token_balance_failure_is_not_fatal() {
        let wallet = MockWallet::with_account(ALICE);
        wallet.set_native_balance(ALICE, eth(25));
        wallet.set_token_balance(None, 18);
        let controller = ConnectionController::new(Some(wallet), TOKEN.into());

        controller.connect().await;

        let state = controller.state();
        assert_eq!(state.address, Some(ALICE));
        assert_eq!(state.native_balance, "2.5");
        assert_eq!(state.token_balance, "0");
        assert_eq!(state.error_message, None);
        assert!(!state.is_connecting);
    }

    #[tokio::test]
    async fn test_placeholder_token_skips_contract() {
        let wallet = MockWallet::with_account(ALICE);
        let controller =
            ConnectionController::new(Some(wallet.clone()), TokenAddress::Placeholder);

        controller.connect().await;

        assert!(controller.state().is_connected());
        assert_eq!(controller.state().token_balance, "0");
        assert!(!wallet.calls().iter().any(|call| call.starts_with("balanceOf")));
    }

    #[tokio::test]
    async fn test_disconnect_resets_state() {
        let wallet = MockWallet::with_account(ALICE);
        wallet.set_native_balance(ALICE, eth(25));
        wallet.set_token_balance(Some(U256::from(7)), 0);
        let controller = ConnectionController::new(Some(wallet.clone()), TOKEN.into());

        controller.connect().await;
        assert!(controller.state().is_connected());

        controller.disconnect();
        assert_eq!(controller.state(), SessionState::default());

        // Also from an error state.
        wallet.reject_account_requests();
        controller.connect().await;
        controller.disconnect();
        assert_eq!(controller.state(), SessionState::default());
    }

    #[tokio::test]
    async fn test_empty_accounts_changed_disconnects() {
        let wallet = MockWallet::with_account(ALICE);
        let controller = ConnectionController::new(Some(wallet), TOKEN.into());
        controller.connect().await;

        let outcome = controller
            .handle_event(ProviderEvent::AccountsChanged(vec![]))
            .await;

        assert_eq!(outcome, None);
        assert_eq!(controller.state(), SessionState::default());
    }

    #[tokio::test]
    async fn test_accounts_changed_refreshes_new_account() {
        let wallet = MockWallet::with_account(ALICE);
        wallet.set_native_balance(ALICE, eth(10));
        wallet.set_native_balance(BOB, eth(25));
        let controller = ConnectionController::new(Some(wallet.clone()), TokenAddress::Placeholder);
        controller.connect().await;
        assert_eq!(controller.state().native_balance, "1.0");

        wallet.set_accounts(vec![BOB]);
        let outcome = controller
            .handle_event(ProviderEvent::AccountsChanged(vec![BOB]))
            .await;

        assert_eq!(outcome, None);
        let state = controller.state();
        assert_eq!(state.address, Some(BOB));
        assert_eq!(state.native_balance, "2.5");
    }

    #[tokio::test]
    async fn test_listen_reloads_on_chain_change() {
        let wallet = MockWallet::with_account(ALICE);
        let controller = ConnectionController::new(Some(wallet.clone()), TOKEN.into());

        let (outcome, ()) = tokio::join!(controller.listen(), async {
            tokio::task::yield_now().await;
            wallet.emit(ProviderEvent::AccountsChanged(vec![ALICE]));
            wallet.emit(ProviderEvent::ChainChanged(11155111));
        });

        assert_eq!(outcome, ListenOutcome::Reload { chain_id: 11155111 });
        assert_eq!(controller.state().address, Some(ALICE));
    }

    #[tokio::test]
    async fn test_listen_without_provider_is_closed() {
        let controller: ConnectionController<MockWallet> =
            ConnectionController::new(None, TokenAddress::Placeholder);
        assert_eq!(controller.listen().await, ListenOutcome::Closed);
    }
}
