use alloy_primitives::Address;
use tokio::sync::watch;

/// Balance string shown while disconnected.
pub const ZERO_BALANCE: &str = "0";

/// Connection status, address and balances of the wallet session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionState {
    /// Connected account; `None` while disconnected
    pub address: Option<Address>,
    /// ETH balance in whole units
    pub native_balance: String,
    /// Token balance in whole units
    pub token_balance: String,
    /// Set only while a connect call is in flight
    pub is_connecting: bool,
    /// Reason the last connect failed
    pub error_message: Option<String>,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            address: None,
            native_balance: ZERO_BALANCE.to_string(),
            token_balance: ZERO_BALANCE.to_string(),
            is_connecting: false,
            error_message: None,
        }
    }
}

impl SessionState {
    /// Freshly connected session; the token balance is filled in later.
    pub fn connected(address: Address, native_balance: String) -> Self {
        Self {
            address: Some(address),
            native_balance,
            ..Self::default()
        }
    }

    pub const fn is_connected(&self) -> bool {
        self.address.is_some()
    }
}

/// Holds the session state and notifies subscribers on every change.
///
/// Writes are crate-private: the connection controller owns the store and
/// is the only writer.
#[derive(Debug)]
pub struct SessionStore {
    tx: watch::Sender<SessionState>,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStore {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(SessionState::default());
        Self { tx }
    }

    /// Receiver that observes every subsequent change.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.tx.subscribe()
    }

    /// Copy of the current state.
    pub fn snapshot(&self) -> SessionState {
        self.tx.borrow().clone()
    }

    pub(crate) fn update(&self, modify: impl FnOnce(&mut SessionState)) {
        self.tx.send_modify(modify);
    }

    pub(crate) fn replace(&self, state: SessionState) {
        self.tx.send_replace(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::address;

    #[test]
    fn test_default_is_disconnected() {
        let state = SessionState::default();
        assert!(!state.is_connected());
        assert_eq!(state.native_balance, "0");
        assert_eq!(state.token_balance, "0");
        assert!(!state.is_connecting);
        assert_eq!(state.error_message, None);
    }

    #[test]
    fn test_connected_resets_token_balance() {
        let address = address!("1111111111111111111111111111111111111111");
        let state = SessionState::connected(address, "2.5".to_string());
        assert_eq!(state.address, Some(address));
        assert_eq!(state.native_balance, "2.5");
        assert_eq!(state.token_balance, ZERO_BALANCE);
        assert!(!state.is_connecting);
    }

    #[test]
    fn test_store_notifies_subscribers() {
        let store = SessionStore::new();
        let mut rx = store.subscribe();
        assert!(!rx.has_changed().unwrap());

        store.update(|state| state.is_connecting = true);

        assert!(rx.has_changed().unwrap());
        assert!(rx.borrow_and_update().is_connecting);
        assert!(store.snapshot().is_connecting);
    }

    #[test]
    fn test_store_replace() {
        let store = SessionStore::new();
        store.update(|state| state.error_message = Some("boom".to_string()));
        store.replace(SessionState::default());
        assert_eq!(store.snapshot(), SessionState::default());
    }
}
