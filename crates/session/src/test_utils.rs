//! In-memory wallet provider for controller tests.

use alloy_primitives::{address, Address, TxHash, U256};
use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard},
};
use tokio::sync::{broadcast, Notify};
use wallet::{
    PendingTransfer, ProviderEvent, SignedToken, Signer, TokenContract, TransferReceipt,
    WalletError, WalletProvider,
};

pub const ALICE: Address = address!("ABCD000000000000000000000000000000001234");
pub const BOB: Address = address!("B0B0000000000000000000000000000000000002");
pub const TOKEN: Address = address!("70C0000000000000000000000000000000000003");

#[derive(Default)]
struct MockState {
    accounts: Vec<Address>,
    reject_accounts: bool,
    account_gate: Option<Arc<Notify>>,
    native_balances: HashMap<Address, U256>,
    /// `None` makes `balanceOf` fail
    token_balance: Option<U256>,
    decimals: u8,
    reject_transfers: bool,
    revert_transfers: bool,
    confirm_gate: Option<Arc<Notify>>,
    calls: Vec<String>,
    transfers: Vec<(String, U256)>,
}

/// Wallet provider whose behaviour is set up per test.
#[derive(Clone)]
pub struct MockWallet {
    state: Arc<Mutex<MockState>>,
    events: broadcast::Sender<ProviderEvent>,
}

impl Default for MockWallet {
    fn default() -> Self {
        let (events, _) = broadcast::channel(16);
        Self {
            state: Arc::new(Mutex::new(MockState {
                token_balance: Some(U256::ZERO),
                decimals: 18,
                ..MockState::default()
            })),
            events,
        }
    }
}

impl MockWallet {
    pub fn with_account(address: Address) -> Self {
        let wallet = Self::default();
        wallet.set_accounts(vec![address]);
        wallet
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap()
    }

    pub fn set_accounts(&self, accounts: Vec<Address>) {
        self.lock().accounts = accounts;
    }

    pub fn set_native_balance(&self, address: Address, amount: U256) {
        self.lock().native_balances.insert(address, amount);
    }

    pub fn set_token_balance(&self, amount: Option<U256>, decimals: u8) {
        let mut state = self.lock();
        state.token_balance = amount;
        state.decimals = decimals;
    }

    pub fn reject_account_requests(&self) {
        self.lock().reject_accounts = true;
    }

    pub fn accept_account_requests(&self) {
        self.lock().reject_accounts = false;
    }

    /// Account requests wait until the returned gate is notified.
    pub fn hold_account_requests(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        self.lock().account_gate = Some(gate.clone());
        gate
    }

    /// Confirmations wait until the returned gate is notified.
    pub fn hold_confirmations(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        self.lock().confirm_gate = Some(gate.clone());
        gate
    }

    pub fn reject_transfers(&self) {
        self.lock().reject_transfers = true;
    }

    pub fn revert_transfers(&self) {
        self.lock().revert_transfers = true;
    }

    pub fn emit(&self, event: ProviderEvent) {
        self.events.send(event).unwrap();
    }

    /// Names of the collaborator calls made so far.
    pub fn calls(&self) -> Vec<String> {
        self.lock().calls.clone()
    }

    pub fn transfers(&self) -> Vec<(String, U256)> {
        self.lock().transfers.clone()
    }

    fn record(&self, call: impl Into<String>) {
        self.lock().calls.push(call.into());
    }
}

impl WalletProvider for MockWallet {
    type Token = MockToken;
    type Signer = MockSigner;

    async fn request_accounts(&self) -> Result<Vec<Address>, WalletError> {
        self.record("requestAccounts");
        let gate = self.lock().account_gate.clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }

        let state = self.lock();
        if state.reject_accounts {
            return Err(WalletError::UserRejected);
        }
        Ok(state.accounts.clone())
    }

    async fn get_balance(&self, address: Address) -> Result<U256, WalletError> {
        self.record(format!("getBalance({address})"));
        Ok(self
            .lock()
            .native_balances
            .get(&address)
            .copied()
            .unwrap_or_default())
    }

    async fn signer(&self) -> Result<MockSigner, WalletError> {
        self.record("getSigner");
        let address = *self.lock().accounts.first().ok_or(WalletError::NoAccount)?;
        Ok(MockSigner {
            address,
            wallet: self.clone(),
        })
    }

    fn token(&self, address: Address) -> MockToken {
        MockToken {
            address,
            wallet: self.clone(),
        }
    }

    fn subscribe(&self) -> broadcast::Receiver<ProviderEvent> {
        self.events.subscribe()
    }
}

pub struct MockSigner {
    address: Address,
    wallet: MockWallet,
}

impl Signer for MockSigner {
    type Token = MockToken;

    fn address(&self) -> Address {
        self.address
    }

    fn token(&self, address: Address) -> MockToken {
        MockToken {
            address,
            wallet: self.wallet.clone(),
        }
    }
}

pub struct MockToken {
    address: Address,
    wallet: MockWallet,
}

impl TokenContract for MockToken {
    fn address(&self) -> Address {
        self.address
    }

    async fn balance_of(&self, owner: Address) -> Result<U256, WalletError> {
        self.wallet.record(format!("balanceOf({owner})"));
        self.wallet
            .lock()
            .token_balance
            .ok_or_else(|| WalletError::Contract("execution reverted".to_string()))
    }

    async fn decimals(&self) -> Result<u8, WalletError> {
        self.wallet.record("decimals");
        Ok(self.wallet.lock().decimals)
    }
}

impl SignedToken for MockToken {
    type Pending = MockPending;

    async fn transfer(&self, recipient: &str, amount: U256) -> Result<MockPending, WalletError> {
        self.wallet.record("transfer");
        recipient
            .parse::<Address>()
            .map_err(|e| WalletError::InvalidAddress(format!("{recipient}: {e}")))?;

        let mut state = self.wallet.lock();
        if state.reject_transfers {
            return Err(WalletError::UserRejected);
        }
        state.transfers.push((recipient.to_string(), amount));
        let nonce = state.transfers.len() as u8;

        Ok(MockPending {
            tx_hash: TxHash::repeat_byte(nonce),
            revert: state.revert_transfers,
            gate: state.confirm_gate.clone(),
        })
    }
}

pub struct MockPending {
    tx_hash: TxHash,
    revert: bool,
    gate: Option<Arc<Notify>>,
}

impl PendingTransfer for MockPending {
    fn tx_hash(&self) -> TxHash {
        self.tx_hash
    }

    async fn confirm(self) -> Result<TransferReceipt, WalletError> {
        if let Some(gate) = self.gate {
            gate.notified().await;
        }
        if self.revert {
            return Err(WalletError::Reverted(self.tx_hash));
        }
        Ok(TransferReceipt {
            tx_hash: self.tx_hash,
            block_number: Some(1),
        })
    }
}
