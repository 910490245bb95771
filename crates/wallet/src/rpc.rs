//! JSON-RPC backed wallet provider.
//!
//! Stands in for an injected browser wallet: the account is a locally held
//! key, reads go through a plain HTTP provider and writes through a
//! wallet-filled one. Account switches are announced by
//! [`RpcWallet::switch_account`], which the dashboard's `watch` console
//! drives; network switches are picked up by a background task polling
//! `eth_chainId`.

use crate::{
    Erc20, PendingTransfer, ProviderEvent, Signer, TransferReceipt, WalletError, WalletProvider,
};
use alloy_network::{Ethereum, EthereumWallet, ReceiptResponse};
use alloy_primitives::{Address, TxHash, U256};
use alloy_provider::{DynProvider, PendingTransactionBuilder, Provider, ProviderBuilder};
use alloy_signer_local::PrivateKeySigner;
use std::{sync::Arc, time::Duration};
use tokio::{
    sync::{broadcast, RwLock},
    task::JoinHandle,
};
use tracing::{debug, info, warn};

const EVENT_CHANNEL_CAPACITY: usize = 16;

/// Convenience function to create an ethereum rpc provider from url.
pub fn create_provider(rpc_url: &str) -> Result<DynProvider, WalletError> {
    let url = rpc_url
        .parse()
        .map_err(|e| WalletError::InvalidUrl(format!("{}", e)))?;
    let provider = ProviderBuilder::new().connect_http(url);

    Ok(provider.erased())
}

/// Create a provider with wallet signing capability.
pub fn create_wallet_provider(
    rpc_url: &str,
    signer: PrivateKeySigner,
) -> Result<DynProvider, WalletError> {
    let url = rpc_url
        .parse()
        .map_err(|e| WalletError::InvalidUrl(format!("{}", e)))?;

    let wallet = EthereumWallet::from(signer);
    let provider = ProviderBuilder::new().wallet(wallet).connect_http(url);

    Ok(provider.erased())
}

fn parse_private_key(private_key: &str) -> Result<PrivateKeySigner, WalletError> {
    private_key
        .trim()
        .parse()
        .map_err(|e| WalletError::InvalidPrivateKey(format!("{}", e)))
}

/// Wallet provider over an HTTP endpoint and an optional local key.
///
/// Cheap to clone; clones share the key, the event channel and the chain
/// watcher. The watcher stops when the last clone is dropped.
#[derive(Clone)]
pub struct RpcWallet {
    inner: Arc<Inner>,
}

struct Inner {
    rpc_url: String,
    provider: DynProvider,
    signer: RwLock<Option<PrivateKeySigner>>,
    events: broadcast::Sender<ProviderEvent>,
    chain_watcher: Option<JoinHandle<()>>,
}

impl Drop for Inner {
    fn drop(&mut self) {
        if let Some(handle) = &self.chain_watcher {
            handle.abort();
        }
    }
}

impl RpcWallet {
    /// Create a wallet for `rpc_url`.
    ///
    /// Without a private key the wallet is locked: account requests fail
    /// with [`WalletError::NoAccount`]. When `chain_poll_interval` is set a
    /// watcher task is spawned, so this must run inside a tokio runtime.
    pub fn new(
        rpc_url: &str,
        private_key: Option<&str>,
        chain_poll_interval: Option<Duration>,
    ) -> Result<Self, WalletError> {
        let provider = create_provider(rpc_url)?;
        let signer = private_key.map(parse_private_key).transpose()?;
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);

        let chain_watcher = chain_poll_interval.map(|interval| {
            tokio::spawn(watch_chain(provider.clone(), events.clone(), interval))
        });

        Ok(Self {
            inner: Arc::new(Inner {
                rpc_url: rpc_url.to_string(),
                provider,
                signer: RwLock::new(signer),
                events,
                chain_watcher,
            }),
        })
    }

    /// Replace the active account, or lock the wallet with `None`.
    ///
    /// Subscribers receive [`ProviderEvent::AccountsChanged`] with the new
    /// account list.
    pub async fn switch_account(&self, private_key: Option<&str>) -> Result<(), WalletError> {
        let signer = private_key.map(parse_private_key).transpose()?;
        let accounts: Vec<Address> = signer.iter().map(|s| s.address()).collect();

        *self.inner.signer.write().await = signer;

        info!(accounts = ?accounts, "Wallet account changed");
        // No subscribers is fine.
        let _ = self
            .inner
            .events
            .send(ProviderEvent::AccountsChanged(accounts));

        Ok(())
    }

    /// Chain id reported by the endpoint.
    pub async fn chain_id(&self) -> Result<u64, WalletError> {
        Ok(self.inner.provider.get_chain_id().await?)
    }
}

impl WalletProvider for RpcWallet {
    type Token = Erc20<DynProvider>;
    type Signer = RpcSigner;

    async fn request_accounts(&self) -> Result<Vec<Address>, WalletError> {
        let signer = self.inner.signer.read().await;
        signer
            .as_ref()
            .map(|s| vec![s.address()])
            .ok_or(WalletError::NoAccount)
    }

    async fn get_balance(&self, address: Address) -> Result<U256, WalletError> {
        debug!(address = %address, "Querying native balance");
        Ok(self.inner.provider.get_balance(address).await?)
    }

    async fn signer(&self) -> Result<RpcSigner, WalletError> {
        let signer = self
            .inner
            .signer
            .read()
            .await
            .clone()
            .ok_or(WalletError::NoAccount)?;

        let address = signer.address();
        let provider = create_wallet_provider(&self.inner.rpc_url, signer)?;

        Ok(RpcSigner { address, provider })
    }

    fn token(&self, address: Address) -> Erc20<DynProvider> {
        Erc20::new(address, self.inner.provider.clone())
    }

    fn subscribe(&self) -> broadcast::Receiver<ProviderEvent> {
        self.inner.events.subscribe()
    }
}

/// Poll the endpoint's chain id and announce changes.
async fn watch_chain(
    provider: DynProvider,
    events: broadcast::Sender<ProviderEvent>,
    interval: Duration,
) {
    let mut ticker = tokio::time::interval(interval);
    let mut current: Option<u64> = None;

    loop {
        ticker.tick().await;

        let chain_id = match provider.get_chain_id().await {
            Ok(id) => id,
            Err(e) => {
                warn!(error = %e, "Failed to poll chain id");
                continue;
            }
        };

        match current {
            Some(previous) if previous != chain_id => {
                info!(previous, chain_id, "Chain changed");
                let _ = events.send(ProviderEvent::ChainChanged(chain_id));
            }
            _ => {}
        }
        current = Some(chain_id);
    }
}

/// Signer handle for the account held by an [`RpcWallet`].
#[derive(Clone)]
pub struct RpcSigner {
    address: Address,
    provider: DynProvider,
}

impl Signer for RpcSigner {
    type Token = Erc20<DynProvider>;

    fn address(&self) -> Address {
        self.address
    }

    fn token(&self, address: Address) -> Erc20<DynProvider> {
        Erc20::new(address, self.provider.clone())
    }
}

/// Submitted transaction tracked by the node.
pub struct RpcPending {
    inner: PendingTransactionBuilder<Ethereum>,
}

impl RpcPending {
    pub(crate) const fn new(inner: PendingTransactionBuilder<Ethereum>) -> Self {
        Self { inner }
    }
}

impl PendingTransfer for RpcPending {
    fn tx_hash(&self) -> TxHash {
        *self.inner.tx_hash()
    }

    async fn confirm(self) -> Result<TransferReceipt, WalletError> {
        let receipt = self
            .inner
            .get_receipt()
            .await
            .map_err(|e| WalletError::Rpc(e.to_string()))?;

        if !receipt.status() {
            return Err(WalletError::Reverted(receipt.transaction_hash));
        }

        Ok(TransferReceipt {
            tx_hash: receipt.transaction_hash,
            block_number: receipt.block_number,
        })
    }
}
