use crate::{config::Config, metrics::Metrics, views};
use ::config::NetworkConfig;
use session::{ConnectionController, ListenOutcome, TransferController, TransferError};
use std::time::Instant;
use tracing::{info, warn};
use wallet::{TransferReceipt, WalletProvider};

/// Something the user asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    Connect,
    Disconnect,
    CopyAddress,
    SubmitTransfer { recipient: String, amount: String },
}

/// What came of an [`Intent`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch {
    Done,
    /// Full address to hand to the clipboard.
    Copied(String),
    /// The form did not allow the action; the controller was not called.
    Blocked,
    Transfer(Result<TransferReceipt, TransferError>),
}

/// One application instance: both controllers over a shared wallet.
///
/// A chain change throws the whole instance away; build a new one from the
/// same config.
pub struct App<W> {
    network: NetworkConfig,
    symbol: String,
    connection: ConnectionController<W>,
    transfer: TransferController<W>,
    metrics: Metrics,
}

impl<W> App<W>
where
    W: WalletProvider + Clone,
{
    pub fn new(config: &Config, wallet: Option<W>, metrics: Metrics) -> Self {
        let token = config.token.address;
        Self {
            network: config.network_config(),
            symbol: config.token.symbol.clone(),
            connection: ConnectionController::new(wallet.clone(), token),
            transfer: TransferController::new(wallet, token),
            metrics,
        }
    }

    pub const fn connection(&self) -> &ConnectionController<W> {
        &self.connection
    }

    pub const fn transfer(&self) -> &TransferController<W> {
        &self.transfer
    }

    pub async fn dispatch(&self, intent: Intent) -> Dispatch {
        match intent {
            Intent::Connect => {
                self.connection.connect().await;
                self.metrics
                    .record_connect(self.connection.state().is_connected());
                Dispatch::Done
            }
            Intent::Disconnect => {
                self.connection.disconnect();
                self.metrics.record_disconnect();
                Dispatch::Done
            }
            Intent::CopyAddress => match self.connection.state().address {
                Some(address) => Dispatch::Copied(address.to_checksum(None)),
                None => Dispatch::Blocked,
            },
            Intent::SubmitTransfer { recipient, amount } => {
                // Inputs are frozen while a transfer is in flight.
                if self.transfer.state().is_submitting() {
                    warn!("Transfer already in flight, ignoring submission");
                    return Dispatch::Blocked;
                }

                self.transfer.set_recipient(recipient);
                self.transfer.set_amount(amount);

                let form = self.transfer.state();
                if !form.can_submit() {
                    return Dispatch::Blocked;
                }

                let started = Instant::now();
                let result = self
                    .transfer
                    .submit_transfer(&form.recipient, &form.amount)
                    .await;
                self.metrics
                    .record_transfer(result.is_ok(), started.elapsed());

                Dispatch::Transfer(result)
            }
        }
    }

    /// Full page for the current state.
    pub fn render(&self) -> String {
        let session = self.connection.state();

        let body = if session.is_connected() {
            [
                views::dashboard(&session, &self.network, &self.symbol),
                views::transfer_form(&self.transfer.state(), &self.network, &self.symbol),
            ]
            .join("\n\n")
        } else {
            views::connect_prompt(&session, &self.symbol)
        };

        [views::header(&self.network), body, views::footer()].join("\n\n")
    }

    /// Follow wallet notifications, calling `on_render` after every change.
    ///
    /// Returns when the wallet switches chains or its event stream ends.
    pub async fn watch(&self, mut on_render: impl FnMut(String)) -> ListenOutcome {
        let mut session = self.connection.subscribe();
        let mut transfer = self.transfer.subscribe();

        on_render(self.render());

        let listen = self.connection.listen();
        tokio::pin!(listen);

        loop {
            tokio::select! {
                outcome = &mut listen => {
                    if let ListenOutcome::Reload { chain_id } = outcome {
                        info!(chain_id, "Chain changed, application will reload");
                        self.metrics.record_reload();
                    }
                    return outcome;
                }
                Ok(()) = session.changed() => on_render(self.render()),
                Ok(()) = transfer.changed() => on_render(self.render()),
            }
        }
    }
}
