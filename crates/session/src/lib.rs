//! Wallet session and token transfer flows.
//!
//! - [`state`]: the session state and its single-writer store
//! - [`connection`]: connect / disconnect / provider event handling
//! - [`transfer`]: one token transfer at a time, with its own form state
//!
//! Both controllers publish their state through `tokio::sync::watch`
//! channels. They are the only writers; views hold receivers.

pub mod connection;
pub mod state;
pub mod transfer;

pub use connection::{ConnectError, ConnectionController, ListenOutcome};
pub use state::{SessionState, SessionStore, ZERO_BALANCE};
pub use transfer::{TransferController, TransferError, TransferState, TransferStatus};

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
