//! Terminal dashboard for an ERC20 token wallet.
//!
//! Wires the session and transfer controllers to a wallet provider and
//! renders their state as text.

mod app;
pub mod config;
pub mod console;
pub mod metrics;
pub mod views;

pub use app::{App, Dispatch, Intent};
