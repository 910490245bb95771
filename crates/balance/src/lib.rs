//! Balance queries for the connected account.
//!
//! This crate answers native and ERC20 balance queries through the wallet
//! boundary and converts smallest-unit integers into the whole-unit decimal
//! strings shown on the dashboard (see [`units`]).

pub mod monitor;
pub mod units;

use alloy_primitives::{Address, U256};
use serde::{Deserialize, Serialize};
use std::future::Future;

/// Decimals of the native currency.
pub const NATIVE_DECIMALS: u8 = 18;

/// Represents a blockchain balance at a specific point in time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Balance {
    /// The address holding the balance
    pub holder: Address,
    /// The asset address (zero address for native token)
    pub asset: Address,
    /// The balance amount in the asset's smallest unit
    pub amount: U256,
    /// Decimals used to scale `amount` into whole units
    pub decimals: u8,
}

impl Balance {
    /// Whole-unit decimal string, e.g. `"2.5"`.
    pub fn formatted(&self) -> String {
        units::format_units(self.amount, self.decimals)
    }
}

/// Type of balance query to perform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BalanceQuery {
    /// Query ERC20 token balance for an EOA or contract
    ERC20Balance {
        /// Token contract address
        token: Address,
        /// Holder address
        holder: Address,
    },
    /// Query native ETH balance
    NativeBalance {
        /// Account address
        address: Address,
    },
}

/// Trait for monitoring balances on a blockchain.
pub trait Monitor: Send + Sync {
    /// Query a single balance.
    fn query_balance(
        &self,
        query: BalanceQuery,
    ) -> impl Future<Output = eyre::Result<Balance>> + Send;
}
