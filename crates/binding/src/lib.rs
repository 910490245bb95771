//! Solidity contract bindings used by the dashboard.
//!
//! Bindings are generated with `alloy_sol_types::sol!` and the `rpc`
//! attribute, so each interface also gets a typed contract instance.

pub mod token;
