//! Configuration types for the token dashboard.
//!
//! This crate provides:
//! - Network presets (mainnet, Sepolia)
//! - The token contract address, with placeholder handling

pub mod network;
pub mod token;

pub use network::{NetworkConfig, NetworkType};
pub use token::{TokenAddress, TokenAddressError, TokenConfig, TOKEN_ADDRESS_PLACEHOLDER};
