use crate::{rpc::RpcPending, SignedToken, TokenContract, WalletError};
use alloy_primitives::{Address, U256};
use alloy_provider::Provider;
use binding::token::IERC20;
use tracing::debug;

/// ERC20 contract client over an alloy provider.
///
/// The same type serves reads (plain provider) and writes (wallet-filled
/// provider); which one you get depends on where it was created.
#[derive(Clone)]
pub struct Erc20<P> {
    address: Address,
    provider: P,
}

impl<P> Erc20<P>
where
    P: Provider + Clone,
{
    pub const fn new(address: Address, provider: P) -> Self {
        Self { address, provider }
    }
}

impl<P> TokenContract for Erc20<P>
where
    P: Provider + Clone,
{
    fn address(&self) -> Address {
        self.address
    }

    async fn balance_of(&self, owner: Address) -> Result<U256, WalletError> {
        debug!(token = %self.address, owner = %owner, "Querying token balance");

        let contract = IERC20::new(self.address, &self.provider);
        let amount = contract.balanceOf(owner).call().await?;
        Ok(amount)
    }

    async fn decimals(&self) -> Result<u8, WalletError> {
        let contract = IERC20::new(self.address, &self.provider);
        let decimals = contract.decimals().call().await?;
        Ok(decimals)
    }
}

impl<P> SignedToken for Erc20<P>
where
    P: Provider + Clone,
{
    type Pending = RpcPending;

    async fn transfer(&self, recipient: &str, amount: U256) -> Result<RpcPending, WalletError> {
        let to: Address = recipient
            .trim()
            .parse()
            .map_err(|e| WalletError::InvalidAddress(format!("{recipient}: {e}")))?;

        let contract = IERC20::new(self.address, &self.provider);
        let pending = contract.transfer(to, amount).send().await?;

        debug!(
            token = %self.address,
            to = %to,
            amount = %amount,
            tx_hash = %pending.tx_hash(),
            "Token transfer submitted"
        );

        Ok(RpcPending::new(pending))
    }
}
