use crate::{Balance, BalanceQuery, Monitor, NATIVE_DECIMALS};
use alloy_primitives::Address;
use eyre::Result;
use tracing::debug;
use wallet::{TokenContract, WalletProvider};

// Balance monitor implementation.
pub struct BalanceMonitor<'a, W> {
    wallet: &'a W,
}

impl<'a, W> BalanceMonitor<'a, W>
where
    W: WalletProvider,
{
    pub const fn new(wallet: &'a W) -> Self {
        Self { wallet }
    }

    async fn query_native(&self, address: Address) -> Result<Balance> {
        debug!("Querying native balance: address={}", address);

        let amount = self.wallet.get_balance(address).await?;

        Ok(Balance {
            holder: address,
            asset: Address::ZERO,
            amount,
            decimals: NATIVE_DECIMALS,
        })
    }

    async fn query_erc20(&self, token: Address, holder: Address) -> Result<Balance> {
        debug!("Querying erc20 {} balance: address={}", token, holder);

        let contract = self.wallet.token(token);
        let amount = contract.balance_of(holder).await?;
        let decimals = contract.decimals().await?;

        Ok(Balance {
            holder,
            asset: token,
            amount,
            decimals,
        })
    }
}

impl<W> Monitor for BalanceMonitor<'_, W>
where
    W: WalletProvider,
{
    async fn query_balance(&self, query: BalanceQuery) -> Result<Balance> {
        match query {
            BalanceQuery::ERC20Balance { token, holder } => self.query_erc20(token, holder).await,
            BalanceQuery::NativeBalance { address } => self.query_native(address).await,
        }
    }
}
