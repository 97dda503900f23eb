//! Ethereum read client for ERC20 token balances.
//!
//! The deposit monitor reads through [`BalanceReader`] so it can be pointed at a plain RPC
//! node; the session encodes the same `balanceOf` query and sends it through the wallet.

use crate::errors::WalletError;
use alloy::network::Ethereum;
use alloy::primitives::{Address, Bytes, U256};
use alloy::providers::Provider;
use alloy::sol;
use alloy::sol_types::SolCall;
use async_trait::async_trait;

sol! {
    #[sol(rpc)]
    interface ERC20 {
        function balanceOf(address owner) external view returns (uint256 balance);
    }
}

#[async_trait]
pub trait BalanceReader: Send + Sync {
    async fn token_balance(&self, token: Address, owner: Address) -> Result<U256, WalletError>;
}

/// Calldata for `balanceOf(owner)`.
#[must_use]
pub fn balance_of_calldata(owner: Address) -> Bytes {
    ERC20::balanceOfCall { owner }.abi_encode().into()
}

/// Decodes the return data of `balanceOf`.
///
/// # Errors
/// * If the data is not a single ABI-encoded `uint256`
pub fn decode_balance(raw: &[u8]) -> Result<U256, WalletError> {
    ERC20::balanceOfCall::abi_decode_returns(raw, true)
        .map(|ret| ret.balance)
        .map_err(|e| WalletError::Read(e.to_string()))
}

/// Reads balances through an alloy provider.
#[derive(Debug, Clone)]
pub struct Erc20Reader<P> {
    provider: P,
}

impl<P> Erc20Reader<P> {
    pub const fn new(provider: P) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl<P> BalanceReader for Erc20Reader<P>
where
    P: Provider<Ethereum> + Clone + Send + Sync + 'static,
{
    async fn token_balance(&self, token: Address, owner: Address) -> Result<U256, WalletError> {
        let erc20 = ERC20::new(token, self.provider.clone());
        erc20
            .balanceOf(owner)
            .call()
            .await
            .map(|ret| ret.balance)
            .map_err(|e| WalletError::Read(e.to_string()))
    }
}
