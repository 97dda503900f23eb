use crate::errors::WalletError;
use crate::provider::{RpcWalletProvider, WalletProvider};
use crate::reader::Erc20Reader;
use crate::session::ProviderFactory;
use alloy::network::Ethereum;
use alloy::providers::{Provider, ProviderBuilder};
use eyre::Result;
use std::sync::Arc;
use url::Url;

/// Creates an HTTP provider for plain reads.
///
/// # Errors
/// * If the URL is invalid
pub fn create_http_provider(rpc_url: &str) -> Result<impl Provider<Ethereum> + Clone> {
    let url: Url = rpc_url.parse()?;
    log::debug!("providers: using HTTP provider at {url}");
    Ok(ProviderBuilder::new().on_http(url))
}

/// Balance reader backed by the read endpoint.
///
/// # Errors
/// * If the URL is invalid
pub fn create_balance_reader(
    rpc_url: &str,
) -> Result<Erc20Reader<impl Provider<Ethereum> + Clone>> {
    Ok(Erc20Reader::new(create_http_provider(rpc_url)?))
}

/// Factory for the session that connects to the wallet over JSON-RPC on first use.
#[must_use]
pub fn wallet_provider_factory(wallet_rpc_url: String) -> ProviderFactory {
    Box::new(move || {
        Url::parse(&wallet_rpc_url)
            .map_err(|e| WalletError::ProviderUnavailable(format!("{wallet_rpc_url}: {e}")))?;
        let provider = RpcWalletProvider::new(&wallet_rpc_url)?;
        Ok(Arc::new(provider) as Arc<dyn WalletProvider>)
    })
}
