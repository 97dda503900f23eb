use crate::network::Network;
use alloy::primitives::Address;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;

/// Configuration struct for the application
#[derive(Debug, Clone)]
pub struct Config {
    pub network: Network,
    pub rpc_url: String,
    pub wallet_rpc_url: String,
    pub backend_url: String,
    pub backend_key: String,
    pub story_contract: Option<Address>,
    pub ama_contract: Option<Address>,
    pub app_url: String,
    pub state_dir: PathBuf,
    pub require_sub_account: bool,
    pub log_level: log::LevelFilter,
}

impl Config {
    /// Default values for configuration
    fn defaults() -> Self {
        let network = Network::default();

        Self {
            network,
            rpc_url: network.default_rpc_url().to_string(),
            wallet_rpc_url: "http://localhost:8545".to_string(),
            backend_url: String::new(),
            backend_key: String::new(),
            story_contract: None,
            ama_contract: None,
            app_url: "https://basestory.app".to_string(),
            state_dir: PathBuf::from(".basestory"),
            require_sub_account: false,
            log_level: log::LevelFilter::Info,
        }
    }

    /// Load configuration from environment variables
    ///
    /// # Environment Variables:
    /// - `BASESTORY_NETWORK`: `mainnet` or `testnet`
    /// - `RPC_URL`: read endpoint, defaults to the network's public RPC
    /// - `WALLET_RPC_URL`: JSON-RPC endpoint of the wallet provider
    /// - `BACKEND_URL`, `BACKEND_KEY`: view count and AMA backend
    /// - `STORY_CONTRACT_ADDRESS`, `AMA_CONTRACT_ADDRESS`: contract table
    /// - `APP_URL`: public URL used in share pages
    /// - `STATE_DIR`: where the reconnect flag is persisted
    /// - `REQUIRE_SUB_ACCOUNT`: reject wallets that only return one account
    /// - `LOG_LEVEL`: `error`, `warn`, `info`, `debug` or `trace`
    ///
    /// Unparseable values fall back to the defaults with a warning.
    ///
    /// # Returns
    /// Returns `Config` with values from environment variables or defaults
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::defaults();

        let network = parse_var("BASESTORY_NETWORK").unwrap_or(defaults.network);

        Self {
            network,
            rpc_url: env::var("RPC_URL").unwrap_or_else(|_| network.default_rpc_url().to_string()),
            wallet_rpc_url: env::var("WALLET_RPC_URL").unwrap_or(defaults.wallet_rpc_url),
            backend_url: env::var("BACKEND_URL").unwrap_or(defaults.backend_url),
            backend_key: env::var("BACKEND_KEY").unwrap_or(defaults.backend_key),
            story_contract: parse_var("STORY_CONTRACT_ADDRESS"),
            ama_contract: parse_var("AMA_CONTRACT_ADDRESS"),
            app_url: env::var("APP_URL").unwrap_or(defaults.app_url),
            state_dir: env::var("STATE_DIR").map_or(defaults.state_dir, PathBuf::from),
            require_sub_account: parse_var("REQUIRE_SUB_ACCOUNT")
                .unwrap_or(defaults.require_sub_account),
            log_level: parse_var("LOG_LEVEL").unwrap_or(defaults.log_level),
        }
    }

    /// USDC contract for the configured network
    #[must_use]
    pub const fn token(&self) -> Address {
        self.network.usdc()
    }

    /// Create a test configuration
    #[cfg(test)]
    #[must_use]
    pub fn test_config() -> Self {
        Self::defaults()
    }
}

fn parse_var<T: FromStr>(key: &str) -> Option<T> {
    let value = env::var(key).ok()?;
    match value.parse() {
        Ok(parsed) => Some(parsed),
        Err(_) => {
            log::warn!("config: ignoring invalid {key}={value}");
            None
        }
    }
}
