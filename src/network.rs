//! The two supported networks: Base mainnet and Base Sepolia.
use alloy::primitives::{address, Address};
use derive_more::Display;
use eyre::{eyre, Error};
use std::str::FromStr;

pub const BASE_MAINNET_CHAIN_ID: u64 = 8453;
pub const BASE_SEPOLIA_CHAIN_ID: u64 = 84532;

pub const BASE_MAINNET_USDC: Address = address!("0x833589fCD6eDb6E08f4c7C32D4f71b54bdA02913");
pub const BASE_SEPOLIA_USDC: Address = address!("0x036CbD53842c5426634e7929541eC2318f3dCF7e");

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Default)]
pub enum Network {
    #[display("mainnet")]
    Mainnet,
    #[default]
    #[display("testnet")]
    Testnet,
}

impl Network {
    #[must_use]
    pub const fn chain_id(self) -> u64 {
        match self {
            Self::Mainnet => BASE_MAINNET_CHAIN_ID,
            Self::Testnet => BASE_SEPOLIA_CHAIN_ID,
        }
    }

    #[must_use]
    pub const fn default_rpc_url(self) -> &'static str {
        match self {
            Self::Mainnet => "https://mainnet.base.org",
            Self::Testnet => "https://sepolia.base.org",
        }
    }

    /// The USDC contract whose balance the session and deposit monitor read.
    #[must_use]
    pub const fn usdc(self) -> Address {
        match self {
            Self::Mainnet => BASE_MAINNET_USDC,
            Self::Testnet => BASE_SEPOLIA_USDC,
        }
    }

    #[must_use]
    pub const fn from_chain_id(chain_id: u64) -> Option<Self> {
        match chain_id {
            BASE_MAINNET_CHAIN_ID => Some(Self::Mainnet),
            BASE_SEPOLIA_CHAIN_ID => Some(Self::Testnet),
            _ => None,
        }
    }
}

impl FromStr for Network {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "mainnet" | "base" => Ok(Self::Mainnet),
            "testnet" | "sepolia" | "base-sepolia" => Ok(Self::Testnet),
            other => Err(eyre!("unknown network: {other}")),
        }
    }
}
