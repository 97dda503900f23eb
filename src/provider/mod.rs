//! The wallet provider capability.
//!
//! The provider owns keys, account abstraction and transaction submission. This crate only
//! asks it for accounts, read calls and EIP-5792 call batches.
pub mod rpc;

use crate::errors::WalletError;
use alloy::primitives::{Address, Bytes, B256, U256};
use async_trait::async_trait;
use derive_more::Display;

pub use rpc::RpcWalletProvider;

/// One contract invocation inside a batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call {
    pub to: Address,
    pub data: Option<Bytes>,
    pub value: Option<U256>,
}

impl Call {
    #[must_use]
    pub const fn new(to: Address, data: Bytes) -> Self {
        Self {
            to,
            data: Some(data),
            value: None,
        }
    }

    #[must_use]
    pub fn with_value(mut self, value: U256) -> Self {
        self.value = Some(value);
        self
    }
}

/// A `wallet_sendCalls` request. Calls keep their order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendCallsRequest {
    pub from: Address,
    pub chain_id: u64,
    pub calls: Vec<Call>,
}

/// Batch status as reported by `wallet_getCallsStatus`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum BatchState {
    #[display("pending")]
    Pending,
    #[display("confirmed")]
    Confirmed,
    #[display("failed")]
    Failed,
    #[display("reverted")]
    Reverted,
    #[display("partially reverted")]
    PartiallyReverted,
}

impl BatchState {
    /// Maps an EIP-5792 status code.
    #[must_use]
    pub const fn from_code(code: u64) -> Self {
        match code {
            200..=299 => Self::Confirmed,
            400..=499 => Self::Failed,
            500..=599 => Self::Reverted,
            600..=699 => Self::PartiallyReverted,
            _ => Self::Pending,
        }
    }

    /// Maps the older string statuses.
    #[must_use]
    pub fn from_label(label: &str) -> Self {
        match label.to_uppercase().as_str() {
            "CONFIRMED" | "SUCCESS" => Self::Confirmed,
            "FAILED" | "FAILURE" => Self::Failed,
            "REVERTED" => Self::Reverted,
            _ => Self::Pending,
        }
    }

    #[must_use]
    pub const fn is_final(self) -> bool {
        !matches!(self, Self::Pending)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallReceipt {
    pub transaction_hash: Option<B256>,
    pub success: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallsStatus {
    pub state: BatchState,
    pub receipts: Vec<CallReceipt>,
}

#[async_trait]
pub trait WalletProvider: Send + Sync {
    /// Asks the user to authorize accounts. Expected order is `[sub, universal]`.
    async fn request_accounts(&self) -> Result<Vec<Address>, WalletError>;

    /// Read-only `eth_call` against the latest block.
    async fn eth_call(&self, to: Address, data: Bytes) -> Result<Bytes, WalletError>;

    /// Submits a batch atomically and returns the batch id.
    async fn send_calls(&self, request: SendCallsRequest) -> Result<String, WalletError>;

    async fn get_calls_status(&self, batch_id: &str) -> Result<CallsStatus, WalletError>;
}
