//! Error taxonomy shared by the session, the deposit monitor and the provider.
//!
//! Read-path failures (`Read`, and transient status lookups) are swallowed by
//! their callers and replaced with safe defaults. Write-path failures always
//! propagate to the action that started them.

/// EIP-1193 "user rejected request".
pub const USER_REJECTED_CODE: i64 = 4001;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WalletError {
    #[error("wallet provider unavailable: {0}")]
    ProviderUnavailable(String),
    #[error("wallet not connected")]
    NotConnected,
    #[error("wallet returned no accounts")]
    NoAccounts,
    #[error("ambiguous account authorization: {0}")]
    AmbiguousAccounts(String),
    #[error("request rejected by user")]
    UserRejected,
    #[error("insufficient balance")]
    InsufficientBalance,
    #[error("insufficient allowance")]
    InsufficientAllowance,
    #[error("transaction reverted: {0}")]
    Reverted(String),
    #[error("read failed: {0}")]
    Read(String),
    #[error("timed out after {attempts} attempts")]
    Timeout { attempts: u32 },
    #[error("rpc error {code}: {message}")]
    Rpc { code: i64, message: String },
}

impl WalletError {
    /// Classifies a JSON-RPC error returned by the wallet provider.
    ///
    /// Reverts are decoded heuristically from the error text.
    #[must_use]
    pub fn from_rpc(code: i64, message: &str) -> Self {
        let lower = message.to_lowercase();

        if code == USER_REJECTED_CODE
            || lower.contains("user rejected")
            || lower.contains("user denied")
        {
            Self::UserRejected
        } else if lower.contains("insufficient funds")
            || lower.contains("insufficient balance")
            || lower.contains("exceeds balance")
        {
            Self::InsufficientBalance
        } else if lower.contains("allowance") {
            Self::InsufficientAllowance
        } else if lower.contains("revert") {
            Self::Reverted(message.to_string())
        } else {
            Self::Rpc {
                code,
                message: message.to_string(),
            }
        }
    }

    /// Failures that a poller should retry on its next tick.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::Read(_) | Self::Rpc { .. })
    }

    /// Short message suitable for a toast.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::ProviderUnavailable(_) => {
                "Wallet is unavailable right now. Try again later.".into()
            }
            Self::NotConnected => "Connect your wallet first.".into(),
            Self::NoAccounts | Self::AmbiguousAccounts(_) => {
                "Your wallet did not share a usable account.".into()
            }
            Self::UserRejected => "Request cancelled in wallet.".into(),
            Self::InsufficientBalance => "Not enough USDC to complete this action.".into(),
            Self::InsufficientAllowance => "USDC spending has not been approved.".into(),
            Self::Reverted(_) => "Transaction would fail on chain.".into(),
            Self::Read(_) => "Could not read from the network.".into(),
            Self::Timeout { .. } => "Transaction is taking too long to confirm.".into(),
            Self::Rpc { message, .. } => format!("Wallet error: {message}"),
        }
    }
}
