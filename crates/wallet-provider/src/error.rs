use chain_eth::EthError;
use thiserror::Error;

/// EIP-1193 code for a request the user rejected in the wallet.
pub const USER_REJECTED_CODE: i64 = 4001;

/// Wallet provider errors.
#[derive(Debug, Error)]
pub enum WalletError {
    #[error("wallet is not installed")]
    NotInstalled,

    #[error("wallet returned no accounts")]
    NoAccounts,

    #[error("request rejected by user")]
    UserRejected,

    #[error("rpc error {code}: {message}")]
    Rpc { code: i64, message: String },

    #[error("transport error: {0}")]
    Transport(String),

    #[error("invalid response: {0}")]
    InvalidResponse(String),

    #[error("transaction {0} reverted")]
    Reverted(String),

    #[error(transparent)]
    Eth(#[from] EthError),
}

impl WalletError {
    /// Builds the error for a JSON-RPC error object.
    pub fn from_rpc(code: i64, message: impl Into<String>) -> Self {
        if code == USER_REJECTED_CODE {
            Self::UserRejected
        } else {
            Self::Rpc {
                code,
                message: message.into(),
            }
        }
    }
}

impl From<reqwest::Error> for WalletError {
    fn from(e: reqwest::Error) -> Self {
        WalletError::Transport(e.to_string())
    }
}
