use chain_eth::EthError;
use thiserror::Error;
use wallet_provider::WalletError;

/// Contract client errors.
#[derive(Debug, Error)]
pub enum ContractError {
    #[error("invalid contract interface: {0}")]
    InvalidInterface(String),

    #[error("invalid deployment record: {0}")]
    InvalidDeployment(String),

    #[error("function `{0}` is not part of the contract interface")]
    UnknownFunction(String),

    #[error("function `{function}` expects {expected} arguments, got {got}")]
    ArgumentCount {
        function: String,
        expected: usize,
        got: usize,
    },

    #[error("argument {index} of `{function}` does not match type {expected}")]
    ArgumentType {
        function: String,
        index: usize,
        expected: String,
    },

    #[error("`{0}` is a transaction, not a query")]
    NotAQuery(String),

    #[error("`{0}` is a query, not a transaction")]
    NotATransaction(String),

    #[error("unexpected output from `{function}`: {reason}")]
    UnexpectedOutput { function: String, reason: String },

    #[error(transparent)]
    Wallet(#[from] WalletError),

    #[error(transparent)]
    Eth(#[from] EthError),
}

impl ContractError {
    /// Whether the failure is the missing-wallet condition.
    pub fn is_wallet_not_installed(&self) -> bool {
        matches!(self, Self::Wallet(WalletError::NotInstalled))
    }
}
