use std::path::PathBuf;

use chat_contract::ContractError;
use thiserror::Error;

/// Start-up configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("no contract address configured (set contract.address or contract.deployed_addresses)")]
    MissingContract,

    #[error("contract address {0} fails its EIP-55 checksum")]
    BadChecksum(String),

    #[error("invalid private key in ${0}")]
    InvalidPrivateKey(String),

    #[error(transparent)]
    Contract(#[from] ContractError),
}

/// Shell-level errors: routing and command parsing.
#[derive(Debug, Error)]
pub enum UiError {
    #[error("no page at {0}")]
    UnknownRoute(String),

    #[error("unknown command: {0}")]
    UnknownCommand(String),

    #[error("`{command}` needs {what}")]
    MissingArgument { command: String, what: &'static str },

    #[error("`{command}` is not available on {path}")]
    NotOnThisPage { command: String, path: &'static str },
}
