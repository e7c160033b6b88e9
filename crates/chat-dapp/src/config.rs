//! Configuration loaded from a TOML file and environment overrides.

use std::path::{Path, PathBuf};
use std::time::Duration;

use chat_contract::{ChatApp, ContractInterface, Deployment};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use zeroize::Zeroizing;

use crate::error::ConfigError;

/// Overrides `network.rpc_url`.
pub const ENV_RPC_URL: &str = "CHAT_DAPP_RPC_URL";
/// Overrides `contract.address`.
pub const ENV_CONTRACT: &str = "CHAT_DAPP_CONTRACT";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub network: NetworkConfig,

    #[serde(default)]
    pub wallet: WalletConfig,

    #[serde(default)]
    pub contract: ContractConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Node endpoint settings.
#[derive(Debug, Clone, Deserialize)]
pub struct NetworkConfig {
    #[serde(default = "default_rpc_url")]
    pub rpc_url: String,

    /// Chain the contract is expected on.
    #[serde(default = "default_chain_id")]
    pub chain_id: u64,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_rpc_url() -> String {
    chain_eth::chains::HARDHAT_LOCAL.rpc_url.to_string()
}

fn default_chain_id() -> u64 {
    chain_eth::chains::HARDHAT_LOCAL.chain_id
}

fn default_request_timeout() -> u64 {
    30
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            rpc_url: default_rpc_url(),
            chain_id: default_chain_id(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

/// Which wallet the client talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WalletBackend {
    /// The node's unlocked accounts.
    Node,
    /// A private key read from the environment, signing locally.
    LocalKey,
    /// No wallet installed.
    None,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WalletConfig {
    #[serde(default = "default_backend")]
    pub backend: WalletBackend,

    /// Environment variable holding the hex private key for `local-key`.
    #[serde(default = "default_private_key_env")]
    pub private_key_env: String,

    #[serde(default = "default_poll_interval")]
    pub poll_interval_ms: u64,
}

fn default_backend() -> WalletBackend {
    WalletBackend::Node
}

fn default_private_key_env() -> String {
    "CHAT_DAPP_PRIVATE_KEY".to_string()
}

fn default_poll_interval() -> u64 {
    1000
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            private_key_env: default_private_key_env(),
            poll_interval_ms: default_poll_interval(),
        }
    }
}

impl WalletConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

/// Where the contract lives and what it looks like.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContractConfig {
    /// Explicit contract address; wins over `deployed_addresses`.
    pub address: Option<String>,

    /// Hardhat Ignition `deployed_addresses.json`.
    pub deployed_addresses: Option<PathBuf>,

    /// ABI or artifact JSON replacing the built-in interface.
    pub abi: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Config {
    /// Loads `path` (or defaults when `None`) and applies environment
    /// overrides.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => {
                let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                })?;
                Self::from_toml_str(&text)?
            }
            None => Self::default(),
        };
        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Applies overrides from `lookup`, usually the process environment.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup(ENV_RPC_URL) {
            self.network.rpc_url = url;
        }
        if let Some(address) = lookup(ENV_CONTRACT) {
            self.contract.address = Some(address);
        }
    }

    /// Resolves the contract address, checksummed.
    pub fn contract_address(&self) -> Result<String, ConfigError> {
        if let Some(address) = &self.contract.address {
            let checksum_ok = chain_eth::address::validate_address(address)
                .map_err(chat_contract::ContractError::from)?;
            if !checksum_ok {
                return Err(ConfigError::BadChecksum(address.clone()));
            }
            let bytes = chain_eth::address::parse_address(address)
                .map_err(chat_contract::ContractError::from)?;
            return Ok(chain_eth::address::format_address(&bytes));
        }
        match &self.contract.deployed_addresses {
            Some(path) => Ok(Deployment::from_file(path)?.chat_app()?),
            None => Err(ConfigError::MissingContract),
        }
    }

    /// The configured interface, or the built-in `ChatApp` one.
    pub fn interface(&self) -> Result<ContractInterface, ConfigError> {
        match &self.contract.abi {
            Some(path) => {
                let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
                    path: path.clone(),
                    source,
                })?;
                Ok(ContractInterface::from_json(&json)?)
            }
            None => Ok(ChatApp::builtin_interface()?),
        }
    }

    /// Reads the local signing key from the configured environment variable.
    pub fn private_key(&self) -> Result<Zeroizing<[u8; 32]>, ConfigError> {
        let var = &self.wallet.private_key_env;
        let secret = std::env::var(var)
            .map(SecretString::from)
            .map_err(|_| ConfigError::InvalidPrivateKey(var.clone()))?;
        parse_private_key(&secret).ok_or_else(|| ConfigError::InvalidPrivateKey(var.clone()))
    }
}

fn parse_private_key(secret: &SecretString) -> Option<Zeroizing<[u8; 32]>> {
    let text = secret.expose_secret().trim();
    let text = text.strip_prefix("0x").unwrap_or(text);
    let bytes = Zeroizing::new(hex::decode(text).ok()?);
    if bytes.len() != 32 {
        return None;
    }
    let mut key = Zeroizing::new([0u8; 32]);
    key.copy_from_slice(&bytes);
    Some(key)
}
