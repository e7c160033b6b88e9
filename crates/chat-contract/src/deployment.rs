//! Deployed contract addresses recorded by Hardhat Ignition.

use std::collections::HashMap;
use std::path::Path;

use crate::error::ContractError;

/// Ignition key of the chat contract in `deployed_addresses.json`.
pub const CHAT_APP_DEPLOYMENT_KEY: &str = "ChatAppModule#ChatApp";

/// Contents of an Ignition `deployed_addresses.json`: future ID to address.
#[derive(Debug, Clone, Default)]
pub struct Deployment {
    addresses: HashMap<String, String>,
}

impl Deployment {
    pub fn from_json(json: &str) -> Result<Self, ContractError> {
        let addresses: HashMap<String, String> = serde_json::from_str(json)
            .map_err(|e| ContractError::InvalidDeployment(e.to_string()))?;
        Ok(Self { addresses })
    }

    pub fn from_file(path: &Path) -> Result<Self, ContractError> {
        let json = std::fs::read_to_string(path).map_err(|e| {
            ContractError::InvalidDeployment(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::from_json(&json)
    }

    /// The address deployed under `key`, checksummed.
    pub fn address(&self, key: &str) -> Result<String, ContractError> {
        let raw = self
            .addresses
            .get(key)
            .ok_or_else(|| ContractError::InvalidDeployment(format!("no deployment named {key}")))?;
        let bytes = chain_eth::address::parse_address(raw)?;
        Ok(chain_eth::address::format_address(&bytes))
    }

    /// The chat contract's address.
    pub fn chat_app(&self) -> Result<String, ContractError> {
        self.address(CHAT_APP_DEPLOYMENT_KEY)
    }
}
