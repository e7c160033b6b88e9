//! Builds the injected wallet from configuration.

use std::sync::Arc;
use std::time::Duration;

use chain_eth::chains::get_chain;
use wallet_provider::{HttpProvider, InjectedProvider, LocalKeyWallet};

use crate::config::{Config, WalletBackend};
use crate::error::ConfigError;

/// Display name for a chain id; unknown chains are named by id.
pub fn network_name(chain_id: u64) -> String {
    match get_chain(chain_id) {
        Some(chain) => chain.name.to_string(),
        None => format!("chain {chain_id}"),
    }
}

/// Creates the wallet the session wraps; `None` when no wallet is installed.
pub async fn injected_provider(
    config: &Config,
) -> Result<Option<Arc<dyn InjectedProvider>>, ConfigError> {
    let chain_id = config.network.chain_id;
    match get_chain(chain_id) {
        Some(chain) => tracing::info!(network = chain.name, testnet = chain.is_testnet, "network"),
        None => tracing::warn!(chain_id, "unknown network"),
    }

    let node = || -> Result<Arc<dyn InjectedProvider>, ConfigError> {
        let http = HttpProvider::new(
            config.network.rpc_url.clone(),
            Duration::from_secs(config.network.request_timeout_secs),
        )
        .map_err(chat_contract::ContractError::from)?;
        Ok(Arc::new(http))
    };

    match config.wallet.backend {
        WalletBackend::None => {
            tracing::info!("no wallet configured");
            Ok(None)
        }
        WalletBackend::Node => {
            tracing::info!(rpc_url = %config.network.rpc_url, "using node accounts as wallet");
            Ok(Some(node()?))
        }
        WalletBackend::LocalKey => {
            let key = config.private_key()?;
            let wallet = LocalKeyWallet::connect(node()?, key)
                .await
                .map_err(chat_contract::ContractError::from)?;
            if wallet.chain_id() != chain_id {
                tracing::warn!(
                    expected = %network_name(chain_id),
                    actual = %network_name(wallet.chain_id()),
                    "node is on a different chain than configured"
                );
            }
            Ok(Some(Arc::new(wallet)))
        }
    }
}
