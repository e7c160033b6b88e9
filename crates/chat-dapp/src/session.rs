//! The connection context shared by every page.

use std::sync::Arc;
use std::time::Duration;

use chat_contract::{ChatApp, Contract, ContractError, ContractInterface};
use tokio::sync::RwLock;
use wallet_provider::{BrowserProvider, InjectedProvider, Signer, WalletError};

/// Page error shown when no wallet is available.
pub const WALLET_NOT_INSTALLED: &str = "Wallet is not installed!";

/// Wallet connection and contract settings for one run of the client.
///
/// The provider is acquired once. The signer is cached after the first
/// successful connection and replaced by each explicit [`Session::connect`].
pub struct Session {
    provider: Option<BrowserProvider>,
    contract_address: String,
    interface: Arc<ContractInterface>,
    signer: RwLock<Option<Signer>>,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("has_wallet", &self.provider.is_some())
            .field("contract_address", &self.contract_address)
            .finish_non_exhaustive()
    }
}

impl Session {
    pub fn new(
        injected: Option<Arc<dyn InjectedProvider>>,
        contract_address: &str,
        interface: Arc<ContractInterface>,
        poll_interval: Duration,
    ) -> Result<Self, ContractError> {
        let bytes = chain_eth::address::parse_address(contract_address)?;
        let provider = match BrowserProvider::new(injected) {
            Ok(provider) => Some(provider.with_poll_interval(poll_interval)),
            Err(WalletError::NotInstalled) => None,
            Err(e) => return Err(e.into()),
        };
        Ok(Self {
            provider,
            contract_address: chain_eth::address::format_address(&bytes),
            interface,
            signer: RwLock::new(None),
        })
    }

    pub fn has_wallet(&self) -> bool {
        self.provider.is_some()
    }

    pub fn contract_address(&self) -> &str {
        &self.contract_address
    }

    /// Requests the wallet's accounts and caches a signer for the first one.
    pub async fn connect(&self) -> Result<String, ContractError> {
        let provider = self.provider.as_ref().ok_or(WalletError::NotInstalled)?;
        let signer = provider.get_signer().await?;
        let address = signer.address().to_string();

        tracing::info!(account = %address, "wallet connected");

        *self.signer.write().await = Some(signer);
        Ok(address)
    }

    /// The cached signer, connecting first if needed.
    pub async fn signer(&self) -> Result<Signer, ContractError> {
        if let Some(signer) = self.signer.read().await.as_ref() {
            return Ok(signer.clone());
        }
        self.connect().await?;
        self.signer
            .read()
            .await
            .clone()
            .ok_or_else(|| WalletError::NoAccounts.into())
    }

    /// Address of the connected account, if a connection has been made.
    pub async fn connected_address(&self) -> Option<String> {
        self.signer
            .read()
            .await
            .as_ref()
            .map(|s| s.address().to_string())
    }

    /// A contract client bound to the connected account.
    pub async fn chat_app(&self) -> Result<ChatApp, ContractError> {
        let signer = self.signer().await?;
        let contract = Contract::new(&self.contract_address, self.interface.clone(), signer)?;
        Ok(ChatApp::new(contract))
    }
}

/// Text shown for a failed remote call. A missing wallet always reads as
/// [`WALLET_NOT_INSTALLED`]; anything else uses `fallback`.
pub fn page_error(error: &ContractError, fallback: &str) -> String {
    if error.is_wallet_not_installed() {
        WALLET_NOT_INSTALLED.to_string()
    } else {
        fallback.to_string()
    }
}
