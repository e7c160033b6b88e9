//! The wallet provider adapter: connection, signer and transaction
//! confirmation on top of an injected provider.

use std::sync::Arc;
use std::time::Duration;

use serde_json::{json, Value};

use crate::error::WalletError;
use crate::injected::InjectedProvider;
use crate::quantity::{parse_data, parse_u64, to_data};

/// Default interval between receipt polls.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(1000);

/// Wraps the injected wallet object, if there is one.
#[derive(Clone)]
pub struct BrowserProvider {
    inner: Arc<dyn InjectedProvider>,
    poll_interval: Duration,
}

impl std::fmt::Debug for BrowserProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BrowserProvider")
            .field("poll_interval", &self.poll_interval)
            .finish_non_exhaustive()
    }
}

impl BrowserProvider {
    /// Wraps an injected provider. `None` means no wallet is installed.
    pub fn new(injected: Option<Arc<dyn InjectedProvider>>) -> Result<Self, WalletError> {
        let inner = injected.ok_or(WalletError::NotInstalled)?;
        Ok(Self {
            inner,
            poll_interval: DEFAULT_POLL_INTERVAL,
        })
    }

    /// Sets the interval between transaction receipt polls.
    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// Sends a raw request to the injected provider.
    pub async fn request(&self, method: &str, params: Value) -> Result<Value, WalletError> {
        self.inner.request(method, params).await
    }

    /// Asks the wallet to connect and returns the exposed accounts.
    pub async fn request_accounts(&self) -> Result<Vec<String>, WalletError> {
        let value = self.request("eth_requestAccounts", json!([])).await?;
        let accounts = value
            .as_array()
            .ok_or_else(|| WalletError::InvalidResponse(format!("expected account list, got {value}")))?
            .iter()
            .map(|a| {
                a.as_str()
                    .map(str::to_string)
                    .ok_or_else(|| WalletError::InvalidResponse(format!("invalid account {a}")))
            })
            .collect::<Result<Vec<_>, _>>()?;

        tracing::debug!(count = accounts.len(), "wallet accounts received");
        Ok(accounts)
    }

    /// Returns a signer for the first connected account.
    pub async fn get_signer(&self) -> Result<Signer, WalletError> {
        let accounts = self.request_accounts().await?;
        let first = accounts.into_iter().next().ok_or(WalletError::NoAccounts)?;
        chain_eth::address::parse_address(&first)?;

        Ok(Signer {
            address: first,
            provider: self.clone(),
        })
    }

    /// Chain ID the wallet is connected to.
    pub async fn chain_id(&self) -> Result<u64, WalletError> {
        let value = self.request("eth_chainId", json!([])).await?;
        parse_u64(&value)
    }

    /// Fetches a transaction receipt, `None` while the transaction is pending.
    pub async fn transaction_receipt(
        &self,
        tx_hash: &str,
    ) -> Result<Option<TransactionReceipt>, WalletError> {
        let value = self
            .request("eth_getTransactionReceipt", json!([tx_hash]))
            .await?;
        if value.is_null() {
            return Ok(None);
        }
        TransactionReceipt::from_json(&value).map(Some)
    }
}

/// An authenticated account able to run calls and submit transactions.
#[derive(Debug, Clone)]
pub struct Signer {
    address: String,
    provider: BrowserProvider,
}

impl Signer {
    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn provider(&self) -> &BrowserProvider {
        &self.provider
    }

    /// Runs a read-only call against `to` from this account.
    pub async fn call(&self, to: &str, data: &[u8]) -> Result<Vec<u8>, WalletError> {
        let tx = json!({
            "from": self.address,
            "to": to,
            "data": to_data(data),
        });
        let value = self.provider.request("eth_call", json!([tx, "latest"])).await?;
        parse_data(&value)
    }

    /// Submits a state-changing transaction to `to`. The returned
    /// transaction must be awaited with [`PendingTransaction::wait`] before
    /// its effect is final.
    pub async fn send_transaction(
        &self,
        to: &str,
        data: &[u8],
    ) -> Result<PendingTransaction, WalletError> {
        let tx = json!({
            "from": self.address,
            "to": to,
            "data": to_data(data),
        });
        let value = self.provider.request("eth_sendTransaction", json!([tx])).await?;
        let hash = value
            .as_str()
            .ok_or_else(|| WalletError::InvalidResponse(format!("expected tx hash, got {value}")))?
            .to_string();

        tracing::info!(tx_hash = %hash, to, from = %self.address, "transaction submitted");

        Ok(PendingTransaction {
            hash,
            provider: self.provider.clone(),
        })
    }
}

/// A submitted transaction awaiting confirmation.
#[derive(Debug, Clone)]
pub struct PendingTransaction {
    hash: String,
    provider: BrowserProvider,
}

impl PendingTransaction {
    pub fn hash(&self) -> &str {
        &self.hash
    }

    /// Polls until the transaction is mined.
    ///
    /// A receipt with a failure status is a [`WalletError::Reverted`]. There
    /// is no timeout: a transaction that never confirms keeps this pending.
    pub async fn wait(self) -> Result<TransactionReceipt, WalletError> {
        loop {
            if let Some(receipt) = self.provider.transaction_receipt(&self.hash).await? {
                if !receipt.status {
                    tracing::warn!(tx_hash = %self.hash, "transaction reverted");
                    return Err(WalletError::Reverted(self.hash));
                }
                tracing::info!(
                    tx_hash = %self.hash,
                    block = ?receipt.block_number,
                    "transaction confirmed"
                );
                return Ok(receipt);
            }
            tokio::time::sleep(self.provider.poll_interval).await;
        }
    }
}

/// The parts of a transaction receipt the client reads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionReceipt {
    pub transaction_hash: String,
    pub block_number: Option<u64>,
    /// `true` for success (`0x1`).
    pub status: bool,
}

impl TransactionReceipt {
    fn from_json(value: &Value) -> Result<Self, WalletError> {
        let transaction_hash = value
            .get("transactionHash")
            .and_then(Value::as_str)
            .ok_or_else(|| WalletError::InvalidResponse("receipt without transactionHash".into()))?
            .to_string();
        let block_number = match value.get("blockNumber") {
            Some(v) if !v.is_null() => Some(parse_u64(v)?),
            _ => None,
        };
        // Pre-Byzantium receipts carry no status; treat them as successful.
        let status = match value.get("status") {
            Some(v) if !v.is_null() => parse_u64(v)? == 1,
            _ => true,
        };

        Ok(Self {
            transaction_hash,
            block_number,
            status,
        })
    }
}
