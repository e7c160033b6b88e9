//! A wallet that holds its own secp256k1 key and signs locally.

use std::sync::Arc;

use async_trait::async_trait;
use chain_eth::transaction::{build_contract_call, sign_transaction, GasSettings};
use serde_json::{json, Value};
use zeroize::Zeroizing;

use crate::error::WalletError;
use crate::injected::InjectedProvider;
use crate::quantity::{parse_data, parse_quantity, parse_u64, to_data};

/// Priority fee used when the node does not answer `eth_maxPriorityFeePerGas`.
const FALLBACK_PRIORITY_FEE: u128 = 1_000_000_000;

/// Headroom added to the node's gas estimate, in percent.
const GAS_ESTIMATE_MARGIN: u64 = 20;

/// Signs transactions with a local key and relays everything else to a
/// node.
///
/// Account requests are answered with the key's own address, and
/// `eth_sendTransaction` becomes nonce, gas and fee lookups followed by an
/// EIP-1559 signature and `eth_sendRawTransaction`.
pub struct LocalKeyWallet {
    node: Arc<dyn InjectedProvider>,
    key: Zeroizing<[u8; 32]>,
    address: String,
    chain_id: u64,
}

impl LocalKeyWallet {
    /// Connects a key to `node`, reading the chain ID from the node.
    pub async fn connect(
        node: Arc<dyn InjectedProvider>,
        key: Zeroizing<[u8; 32]>,
    ) -> Result<Self, WalletError> {
        let address = chain_eth::address::address_from_private_key(&key)?;
        let chain_id = parse_u64(&node.request("eth_chainId", json!([])).await?)?;

        tracing::info!(%address, chain_id, "local key wallet ready");

        Ok(Self {
            node,
            key,
            address,
            chain_id,
        })
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    async fn send_transaction(&self, params: &Value) -> Result<Value, WalletError> {
        let tx = params
            .get(0)
            .ok_or_else(|| WalletError::InvalidResponse("eth_sendTransaction without a transaction".into()))?;
        let to = tx
            .get("to")
            .and_then(Value::as_str)
            .ok_or_else(|| WalletError::InvalidResponse("transaction without a recipient".into()))?;
        let data = match tx.get("data") {
            Some(v) => parse_data(v)?,
            None => Vec::new(),
        };

        let nonce = parse_u64(
            &self
                .node
                .request("eth_getTransactionCount", json!([self.address, "pending"]))
                .await?,
        )?;

        let estimate = parse_u64(
            &self
                .node
                .request(
                    "eth_estimateGas",
                    json!([{"from": self.address, "to": to, "data": to_data(&data)}]),
                )
                .await?,
        )?;
        let gas_limit = padded_gas_limit(estimate);

        let priority_fee = match self.node.request("eth_maxPriorityFeePerGas", json!([])).await {
            Ok(v) => parse_quantity(&v)?,
            Err(e) => {
                tracing::debug!(error = %e, "no priority fee suggestion, using fallback");
                FALLBACK_PRIORITY_FEE
            }
        };
        let block = self
            .node
            .request("eth_getBlockByNumber", json!(["latest", false]))
            .await?;
        let base_fee = match block.get("baseFeePerGas") {
            Some(v) if !v.is_null() => parse_quantity(v)?,
            _ => 0,
        };

        let gas = GasSettings {
            max_priority_fee_per_gas: priority_fee,
            max_fee_per_gas: base_fee.saturating_mul(2).saturating_add(priority_fee),
            gas_limit,
        };
        let unsigned = build_contract_call(self.chain_id, nonce, to, data, gas)?;
        let signed = sign_transaction(&unsigned, &self.key)?;

        tracing::debug!(nonce, gas_limit, tx_hash = %signed.tx_hash, "signed transaction locally");

        self.node
            .request("eth_sendRawTransaction", json!([to_data(&signed.raw_tx)]))
            .await
    }
}

#[async_trait]
impl InjectedProvider for LocalKeyWallet {
    async fn request(&self, method: &str, params: Value) -> Result<Value, WalletError> {
        match method {
            "eth_requestAccounts" | "eth_accounts" => Ok(json!([self.address])),
            "eth_sendTransaction" => self.send_transaction(&params).await,
            _ => self.node.request(method, params).await,
        }
    }
}

/// Node estimate plus the safety margin, saturating at `u64::MAX`.
fn padded_gas_limit(estimate: u64) -> u64 {
    estimate.saturating_add(estimate.saturating_mul(GAS_ESTIMATE_MARGIN) / 100)
}
