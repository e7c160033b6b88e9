//! JSON-RPC over HTTP to an Ethereum node.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::WalletError;
use crate::injected::InjectedProvider;

/// A node endpoint whose unlocked accounts act as the wallet.
///
/// `eth_requestAccounts` is answered with `eth_accounts`, since a node has
/// no connection prompt.
pub struct HttpProvider {
    client: Client,
    url: String,
    next_id: AtomicU64,
}

#[derive(Serialize)]
struct RpcRequest<'a> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    params: Value,
}

#[derive(Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<RpcErrorObject>,
}

#[derive(Deserialize)]
struct RpcErrorObject {
    code: i64,
    message: String,
}

impl HttpProvider {
    /// Creates a provider for `url` with the given per-request timeout.
    pub fn new(url: impl Into<String>, request_timeout: Duration) -> Result<Self, WalletError> {
        let client = Client::builder().timeout(request_timeout).build()?;

        Ok(Self {
            client,
            url: url.into(),
            next_id: AtomicU64::new(1),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl InjectedProvider for HttpProvider {
    async fn request(&self, method: &str, params: Value) -> Result<Value, WalletError> {
        let method = match method {
            "eth_requestAccounts" => "eth_accounts",
            other => other,
        };
        let body = RpcRequest {
            jsonrpc: "2.0",
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            method,
            params,
        };

        tracing::debug!(method, url = %self.url, "json-rpc request");

        let response = self.client.post(&self.url).json(&body).send().await?;
        if !response.status().is_success() {
            return Err(WalletError::Transport(format!(
                "{} returned HTTP {}",
                self.url,
                response.status()
            )));
        }

        let payload: RpcResponse = response.json().await?;
        if let Some(error) = payload.error {
            tracing::debug!(method, code = error.code, message = %error.message, "json-rpc error");
            return Err(WalletError::from_rpc(error.code, error.message));
        }

        // A missing result is a JSON null (e.g. a receipt that is not mined yet).
        Ok(payload.result.unwrap_or(Value::Null))
    }
}
