use async_trait::async_trait;
use serde_json::Value;

use crate::error::WalletError;

/// An injected wallet object speaking the EIP-1193 `request` interface.
///
/// `params` is the JSON array of positional parameters; the result is the
/// raw JSON value the wallet returned.
#[async_trait]
pub trait InjectedProvider: Send + Sync {
    async fn request(&self, method: &str, params: Value) -> Result<Value, WalletError>;
}
