//! Hex encodings used by the Ethereum JSON-RPC API.
//!
//! Quantities are `0x`-prefixed hex without leading zeros; data is
//! `0x`-prefixed hex with two digits per byte.

use serde_json::Value;

use crate::error::WalletError;

/// Formats an integer as a JSON-RPC quantity.
pub fn to_quantity(value: u128) -> String {
    format!("0x{value:x}")
}

/// Formats bytes as JSON-RPC data.
pub fn to_data(bytes: &[u8]) -> String {
    format!("0x{}", hex::encode(bytes))
}

/// Parses a JSON-RPC quantity.
pub fn parse_quantity(value: &Value) -> Result<u128, WalletError> {
    let s = as_hex_str(value)?;
    if s.is_empty() {
        return Err(WalletError::InvalidResponse("empty quantity".into()));
    }
    u128::from_str_radix(s, 16)
        .map_err(|e| WalletError::InvalidResponse(format!("invalid quantity {value}: {e}")))
}

/// Parses a JSON-RPC quantity that must fit in 64 bits.
pub fn parse_u64(value: &Value) -> Result<u64, WalletError> {
    let wide = parse_quantity(value)?;
    u64::try_from(wide)
        .map_err(|_| WalletError::InvalidResponse(format!("quantity {wide} exceeds 64 bits")))
}

/// Parses JSON-RPC data into bytes.
pub fn parse_data(value: &Value) -> Result<Vec<u8>, WalletError> {
    let s = as_hex_str(value)?;
    hex::decode(s).map_err(|e| WalletError::InvalidResponse(format!("invalid data: {e}")))
}

fn as_hex_str(value: &Value) -> Result<&str, WalletError> {
    let s = value
        .as_str()
        .ok_or_else(|| WalletError::InvalidResponse(format!("expected hex string, got {value}")))?;
    s.strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .ok_or_else(|| WalletError::InvalidResponse(format!("missing 0x prefix: {s}")))
}
