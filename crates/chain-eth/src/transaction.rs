use alloy_rlp::{Encodable, RlpEncodable};
use k256::ecdsa::signature::hazmat::PrehashSigner;
use k256::ecdsa::{RecoveryId, Signature, SigningKey};
use sha3::{Digest, Keccak256};
use zeroize::Zeroize;

use crate::address::parse_address;
use crate::error::EthError;

/// An unsigned EIP-1559 (type 2) Ethereum transaction.
#[derive(Debug, Clone)]
pub struct EthTransaction {
    pub chain_id: u64,
    pub nonce: u64,
    pub max_priority_fee_per_gas: u128,
    pub max_fee_per_gas: u128,
    pub gas_limit: u64,
    /// Contract address as a 0x-prefixed hex string.
    pub to: String,
    /// Value in wei (zero for plain contract calls).
    pub value: u128,
    /// ABI-encoded calldata.
    pub data: Vec<u8>,
}

/// Fee and gas settings for a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GasSettings {
    pub max_priority_fee_per_gas: u128,
    pub max_fee_per_gas: u128,
    pub gas_limit: u64,
}

/// A signed EIP-1559 Ethereum transaction ready for broadcast.
pub struct SignedEthTransaction {
    /// RLP-encoded signed transaction bytes (including 0x02 type prefix).
    pub raw_tx: Vec<u8>,
    /// Transaction hash as a 0x-prefixed hex string.
    pub tx_hash: String,
}

/// Builds an unsigned EIP-1559 transaction invoking a contract with the
/// given calldata.
pub fn build_contract_call(
    chain_id: u64,
    nonce: u64,
    contract: &str,
    data: Vec<u8>,
    gas: GasSettings,
) -> Result<EthTransaction, EthError> {
    parse_address(contract)?;

    if gas.max_priority_fee_per_gas > gas.max_fee_per_gas {
        return Err(EthError::TransactionBuildError(format!(
            "priority fee {} exceeds max fee {}",
            gas.max_priority_fee_per_gas, gas.max_fee_per_gas
        )));
    }

    Ok(EthTransaction {
        chain_id,
        nonce,
        max_priority_fee_per_gas: gas.max_priority_fee_per_gas,
        max_fee_per_gas: gas.max_fee_per_gas,
        gas_limit: gas.gas_limit,
        to: contract.to_string(),
        value: 0,
        data,
    })
}

/// Signs an EIP-1559 transaction with the given secp256k1 private key.
///
/// The signing process:
/// 1. RLP-encode the unsigned transaction fields.
/// 2. Prepend the type byte (0x02) to get the signing payload.
/// 3. Keccak-256 hash the payload.
/// 4. Sign the hash with the private key using k256.
/// 5. Build the signed transaction with v (y_parity), r, s appended.
/// 6. Return the raw bytes and transaction hash.
pub fn sign_transaction(
    tx: &EthTransaction,
    private_key: &[u8; 32],
) -> Result<SignedEthTransaction, EthError> {
    // Build the unsigned payload: 0x02 || rlp(unsigned_fields).
    let unsigned_payload = encode_unsigned_tx(tx)?;

    // Keccak-256 of the unsigned payload for signing.
    let msg_hash = Keccak256::digest(&unsigned_payload);

    // Create the signing key (zeroized on drop).
    let mut key_bytes = *private_key;
    let signing_key = SigningKey::from_bytes((&key_bytes).into())
        .map_err(|e| EthError::InvalidPrivateKey(e.to_string()))?;
    key_bytes.zeroize();

    // Sign the hash using PrehashSigner (signs a raw 32-byte hash).
    let (signature, recovery_id): (Signature, RecoveryId) = signing_key
        .sign_prehash(msg_hash.as_slice())
        .map_err(|e| EthError::SigningError(e.to_string()))?;

    let y_parity = recovery_id.is_y_odd() as u8;

    let r_generic = signature.r().to_bytes();
    let s_generic = signature.s().to_bytes();
    let mut r_bytes = [0u8; 32];
    let mut s_bytes = [0u8; 32];
    r_bytes.copy_from_slice(&r_generic);
    s_bytes.copy_from_slice(&s_generic);

    // Build the signed transaction: 0x02 || rlp(signed_fields).
    let signed_fields = SignedTxFields {
        chain_id: tx.chain_id,
        nonce: tx.nonce,
        max_priority_fee_per_gas: tx.max_priority_fee_per_gas,
        max_fee_per_gas: tx.max_fee_per_gas,
        gas_limit: tx.gas_limit,
        to: parse_to_bytes(&tx.to)?,
        value: tx.value,
        data: tx.data.clone(),
        // Empty access list.
        access_list: Vec::new(),
        signature_y_parity: y_parity,
        signature_r: r_bytes.into(),
        signature_s: s_bytes.into(),
    };

    let mut rlp_buf = Vec::new();
    signed_fields.encode(&mut rlp_buf);

    let mut raw_tx = Vec::with_capacity(1 + rlp_buf.len());
    raw_tx.push(0x02); // EIP-1559 type prefix.
    raw_tx.extend_from_slice(&rlp_buf);

    // Transaction hash is the Keccak-256 of the signed raw bytes.
    let tx_hash = Keccak256::digest(&raw_tx);
    let tx_hash_hex = format!("0x{}", hex::encode(tx_hash));

    Ok(SignedEthTransaction {
        raw_tx,
        tx_hash: tx_hash_hex,
    })
}

/// Encodes the unsigned EIP-1559 transaction as `0x02 || rlp(fields)`.
///
/// The RLP-encoded fields are:
/// `[chain_id, nonce, max_priority_fee_per_gas, max_fee_per_gas, gas_limit, to,
///   value, data, access_list]`
pub fn encode_unsigned_tx(tx: &EthTransaction) -> Result<Vec<u8>, EthError> {
    let unsigned_fields = UnsignedTxFields {
        chain_id: tx.chain_id,
        nonce: tx.nonce,
        max_priority_fee_per_gas: tx.max_priority_fee_per_gas,
        max_fee_per_gas: tx.max_fee_per_gas,
        gas_limit: tx.gas_limit,
        to: parse_to_bytes(&tx.to)?,
        value: tx.value,
        data: tx.data.clone(),
        access_list: Vec::new(),
    };

    let mut rlp_buf = Vec::new();
    unsigned_fields.encode(&mut rlp_buf);

    let mut payload = Vec::with_capacity(1 + rlp_buf.len());
    payload.push(0x02); // EIP-1559 type byte.
    payload.extend_from_slice(&rlp_buf);

    Ok(payload)
}

// ---------------------------------------------------------------------------
// RLP-encodable structures
// ---------------------------------------------------------------------------

/// Unsigned EIP-1559 transaction fields for RLP encoding.
#[derive(RlpEncodable)]
struct UnsignedTxFields {
    chain_id: u64,
    nonce: u64,
    max_priority_fee_per_gas: u128,
    max_fee_per_gas: u128,
    gas_limit: u64,
    to: RlpAddress,
    value: u128,
    data: Vec<u8>,
    access_list: Vec<AccessListItem>,
}

/// Signed EIP-1559 transaction fields for RLP encoding.
#[derive(RlpEncodable)]
struct SignedTxFields {
    chain_id: u64,
    nonce: u64,
    max_priority_fee_per_gas: u128,
    max_fee_per_gas: u128,
    gas_limit: u64,
    to: RlpAddress,
    value: u128,
    data: Vec<u8>,
    access_list: Vec<AccessListItem>,
    signature_y_parity: u8,
    signature_r: RlpU256,
    signature_s: RlpU256,
}

/// An EIP-2930 access list entry (kept empty for now).
#[derive(Debug, Clone, RlpEncodable)]
struct AccessListItem {
    address: RlpAddress,
    storage_keys: Vec<RlpFixedBytes<32>>,
}

/// Wrapper for a 20-byte Ethereum address that implements `Encodable`.
#[derive(Debug, Clone)]
struct RlpAddress([u8; 20]);

impl Encodable for RlpAddress {
    fn encode(&self, out: &mut dyn alloy_rlp::BufMut) {
        // Encode as a 20-byte string.
        self.0.as_slice().encode(out);
    }

    fn length(&self) -> usize {
        self.0.as_slice().length()
    }
}

/// Wrapper for a 256-bit integer (32 bytes) that encodes as minimal big-endian
/// bytes with leading zeros stripped (standard RLP integer encoding).
#[derive(Debug, Clone)]
struct RlpU256([u8; 32]);

impl From<[u8; 32]> for RlpU256 {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

impl Encodable for RlpU256 {
    fn encode(&self, out: &mut dyn alloy_rlp::BufMut) {
        // Strip leading zeros for minimal encoding.
        let start = self.0.iter().position(|&b| b != 0).unwrap_or(32);
        let trimmed = &self.0[start..];
        trimmed.encode(out);
    }

    fn length(&self) -> usize {
        let start = self.0.iter().position(|&b| b != 0).unwrap_or(32);
        let trimmed = &self.0[start..];
        trimmed.length()
    }
}

/// Wrapper for fixed-size byte arrays that implements `Encodable`.
#[derive(Debug, Clone)]
struct RlpFixedBytes<const N: usize>([u8; N]);

impl<const N: usize> Encodable for RlpFixedBytes<N> {
    fn encode(&self, out: &mut dyn alloy_rlp::BufMut) {
        self.0.as_slice().encode(out);
    }

    fn length(&self) -> usize {
        self.0.as_slice().length()
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Parses a 0x-prefixed hex address string into the RLP wrapper.
fn parse_to_bytes(address: &str) -> Result<RlpAddress, EthError> {
    parse_address(address).map(RlpAddress)
}
