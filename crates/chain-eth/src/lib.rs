//! EVM primitives for the chat client.
//!
//! This crate provides:
//! - Ethereum address parsing, formatting and EIP-55 checksums
//! - Solidity ABI encoding and decoding for contract calls and results
//! - EIP-1559 contract-call transaction building and signing
//! - Network definitions for the chains the chat contract is deployed to

pub mod abi;
pub mod address;
pub mod chains;
pub mod error;
pub mod transaction;

pub use error::EthError;
