//! Wallet provider adapter for the chat client.
//!
//! A wallet is reached through an EIP-1193 style [`InjectedProvider`]. The
//! [`BrowserProvider`] wraps one (or its absence) and hands out a
//! [`Signer`] bound to the first connected account. Two backends are
//! provided: [`HttpProvider`] talks JSON-RPC to a node whose unlocked
//! accounts act as the wallet, and [`LocalKeyWallet`] signs transactions
//! itself with a secp256k1 key.

pub mod browser;
pub mod error;
pub mod http;
pub mod injected;
pub mod local;
pub mod quantity;

pub use browser::{BrowserProvider, PendingTransaction, Signer, TransactionReceipt};
pub use error::WalletError;
pub use http::HttpProvider;
pub use injected::InjectedProvider;
pub use local::LocalKeyWallet;
