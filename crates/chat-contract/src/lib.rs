//! Client for the `ChatApp` contract.
//!
//! [`ContractInterface`] reads a JSON ABI, [`Contract`] binds it to a
//! deployed address and a wallet signer, and [`ChatApp`] exposes the chat
//! operations with typed arguments and results.

pub mod chat_app;
pub mod contract;
pub mod deployment;
pub mod error;
pub mod interface;

pub use chat_app::{AppUser, ChatApp, ChatMessage};
pub use contract::Contract;
pub use deployment::Deployment;
pub use error::ContractError;
pub use interface::{ContractInterface, Function};
