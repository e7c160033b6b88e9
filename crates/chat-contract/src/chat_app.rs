//! Typed binding for the `ChatApp` contract.

use chain_eth::abi::Token;
use chain_eth::address::{format_address, parse_address};
use serde::Serialize;
use wallet_provider::PendingTransaction;

use crate::contract::Contract;
use crate::error::ContractError;
use crate::interface::ContractInterface;

/// Built-in interface description of the deployed `ChatApp` contract.
pub const CHAT_APP_ABI: &str = include_str!("../abi/ChatApp.json");

/// A registered user as listed by `getAllAppUser`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AppUser {
    pub name: String,
    pub account_address: String,
}

/// One message of a conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatMessage {
    pub sender: String,
    /// Unix seconds.
    pub timestamp: u64,
    pub msg: String,
}

/// The chat contract's remote operations.
#[derive(Debug, Clone)]
pub struct ChatApp {
    contract: Contract,
}

impl ChatApp {
    /// Parses the built-in `ChatApp` interface.
    pub fn builtin_interface() -> Result<ContractInterface, ContractError> {
        ContractInterface::from_json(CHAT_APP_ABI)
    }

    pub fn new(contract: Contract) -> Self {
        Self { contract }
    }

    pub fn contract(&self) -> &Contract {
        &self.contract
    }

    /// Address of the connected account.
    pub fn account(&self) -> &str {
        self.contract.signer().address()
    }

    pub async fn get_all_app_user(&self) -> Result<Vec<AppUser>, ContractError> {
        const FN: &str = "getAllAppUser";
        let rows = expect_array(FN, self.single(FN, &[]).await?)?;
        rows.into_iter()
            .map(|row| {
                let mut fields = expect_tuple(FN, row, 2)?.into_iter();
                let name = expect_string(FN, fields.next())?;
                let account_address = expect_address(FN, fields.next())?;
                Ok(AppUser {
                    name,
                    account_address,
                })
            })
            .collect()
    }

    /// Friends of the connected account.
    pub async fn get_my_friend_list(&self) -> Result<Vec<String>, ContractError> {
        self.address_list("getMyFriendList").await
    }

    /// Accounts waiting for the connected account to accept their request.
    pub async fn get_pending_requests(&self) -> Result<Vec<String>, ContractError> {
        self.address_list("getPendingRequests").await
    }

    pub async fn get_username(&self, account: &str) -> Result<String, ContractError> {
        const FN: &str = "getUsername";
        let output = self.single(FN, &[address_token(account)?]).await?;
        expect_string(FN, Some(output))
    }

    /// The conversation between the connected account and `friend`.
    pub async fn get_messages(&self, friend: &str) -> Result<Vec<ChatMessage>, ContractError> {
        const FN: &str = "getMessages";
        let rows = expect_array(FN, self.single(FN, &[address_token(friend)?]).await?)?;
        rows.into_iter()
            .map(|row| {
                let mut fields = expect_tuple(FN, row, 3)?.into_iter();
                let sender = expect_address(FN, fields.next())?;
                let timestamp = expect_u64(FN, fields.next())?;
                let msg = expect_string(FN, fields.next())?;
                Ok(ChatMessage {
                    sender,
                    timestamp,
                    msg,
                })
            })
            .collect()
    }

    /// Registers the connected account. Returns the mined transaction hash.
    pub async fn create_account(
        &self,
        name: &str,
        phone_number: &str,
        gender: &str,
    ) -> Result<String, ContractError> {
        let args = [
            Token::String(name.to_string()),
            Token::String(phone_number.to_string()),
            Token::String(gender.to_string()),
        ];
        self.transact("createAccount", &args).await
    }

    pub async fn send_friend_request(&self, friend: &str) -> Result<String, ContractError> {
        self.transact("sendFriendRequest", &[address_token(friend)?]).await
    }

    pub async fn accept_friend_request(&self, requester: &str) -> Result<String, ContractError> {
        self.transact("acceptFriendRequest", &[address_token(requester)?]).await
    }

    pub async fn add_friend(&self, friend: &str) -> Result<String, ContractError> {
        self.transact("addFriend", &[address_token(friend)?]).await
    }

    /// Submits a message without waiting for it to be mined.
    pub async fn submit_message(
        &self,
        friend: &str,
        msg: &str,
    ) -> Result<PendingTransaction, ContractError> {
        let args = [address_token(friend)?, Token::String(msg.to_string())];
        self.contract.submit("sendMessage", &args).await
    }

    /// Sends a message and waits until it is mined.
    pub async fn send_message(&self, friend: &str, msg: &str) -> Result<String, ContractError> {
        let pending = self.submit_message(friend, msg).await?;
        let receipt = pending.wait().await?;
        Ok(receipt.transaction_hash)
    }

    async fn transact(&self, name: &str, args: &[Token]) -> Result<String, ContractError> {
        let receipt = self.contract.transact(name, args).await?;
        Ok(receipt.transaction_hash)
    }

    /// Runs a query that returns exactly one value.
    async fn single(&self, name: &str, args: &[Token]) -> Result<Token, ContractError> {
        let mut outputs = self.contract.query(name, args).await?;
        if outputs.len() != 1 {
            return Err(unexpected(name, format!("expected 1 output, got {}", outputs.len())));
        }
        Ok(outputs.remove(0))
    }

    async fn address_list(&self, name: &str) -> Result<Vec<String>, ContractError> {
        expect_array(name, self.single(name, &[]).await?)?
            .into_iter()
            .map(|t| expect_address(name, Some(t)))
            .collect()
    }
}

fn address_token(address: &str) -> Result<Token, ContractError> {
    Ok(Token::Address(parse_address(address)?))
}

fn unexpected(function: &str, reason: impl Into<String>) -> ContractError {
    ContractError::UnexpectedOutput {
        function: function.to_string(),
        reason: reason.into(),
    }
}

fn expect_array(function: &str, token: Token) -> Result<Vec<Token>, ContractError> {
    token
        .into_array()
        .ok_or_else(|| unexpected(function, "expected an array"))
}

fn expect_tuple(function: &str, token: Token, len: usize) -> Result<Vec<Token>, ContractError> {
    match token.into_tuple() {
        Some(fields) if fields.len() == len => Ok(fields),
        _ => Err(unexpected(function, format!("expected a {len}-field tuple"))),
    }
}

fn expect_address(function: &str, token: Option<Token>) -> Result<String, ContractError> {
    token
        .and_then(Token::into_address)
        .map(|bytes| format_address(&bytes))
        .ok_or_else(|| unexpected(function, "expected an address"))
}

fn expect_string(function: &str, token: Option<Token>) -> Result<String, ContractError> {
    token
        .and_then(Token::into_string)
        .ok_or_else(|| unexpected(function, "expected a string"))
}

fn expect_u64(function: &str, token: Option<Token>) -> Result<u64, ContractError> {
    let value = token
        .and_then(Token::into_uint)
        .ok_or_else(|| unexpected(function, "expected an integer"))?;
    u64::try_from(value).map_err(|_| unexpected(function, format!("integer {value} out of range")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_interface_has_every_operation() {
        let interface = ChatApp::builtin_interface().unwrap();
        for name in [
            "getAllAppUser",
            "getMyFriendList",
            "sendFriendRequest",
            "acceptFriendRequest",
            "addFriend",
            "getPendingRequests",
            "getUsername",
            "getMessages",
            "sendMessage",
            "createAccount",
        ] {
            assert!(interface.function(name).is_ok(), "missing {name}");
        }
        assert_eq!(interface.len(), 10);
    }

    #[test]
    fn builtin_interface_classifies_calls() {
        let interface = ChatApp::builtin_interface().unwrap();
        assert!(interface.function("getMessages").unwrap().is_query());
        assert!(!interface.function("sendMessage").unwrap().is_query());
        assert_eq!(
            interface.function("createAccount").unwrap().signature(),
            "createAccount(string,string,string)"
        );
    }

    #[test]
    fn expect_u64_rejects_wide_integers() {
        let wide = Token::Uint(alloy_primitives::U256::MAX);
        assert!(expect_u64("getMessages", Some(wide)).is_err());
    }

    #[test]
    fn expect_tuple_checks_arity() {
        let token = Token::Tuple(vec![Token::Bool(true)]);
        assert!(expect_tuple("getAllAppUser", token, 2).is_err());
    }

    #[test]
    fn address_token_rejects_garbage() {
        assert!(address_token("alice").is_err());
    }
}
