//! An in-memory `ChatApp` contract behind an injected wallet.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use alloy_primitives::U256;
use async_trait::async_trait;
use chain_eth::abi::{decode, encode, Token};
use chain_eth::address::{format_address, parse_address};
use chat_contract::{ChatApp, ContractInterface};
use chat_dapp::Session;
use serde_json::{json, Value};
use wallet_provider::quantity::{parse_data, to_data};
use wallet_provider::{InjectedProvider, WalletError};

pub const CONTRACT: &str = "0x5FbDB2315678afecb367f032d93F642f64180aa3";
pub const ALICE: &str = "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266";
pub const BOB: &str = "0x70997970C51812dc3A010C7d01b50e0d17dc79C8";
pub const CAROL: &str = "0x3C44CdDdB6a900fa2b585dd299e03d12FA4293BC";

type Address = [u8; 20];

#[derive(Default)]
struct State {
    users: Vec<(String, Address)>,
    friends: HashMap<Address, Vec<Address>>,
    pending: HashMap<Address, Vec<Address>>,
    messages: Vec<(Address, Address, u64, String)>,
    receipts: HashMap<String, bool>,
    next_tx: u64,
    clock: u64,
}

/// Runs contract calls against in-memory state and records each one by
/// function name.
pub struct MockChatApp {
    account: Option<String>,
    interface: ContractInterface,
    state: Mutex<State>,
    calls: Mutex<Vec<String>>,
    failing: Mutex<HashSet<String>>,
    reverting: Mutex<HashSet<String>>,
}

fn addr(address: &str) -> Address {
    parse_address(address).unwrap()
}

impl MockChatApp {
    /// A wallet connected as `account`.
    pub fn new(account: &str) -> Arc<Self> {
        Self::build(Some(account.to_string()))
    }

    /// A wallet that exposes no accounts.
    pub fn locked() -> Arc<Self> {
        Self::build(None)
    }

    fn build(account: Option<String>) -> Arc<Self> {
        Arc::new(Self {
            account,
            interface: ChatApp::builtin_interface().unwrap(),
            state: Mutex::new(State {
                clock: 1_700_000_000,
                ..State::default()
            }),
            calls: Mutex::new(Vec::new()),
            failing: Mutex::new(HashSet::new()),
            reverting: Mutex::new(HashSet::new()),
        })
    }

    pub fn session(self: &Arc<Self>) -> Arc<Session> {
        let injected: Arc<dyn InjectedProvider> = self.clone();
        let interface = Arc::new(ChatApp::builtin_interface().unwrap());
        Arc::new(Session::new(Some(injected), CONTRACT, interface, Duration::from_millis(1)).unwrap())
    }

    pub fn register(&self, name: &str, account: &str) {
        self.state
            .lock()
            .unwrap()
            .users
            .push((name.to_string(), addr(account)));
    }

    pub fn befriend(&self, a: &str, b: &str) {
        let mut state = self.state.lock().unwrap();
        state.friends.entry(addr(a)).or_default().push(addr(b));
        state.friends.entry(addr(b)).or_default().push(addr(a));
    }

    pub fn request(&self, from: &str, to: &str) {
        let mut state = self.state.lock().unwrap();
        state.pending.entry(addr(to)).or_default().push(addr(from));
    }

    pub fn post(&self, from: &str, to: &str, msg: &str) {
        let mut state = self.state.lock().unwrap();
        state.clock += 1;
        let clock = state.clock;
        state
            .messages
            .push((addr(from), addr(to), clock, msg.to_string()));
    }

    /// Makes every call of `function` fail with an RPC error.
    pub fn fail(&self, function: &str) {
        self.failing.lock().unwrap().insert(function.to_string());
    }

    /// Makes transactions of `function` mine with a failure status.
    pub fn revert(&self, function: &str) {
        self.reverting.lock().unwrap().insert(function.to_string());
    }

    /// Contract functions called, in order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, function: &str) -> usize {
        self.calls().iter().filter(|c| *c == function).count()
    }

    pub fn friends_of(&self, account: &str) -> Vec<String> {
        let state = self.state.lock().unwrap();
        state
            .friends
            .get(&addr(account))
            .map(|list| list.iter().map(format_address).collect())
            .unwrap_or_default()
    }

    pub fn pending_for(&self, account: &str) -> Vec<String> {
        let state = self.state.lock().unwrap();
        state
            .pending
            .get(&addr(account))
            .map(|list| list.iter().map(format_address).collect())
            .unwrap_or_default()
    }

    pub fn user_names(&self) -> Vec<String> {
        let state = self.state.lock().unwrap();
        state.users.iter().map(|(name, _)| name.clone()).collect()
    }

    pub fn message_count(&self) -> usize {
        self.state.lock().unwrap().messages.len()
    }

    /// Decodes calldata into the called function's name and arguments.
    fn decode_call(&self, tx: &Value) -> Result<(Address, String, Vec<Token>), WalletError> {
        let from = tx["from"]
            .as_str()
            .map(addr)
            .ok_or_else(|| WalletError::InvalidResponse("call without from".into()))?;
        let data = parse_data(&tx["data"])?;
        let function = self
            .interface
            .function_names()
            .filter_map(|name| self.interface.function(name).ok())
            .find(|f| data.len() >= 4 && f.selector() == data[..4])
            .ok_or_else(|| WalletError::from_rpc(-32000, "execution reverted: unknown selector"))?;
        let args = decode(&function.inputs, &data[4..])?;

        let name = function.name.clone();
        self.calls.lock().unwrap().push(name.clone());
        if self.failing.lock().unwrap().contains(&name) {
            return Err(WalletError::from_rpc(-32000, format!("{name} failed")));
        }
        Ok((from, name, args))
    }

    fn query(&self, from: Address, name: &str, args: Vec<Token>) -> Token {
        let state = self.state.lock().unwrap();
        let address_list = |list: Option<&Vec<Address>>| {
            Token::Array(
                list.map(|l| l.iter().copied().map(Token::Address).collect())
                    .unwrap_or_default(),
            )
        };
        let arg = |i: usize| args.get(i).cloned().and_then(Token::into_address).unwrap();

        match name {
            "getAllAppUser" => Token::Array(
                state
                    .users
                    .iter()
                    .map(|(name, account)| {
                        Token::Tuple(vec![Token::String(name.clone()), Token::Address(*account)])
                    })
                    .collect(),
            ),
            "getMyFriendList" => address_list(state.friends.get(&from)),
            "getPendingRequests" => address_list(state.pending.get(&from)),
            "getUsername" => {
                let account = arg(0);
                let name = state
                    .users
                    .iter()
                    .find(|(_, a)| *a == account)
                    .map(|(name, _)| name.clone())
                    .unwrap_or_default();
                Token::String(name)
            }
            "getMessages" => {
                let friend = arg(0);
                Token::Array(
                    state
                        .messages
                        .iter()
                        .filter(|(s, r, _, _)| {
                            (*s == from && *r == friend) || (*s == friend && *r == from)
                        })
                        .map(|(s, _, ts, msg)| {
                            Token::Tuple(vec![
                                Token::Address(*s),
                                Token::Uint(U256::from(*ts)),
                                Token::String(msg.clone()),
                            ])
                        })
                        .collect(),
                )
            }
            other => panic!("{other} is not a query"),
        }
    }

    fn execute(&self, from: Address, name: &str, mut args: Vec<Token>) {
        let mut state = self.state.lock().unwrap();
        let mut take = |i: usize| std::mem::replace(&mut args[i], Token::Bool(false));

        match name {
            "createAccount" => {
                let user = take(0).into_string().unwrap();
                state.users.push((user, from));
            }
            "sendFriendRequest" => {
                let to = take(0).into_address().unwrap();
                state.pending.entry(to).or_default().push(from);
            }
            "acceptFriendRequest" => {
                let requester = take(0).into_address().unwrap();
                state.pending.entry(from).or_default().retain(|a| *a != requester);
                state.friends.entry(from).or_default().push(requester);
                state.friends.entry(requester).or_default().push(from);
            }
            "addFriend" => {
                let friend = take(0).into_address().unwrap();
                state.friends.entry(from).or_default().push(friend);
                state.friends.entry(friend).or_default().push(from);
            }
            "sendMessage" => {
                let friend = take(0).into_address().unwrap();
                let msg = take(1).into_string().unwrap();
                state.clock += 1;
                let clock = state.clock;
                state.messages.push((from, friend, clock, msg));
            }
            other => panic!("{other} is not a transaction"),
        }
    }
}

#[async_trait]
impl InjectedProvider for MockChatApp {
    async fn request(&self, method: &str, params: Value) -> Result<Value, WalletError> {
        match method {
            "eth_requestAccounts" | "eth_accounts" => Ok(json!(self.account.iter().collect::<Vec<_>>())),
            "eth_chainId" => Ok(json!("0x7a69")),
            "eth_call" => {
                let (from, name, args) = self.decode_call(&params[0])?;
                let output = self.query(from, &name, args);
                Ok(json!(to_data(&encode(&[output]))))
            }
            "eth_sendTransaction" => {
                let (from, name, args) = self.decode_call(&params[0])?;
                let success = !self.reverting.lock().unwrap().contains(&name);
                if success {
                    self.execute(from, &name, args);
                }
                let mut state = self.state.lock().unwrap();
                state.next_tx += 1;
                let hash = format!("0x{:064x}", state.next_tx);
                state.receipts.insert(hash.clone(), success);
                Ok(json!(hash))
            }
            "eth_getTransactionReceipt" => {
                let hash = params[0].as_str().unwrap_or_default();
                let state = self.state.lock().unwrap();
                Ok(match state.receipts.get(hash) {
                    Some(success) => {
                        let status = if *success { "0x1" } else { "0x0" };
                        json!({"transactionHash": hash, "blockNumber": "0x1", "status": status})
                    }
                    None => Value::Null,
                })
            }
            other => Err(WalletError::from_rpc(-32601, format!("{other} not supported"))),
        }
    }
}

/// A session with no wallet installed.
pub fn offline_session() -> Arc<Session> {
    let interface = Arc::new(ChatApp::builtin_interface().unwrap());
    Arc::new(Session::new(None, CONTRACT, interface, Duration::from_millis(1)).unwrap())
}
