use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use alloy_primitives::U256;
use async_trait::async_trait;
use chain_eth::abi::{encode, function_selector, Token};
use chain_eth::address::parse_address;
use chat_contract::{ChatApp, Contract, ContractError};
use serde_json::{json, Value};
use wallet_provider::quantity::{parse_data, to_data};
use wallet_provider::{BrowserProvider, InjectedProvider, WalletError};

const CONTRACT: &str = "0x5FbDB2315678afecb367f032d93F642f64180aa3";
const ALICE: &str = "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266";
const BOB: &str = "0x70997970C51812dc3A010C7d01b50e0d17dc79C8";

/// Answers `eth_call` from canned outputs keyed by selector and records
/// every request.
#[derive(Default)]
struct Node {
    outputs: Mutex<HashMap<[u8; 4], Vec<u8>>>,
    sent: Mutex<Vec<Value>>,
    calls: Mutex<Vec<Value>>,
    receipt_status: Mutex<Option<&'static str>>,
}

impl Node {
    fn answer(&self, signature: &str, output: &[Token]) {
        self.outputs
            .lock()
            .unwrap()
            .insert(function_selector(signature), encode(output));
    }

    fn answer_raw(&self, signature: &str, output: Vec<u8>) {
        self.outputs
            .lock()
            .unwrap()
            .insert(function_selector(signature), output);
    }

    fn sent_data(&self) -> Vec<Vec<u8>> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .map(|tx| parse_data(&tx["data"]).unwrap())
            .collect()
    }
}

#[async_trait]
impl InjectedProvider for Node {
    async fn request(&self, method: &str, params: Value) -> Result<Value, WalletError> {
        match method {
            "eth_requestAccounts" => Ok(json!([ALICE])),
            "eth_call" => {
                self.calls.lock().unwrap().push(params[0].clone());
                let data = parse_data(&params[0]["data"])?;
                let selector: [u8; 4] = data[..4].try_into().unwrap();
                self.outputs
                    .lock()
                    .unwrap()
                    .get(&selector)
                    .map(|out| json!(to_data(out)))
                    .ok_or_else(|| WalletError::from_rpc(-32000, "execution reverted"))
            }
            "eth_sendTransaction" => {
                self.sent.lock().unwrap().push(params[0].clone());
                Ok(json!("0xabc1"))
            }
            "eth_getTransactionReceipt" => {
                let status = self.receipt_status.lock().unwrap().unwrap_or("0x1");
                Ok(json!({"transactionHash": "0xabc1", "blockNumber": "0x5", "status": status}))
            }
            other => Err(WalletError::from_rpc(-32601, format!("{other} not found"))),
        }
    }
}

async fn chat_app(node: Arc<Node>) -> ChatApp {
    let provider = BrowserProvider::new(Some(node as Arc<dyn InjectedProvider>))
        .unwrap()
        .with_poll_interval(Duration::from_millis(1));
    let signer = provider.get_signer().await.unwrap();
    let interface = Arc::new(ChatApp::builtin_interface().unwrap());
    ChatApp::new(Contract::new(CONTRACT, interface, signer).unwrap())
}

fn address(a: &str) -> Token {
    Token::Address(parse_address(a).unwrap())
}

#[tokio::test]
async fn get_all_app_user_decodes_tuples() {
    let node = Arc::new(Node::default());
    node.answer(
        "getAllAppUser()",
        &[Token::Array(vec![
            Token::Tuple(vec![Token::String("alice".into()), address(ALICE)]),
            Token::Tuple(vec![Token::String("bob".into()), address(BOB)]),
        ])],
    );
    let app = chat_app(node.clone()).await;

    let users = app.get_all_app_user().await.unwrap();

    assert_eq!(users.len(), 2);
    assert_eq!(users[0].name, "alice");
    assert_eq!(users[1].account_address, BOB);

    let call = node.calls.lock().unwrap()[0].clone();
    assert_eq!(call["from"], json!(ALICE));
    assert_eq!(call["to"], json!(CONTRACT));
}

#[tokio::test]
async fn address_lists_are_checksummed() {
    let node = Arc::new(Node::default());
    node.answer("getMyFriendList()", &[Token::Array(vec![address(BOB)])]);
    node.answer("getPendingRequests()", &[Token::Array(vec![])]);
    let app = chat_app(node).await;

    assert_eq!(app.get_my_friend_list().await.unwrap(), [BOB]);
    assert!(app.get_pending_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn get_messages_decodes_thread() {
    let node = Arc::new(Node::default());
    node.answer(
        "getMessages(address)",
        &[Token::Array(vec![Token::Tuple(vec![
            address(BOB),
            Token::Uint(U256::from(1_700_000_000u64)),
            Token::String("gm".into()),
        ])])],
    );
    node.answer("getUsername(address)", &[Token::String("bob".into())]);
    let app = chat_app(node.clone()).await;

    let messages = app.get_messages(BOB).await.unwrap();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].sender, BOB);
    assert_eq!(messages[0].timestamp, 1_700_000_000);
    assert_eq!(messages[0].msg, "gm");
    assert_eq!(app.get_username(BOB).await.unwrap(), "bob");

    let data = parse_data(&node.calls.lock().unwrap()[0]["data"]).unwrap();
    assert_eq!(&data[..4], &function_selector("getMessages(address)"));
    assert_eq!(&data[16..36], &parse_address(BOB).unwrap());
}

#[tokio::test]
async fn wrong_output_shape_is_an_error() {
    let node = Arc::new(Node::default());
    node.answer("getUsername(address)", &[Token::Bool(true)]);
    node.answer_raw("getMyFriendList()", vec![0u8; 7]);
    let app = chat_app(node).await;

    assert!(app.get_username(BOB).await.is_err());
    assert!(app.get_my_friend_list().await.is_err());
}

#[tokio::test]
async fn reverted_query_surfaces_rpc_error() {
    let node = Arc::new(Node::default());
    let app = chat_app(node).await;
    let err = app.get_all_app_user().await.unwrap_err();
    assert!(matches!(err, ContractError::Wallet(WalletError::Rpc { code: -32000, .. })));
}

#[tokio::test]
async fn transactions_encode_arguments_and_wait() {
    let node = Arc::new(Node::default());
    let app = chat_app(node.clone()).await;

    let hash = app.create_account("alice", "5550100", "female").await.unwrap();
    assert_eq!(hash, "0xabc1");
    app.send_friend_request(BOB).await.unwrap();
    app.accept_friend_request(BOB).await.unwrap();
    app.add_friend(BOB).await.unwrap();
    app.send_message(BOB, "hello").await.unwrap();

    let sent = node.sent_data();
    let selectors: Vec<[u8; 4]> = sent.iter().map(|d| d[..4].try_into().unwrap()).collect();
    assert_eq!(
        selectors,
        [
            function_selector("createAccount(string,string,string)"),
            function_selector("sendFriendRequest(address)"),
            function_selector("acceptFriendRequest(address)"),
            function_selector("addFriend(address)"),
            function_selector("sendMessage(address,string)"),
        ]
    );
    // sendMessage: address word, offset word, length word, one data word.
    assert_eq!(sent[4].len(), 4 + 4 * 32);
    assert_eq!(&sent[4][4 + 96..4 + 101], b"hello");
}

#[tokio::test]
async fn submit_message_returns_before_confirmation() {
    let node = Arc::new(Node::default());
    let app = chat_app(node.clone()).await;

    let pending = app.submit_message(BOB, "hi").await.unwrap();
    assert_eq!(pending.hash(), "0xabc1");
    assert_eq!(node.sent.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn reverted_transaction_is_an_error() {
    let node = Arc::new(Node::default());
    *node.receipt_status.lock().unwrap() = Some("0x0");
    let app = chat_app(node).await;

    let err = app.add_friend(BOB).await.unwrap_err();
    assert!(matches!(err, ContractError::Wallet(WalletError::Reverted(_))));
}

#[tokio::test]
async fn queries_and_transactions_are_not_interchangeable() {
    let node = Arc::new(Node::default());
    let app = chat_app(node).await;
    let contract = app.contract();

    assert!(matches!(
        contract.query("sendMessage", &[]).await,
        Err(ContractError::NotAQuery(_))
    ));
    assert!(matches!(
        contract.submit("getUsername", &[address(BOB)]).await,
        Err(ContractError::NotATransaction(_))
    ));
    assert!(matches!(
        contract.query("getFriends", &[]).await,
        Err(ContractError::UnknownFunction(_))
    ));
}
