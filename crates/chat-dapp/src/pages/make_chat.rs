use std::sync::Arc;

use chain_eth::address::same_address;
use chat_contract::{ChatMessage, ContractError};
use chrono::{Local, TimeZone};

use crate::session::Session;
use crate::view::View;

pub const CONNECT_FAILED: &str = "Failed to connect to the wallet.";
pub const FETCH_FRIENDS_FAILED: &str = "An error occurred while fetching the friends list.";
pub const FETCH_MESSAGES_FAILED: &str = "An error occurred while fetching messages.";
pub const SEND_FAILED: &str = "An error occurred while sending the message.";

/// Confirmation state of a message in the thread.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageStatus {
    /// Fetched from the contract.
    Stored,
    /// Submitted, not yet mined.
    Pending { tx_hash: String },
    /// Mined, but not yet seen in a fetched thread.
    Confirmed { tx_hash: String },
    /// Reverted or never confirmed.
    Failed,
}

/// One line of the conversation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageEntry {
    pub message: ChatMessage,
    pub status: MessageStatus,
}

impl MessageEntry {
    fn stored(message: ChatMessage) -> Self {
        Self {
            message,
            status: MessageStatus::Stored,
        }
    }

    pub fn is_local(&self) -> bool {
        self.status != MessageStatus::Stored
    }
}

/// Merges a freshly fetched thread with locally sent entries.
///
/// A local entry is dropped when a fetched message has the same sender and
/// text (each fetched message absorbs at most one local entry). Unmatched
/// local entries survive only while their transaction is pending.
pub fn reconcile(fetched: Vec<ChatMessage>, local: Vec<MessageEntry>) -> Vec<MessageEntry> {
    let mut absorbed = vec![false; fetched.len()];
    let mut survivors = Vec::new();

    for entry in local.into_iter().filter(MessageEntry::is_local) {
        let matched = fetched.iter().enumerate().position(|(i, m)| {
            !absorbed[i] && m.msg == entry.message.msg && same_address(&m.sender, &entry.message.sender)
        });
        match matched {
            Some(i) => absorbed[i] = true,
            None if matches!(entry.status, MessageStatus::Pending { .. }) => survivors.push(entry),
            None => {}
        }
    }

    let mut thread: Vec<MessageEntry> = fetched.into_iter().map(MessageEntry::stored).collect();
    thread.extend(survivors);
    thread
}

/// Local `HH:MM:SS` time of a Unix timestamp.
pub fn format_time(timestamp: u64) -> String {
    i64::try_from(timestamp)
        .ok()
        .and_then(|secs| Local.timestamp_opt(secs, 0).single())
        .map(|time| time.format("%H:%M:%S").to_string())
        .unwrap_or_else(|| "--:--:--".to_string())
}

/// Conversation view with the friend list.
#[derive(Debug)]
pub struct MakeChat {
    session: Arc<Session>,
    account: Option<String>,
    account_name: Option<String>,
    friends: Vec<String>,
    loading_friends: bool,
    selected_friend: Option<String>,
    selected_friend_name: Option<String>,
    messages: Vec<MessageEntry>,
    pub draft: String,
    error: Option<String>,
}

impl MakeChat {
    pub fn new(session: Arc<Session>) -> Self {
        Self {
            session,
            account: None,
            account_name: None,
            friends: Vec::new(),
            loading_friends: true,
            selected_friend: None,
            selected_friend_name: None,
            messages: Vec::new(),
            draft: String::new(),
            error: None,
        }
    }

    pub async fn load(&mut self) {
        self.load_account().await;
        self.load_friends().await;
    }

    async fn load_account(&mut self) {
        let app = match self.session.chat_app().await {
            Ok(app) => app,
            Err(e) => {
                self.error = Some(super::report("connect", &e, CONNECT_FAILED));
                return;
            }
        };
        let account = app.account().to_string();
        self.account = Some(account.clone());
        match app.get_username(&account).await {
            Ok(name) => self.account_name = Some(name),
            Err(e) => self.error = Some(super::report("getUsername", &e, CONNECT_FAILED)),
        }
    }

    async fn load_friends(&mut self) {
        self.loading_friends = true;
        let result = match self.session.chat_app().await {
            Ok(app) => app.get_my_friend_list().await,
            Err(e) => Err(e),
        };
        match result {
            Ok(friends) => self.friends = friends,
            Err(e) => {
                self.error = Some(super::report("getMyFriendList", &e, FETCH_FRIENDS_FAILED));
            }
        }
        self.loading_friends = false;
    }

    /// Opens the conversation with `friend`: one `getMessages` and one
    /// `getUsername`.
    pub async fn select_friend(&mut self, friend: &str) {
        let switching = !self
            .selected_friend
            .as_deref()
            .is_some_and(|current| same_address(current, friend));
        if switching {
            self.messages.clear();
            self.selected_friend_name = None;
        }
        self.selected_friend = Some(friend.to_string());
        self.refresh_messages().await;
    }

    /// Re-fetches the open conversation.
    pub async fn refresh_messages(&mut self) {
        let Some(friend) = self.selected_friend.clone() else {
            return;
        };
        let app = match self.session.chat_app().await {
            Ok(app) => app,
            Err(e) => {
                self.error = Some(super::report("getMessages", &e, FETCH_MESSAGES_FAILED));
                return;
            }
        };
        match app.get_messages(&friend).await {
            Ok(fetched) => {
                let local = std::mem::take(&mut self.messages);
                self.messages = reconcile(fetched, local);
            }
            Err(e) => {
                self.error = Some(super::report("getMessages", &e, FETCH_MESSAGES_FAILED));
                return;
            }
        }
        match app.get_username(&friend).await {
            Ok(name) => self.selected_friend_name = Some(name),
            Err(e) => {
                self.error = Some(super::report("getUsername", &e, FETCH_MESSAGES_FAILED));
            }
        }
    }

    /// Sends `text` to the selected friend. Blank text or no selection is a
    /// no-op. The message is shown as pending as soon as it is submitted.
    pub async fn send_message(&mut self, text: &str) {
        if text.trim().is_empty() {
            return;
        }
        let Some(friend) = self.selected_friend.clone() else {
            return;
        };

        let app = match self.session.chat_app().await {
            Ok(app) => app,
            Err(e) => {
                self.error = Some(super::report("sendMessage", &e, SEND_FAILED));
                return;
            }
        };
        let pending = match app.submit_message(&friend, text).await {
            Ok(pending) => pending,
            Err(e) => {
                self.error = Some(super::report("sendMessage", &e, SEND_FAILED));
                return;
            }
        };

        let tx_hash = pending.hash().to_string();
        let now = u64::try_from(chrono::Utc::now().timestamp()).unwrap_or_default();
        self.messages.push(MessageEntry {
            message: ChatMessage {
                sender: app.account().to_string(),
                timestamp: now,
                msg: text.to_string(),
            },
            status: MessageStatus::Pending {
                tx_hash: tx_hash.clone(),
            },
        });
        self.draft.clear();

        let status = match pending.wait().await {
            Ok(receipt) => MessageStatus::Confirmed {
                tx_hash: receipt.transaction_hash,
            },
            Err(e) => {
                let e = ContractError::from(e);
                self.error = Some(super::report("sendMessage", &e, SEND_FAILED));
                MessageStatus::Failed
            }
        };
        if let Some(entry) = self.messages.iter_mut().rev().find(|m| {
            matches!(&m.status, MessageStatus::Pending { tx_hash: h } if *h == tx_hash)
        }) {
            entry.status = status;
        }
    }

    /// Sends the current draft.
    pub async fn send_draft(&mut self) {
        let text = self.draft.clone();
        self.send_message(&text).await;
    }

    pub fn account(&self) -> Option<&str> {
        self.account.as_deref()
    }

    pub fn friends(&self) -> &[String] {
        &self.friends
    }

    pub fn is_loading_friends(&self) -> bool {
        self.loading_friends
    }

    pub fn selected_friend(&self) -> Option<&str> {
        self.selected_friend.as_deref()
    }

    pub fn selected_friend_name(&self) -> Option<&str> {
        self.selected_friend_name.as_deref()
    }

    pub fn messages(&self) -> &[MessageEntry] {
        &self.messages
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn render(&self) -> View {
        let mut view = View::new();
        view.heading("Chat");
        super::render_status(&mut view, self.error(), None);

        match &self.selected_friend {
            Some(friend) => {
                let name = self.selected_friend_name.as_deref().unwrap_or(friend);
                view.line(format!("Chatting with {name}"));
                if self.messages.is_empty() {
                    view.line("No messages yet. Start a conversation!");
                }
                for entry in &self.messages {
                    view.line(self.render_message(entry));
                }
                view.field("Message", &self.draft).button("Send", true);
            }
            None => {
                view.line("Please select a friend to start chatting.");
            }
        }

        view.blank().line("Account Information");
        let name = match self.account_name.as_deref() {
            Some(name) if !name.is_empty() => name,
            _ => "Fetching name...",
        };
        view.field("Address", self.account.as_deref().unwrap_or_default())
            .field("Username", name);

        view.blank().line("Friends List");
        if self.loading_friends {
            view.line("Loading friends...");
        } else if self.friends.is_empty() {
            view.line("No friends yet. Add some friends!");
        } else {
            for friend in &self.friends {
                let selected = self
                    .selected_friend
                    .as_deref()
                    .is_some_and(|s| same_address(s, friend));
                match (&self.selected_friend_name, selected) {
                    (Some(name), true) => view.item(format!("*{name}*")),
                    _ => view.item(friend),
                };
            }
        }
        view
    }

    fn render_message(&self, entry: &MessageEntry) -> String {
        let mine = self
            .account
            .as_deref()
            .is_some_and(|a| same_address(a, &entry.message.sender));
        let time = format_time(entry.message.timestamp);
        let status = match &entry.status {
            MessageStatus::Stored | MessageStatus::Confirmed { .. } => "",
            MessageStatus::Pending { .. } => " (pending)",
            MessageStatus::Failed => " (failed)",
        };
        if mine {
            format!("{:>48} [{time}]{status} >", entry.message.msg)
        } else {
            format!("< {} [{time}]{status}", entry.message.msg)
        }
    }
}
