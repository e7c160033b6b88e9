use std::collections::HashSet;
use std::sync::Arc;

use crate::session::Session;
use crate::view::View;

pub const CONNECT_FAILED: &str = "Failed to connect to the wallet.";
pub const FETCH_PENDING_FAILED: &str = "An error occurred while fetching the pending requests.";
pub const ACCEPT_FAILED: &str = "An error occurred while accepting the friend request.";

/// Friend requests waiting for the connected account.
#[derive(Debug)]
pub struct Chats {
    session: Arc<Session>,
    account: Option<String>,
    account_name: Option<String>,
    pending: Vec<String>,
    busy: HashSet<String>,
    error: Option<String>,
    notice: Option<String>,
}

impl Chats {
    pub fn new(session: Arc<Session>) -> Self {
        Self {
            session,
            account: None,
            account_name: None,
            pending: Vec::new(),
            busy: HashSet::new(),
            error: None,
            notice: None,
        }
    }

    pub async fn load(&mut self) {
        self.load_account().await;
        self.load_pending().await;
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

    async fn load_pending(&mut self) {
        let result = match self.session.chat_app().await {
            Ok(app) => app.get_pending_requests().await,
            Err(e) => Err(e),
        };
        match result {
            Ok(pending) => {
                tracing::debug!(count = pending.len(), "pending requests fetched");
                self.pending = pending;
            }
            Err(e) => {
                self.error = Some(super::report("getPendingRequests", &e, FETCH_PENDING_FAILED));
            }
        }
    }

    /// Accepts the request from `requester`, then reloads the pending list.
    pub async fn accept(&mut self, requester: &str) {
        let row = requester.to_ascii_lowercase();
        if !self.busy.insert(row.clone()) {
            return;
        }
        let result = match self.session.chat_app().await {
            Ok(app) => app.accept_friend_request(requester).await,
            Err(e) => Err(e),
        };
        self.busy.remove(&row);

        match result {
            Ok(tx_hash) => {
                tracing::info!(%tx_hash, requester, "friend request accepted");
                self.notice = Some("Friend request accepted!".to_string());
                self.load_pending().await;
            }
            Err(e) => {
                self.error = Some(super::report("acceptFriendRequest", &e, ACCEPT_FAILED));
            }
        }
    }

    /// Presses the accept button of row `index`. Returns `false` when there
    /// is no such row.
    pub async fn press_row(&mut self, index: usize) -> bool {
        let Some(requester) = self.pending.get(index).cloned() else {
            return false;
        };
        self.accept(&requester).await;
        true
    }

    pub fn account(&self) -> Option<&str> {
        self.account.as_deref()
    }

    pub fn account_name(&self) -> Option<&str> {
        self.account_name.as_deref()
    }

    pub fn pending(&self) -> &[String] {
        &self.pending
    }

    pub fn is_busy(&self, requester: &str) -> bool {
        self.busy.contains(&requester.to_ascii_lowercase())
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    pub fn render(&self) -> View {
        let mut view = View::new();
        view.heading("Pending Friend Requests");
        super::render_status(&mut view, self.error(), self.notice());

        if let Some(account) = &self.account {
            let name = match self.account_name.as_deref() {
                Some(name) if !name.is_empty() => name,
                _ => "Fetching name...",
            };
            view.field("Connected Account", account)
                .field("Account Name", name);
        }

        if self.pending.is_empty() {
            view.line("No pending friend requests.");
            return view;
        }
        for (index, requester) in self.pending.iter().enumerate() {
            let busy = self.is_busy(requester);
            let label = if busy { "Accepting..." } else { "Accept Friend Request" };
            view.line(format!("#{index}"))
                .field("Sender Address", requester)
                .button(label, !busy)
                .separator();
        }
        view
    }
}
