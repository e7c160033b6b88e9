use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chain_eth::address::same_address;
use chat_contract::{AppUser, ChatApp, ContractError};

use crate::session::Session;
use crate::view::View;

pub const FETCH_USERS_FAILED: &str = "An error occurred while fetching the users.";
pub const FETCH_FRIENDS_FAILED: &str = "An error occurred while fetching the friend lists.";
pub const SEND_REQUEST_FAILED: &str = "An error occurred while sending the friend request.";
pub const ACCEPT_REQUEST_FAILED: &str = "An error occurred while accepting the friend request.";
pub const ADD_FRIEND_FAILED: &str = "An error occurred while adding the friend.";

/// The row button of a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowAction {
    SendRequest,
    AcceptRequest,
}

impl RowAction {
    pub fn label(self, busy: bool) -> &'static str {
        match (self, busy) {
            (RowAction::SendRequest, false) => "Send Friend Request",
            (RowAction::SendRequest, true) => "Sending...",
            (RowAction::AcceptRequest, false) => "Accept Friend Request",
            (RowAction::AcceptRequest, true) => "Accepting...",
        }
    }
}

/// Friend operations that change contract state.
#[derive(Debug, Clone, Copy)]
enum FriendOp {
    Send,
    Accept,
    Add,
}

impl FriendOp {
    fn name(self) -> &'static str {
        match self {
            FriendOp::Send => "sendFriendRequest",
            FriendOp::Accept => "acceptFriendRequest",
            FriendOp::Add => "addFriend",
        }
    }

    fn notice(self) -> &'static str {
        match self {
            FriendOp::Send => "Friend request sent!",
            FriendOp::Accept => "Friend request accepted!",
            FriendOp::Add => "Friend added successfully!",
        }
    }

    fn failure(self) -> &'static str {
        match self {
            FriendOp::Send => SEND_REQUEST_FAILED,
            FriendOp::Accept => ACCEPT_REQUEST_FAILED,
            FriendOp::Add => ADD_FRIEND_FAILED,
        }
    }

    async fn run(self, app: &ChatApp, address: &str) -> Result<String, ContractError> {
        match self {
            FriendOp::Send => app.send_friend_request(address).await,
            FriendOp::Accept => app.accept_friend_request(address).await,
            FriendOp::Add => app.add_friend(address).await,
        }
    }
}

/// Every registered user with their friend list and a friend-request
/// button.
#[derive(Debug)]
pub struct AllUsers {
    session: Arc<Session>,
    users: Vec<AppUser>,
    /// Friend lists keyed by lowercase user address.
    friend_lists: HashMap<String, Vec<String>>,
    /// Rows with a transaction in flight, keyed by lowercase address.
    busy: HashSet<String>,
    error: Option<String>,
    notice: Option<String>,
}

fn key(address: &str) -> String {
    address.to_ascii_lowercase()
}

impl AllUsers {
    pub fn new(session: Arc<Session>) -> Self {
        Self {
            session,
            users: Vec::new(),
            friend_lists: HashMap::new(),
            busy: HashSet::new(),
            error: None,
            notice: None,
        }
    }

    /// Fetches the users, then their friend lists.
    pub async fn load(&mut self) {
        let app = match self.session.chat_app().await {
            Ok(app) => app,
            Err(e) => {
                self.error = Some(super::report("getAllAppUser", &e, FETCH_USERS_FAILED));
                return;
            }
        };
        match app.get_all_app_user().await {
            Ok(users) => {
                tracing::debug!(count = users.len(), "users fetched");
                self.users = users;
            }
            Err(e) => {
                self.error = Some(super::report("getAllAppUser", &e, FETCH_USERS_FAILED));
                return;
            }
        }
        self.fetch_friend_lists(&app).await;
    }

    /// One `getMyFriendList` per user, stored under that user's address.
    /// The map is replaced only when every call succeeds.
    async fn fetch_friend_lists(&mut self, app: &ChatApp) {
        let mut lists = HashMap::with_capacity(self.users.len());
        for user in &self.users {
            match app.get_my_friend_list().await {
                Ok(friends) => {
                    lists.insert(key(&user.account_address), friends);
                }
                Err(e) => {
                    self.error = Some(super::report("getMyFriendList", &e, FETCH_FRIENDS_FAILED));
                    return;
                }
            }
        }
        self.friend_lists = lists;
    }

    pub async fn send_friend_request(&mut self, address: &str) {
        self.run_row(FriendOp::Send, address).await;
    }

    pub async fn accept_friend_request(&mut self, address: &str) {
        self.run_row(FriendOp::Accept, address).await;
    }

    pub async fn add_friend(&mut self, address: &str) {
        self.run_row(FriendOp::Add, address).await;
    }

    /// Presses the button of row `index`. Returns `false` when there is no
    /// such row.
    pub async fn press_row(&mut self, index: usize) -> bool {
        let Some(user) = self.users.get(index) else {
            return false;
        };
        let address = user.account_address.clone();
        match self.row_action(&address) {
            RowAction::SendRequest => self.send_friend_request(&address).await,
            RowAction::AcceptRequest => self.accept_friend_request(&address).await,
        }
        true
    }

    async fn run_row(&mut self, op: FriendOp, address: &str) {
        let row = key(address);
        if !self.busy.insert(row.clone()) {
            return;
        }

        let app = match self.session.chat_app().await {
            Ok(app) => app,
            Err(e) => {
                self.busy.remove(&row);
                self.error = Some(super::report(op.name(), &e, op.failure()));
                return;
            }
        };
        let result = op.run(&app, address).await;
        self.busy.remove(&row);

        match result {
            Ok(tx_hash) => {
                tracing::info!(%tx_hash, peer = address, op = op.name(), "friend operation confirmed");
                self.notice = Some(op.notice().to_string());
                self.fetch_friend_lists(&app).await;
            }
            Err(e) => {
                self.error = Some(super::report(op.name(), &e, op.failure()));
            }
        }
    }

    pub fn users(&self) -> &[AppUser] {
        &self.users
    }

    /// The friend list fetched for `address`, if any.
    pub fn friend_list(&self, address: &str) -> Option<&[String]> {
        self.friend_lists.get(&key(address)).map(Vec::as_slice)
    }

    /// "Accept" when the user's own address appears in the list fetched
    /// for them, otherwise "Send".
    pub fn row_action(&self, address: &str) -> RowAction {
        let listed = self
            .friend_list(address)
            .is_some_and(|friends| friends.iter().any(|f| same_address(f, address)));
        if listed {
            RowAction::AcceptRequest
        } else {
            RowAction::SendRequest
        }
    }

    pub fn is_busy(&self, address: &str) -> bool {
        self.busy.contains(&key(address))
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    pub fn render(&self) -> View {
        let mut view = View::new();
        view.heading("All Users");
        super::render_status(&mut view, self.error(), self.notice());

        if self.users.is_empty() {
            view.line("No users found.");
            return view;
        }
        for (index, user) in self.users.iter().enumerate() {
            let busy = self.is_busy(&user.account_address);
            view.line(format!("#{index}"))
                .field("Name", &user.name)
                .field("Address", &user.account_address)
                .button(self.row_action(&user.account_address).label(busy), !busy)
                .line("Friend List");
            match self.friend_list(&user.account_address) {
                Some(friends) if !friends.is_empty() => {
                    for friend in friends {
                        view.item(friend);
                    }
                }
                _ => {
                    view.item("No friends yet.");
                }
            }
            view.separator();
        }
        view
    }
}

/// Hosts [`AllUsers`] under its page heading.
#[derive(Debug)]
pub struct AllUsersPage {
    pub users: AllUsers,
}

impl AllUsersPage {
    pub fn new(session: Arc<Session>) -> Self {
        Self {
            users: AllUsers::new(session),
        }
    }

    pub async fn load(&mut self) {
        self.users.load().await;
    }

    pub fn render(&self) -> View {
        let mut view = View::new();
        view.heading("View All Users").nest(&self.users.render(), 2);
        view
    }
}
