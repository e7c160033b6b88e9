mod common;

use chat_dapp::pages::{
    account_create, all_users, chats, home, make_chat, AccountCreate, AllUsers, AllUsersPage,
    Chats, Home, MakeChat, MessageStatus,
};
use chat_dapp::session::WALLET_NOT_INSTALLED;
use common::{offline_session, MockChatApp, ALICE, BOB, CAROL};

#[tokio::test]
async fn pages_without_wallet_show_not_installed() {
    let session = offline_session();

    let mut home = Home::new(session.clone());
    home.connect().await;
    assert_eq!(home.error(), Some(WALLET_NOT_INSTALLED));
    assert!(home.render().contains("Not Connected"));

    let mut form = AccountCreate::new(session.clone());
    form.submit().await;
    assert_eq!(form.error(), Some(WALLET_NOT_INSTALLED));
    assert!(!form.is_loading());

    let mut users = AllUsers::new(session.clone());
    users.load().await;
    assert_eq!(users.error(), Some(WALLET_NOT_INSTALLED));
    assert!(users.render().contains("No users found."));

    let mut requests = Chats::new(session.clone());
    requests.load().await;
    assert_eq!(requests.error(), Some(WALLET_NOT_INSTALLED));
    assert!(requests.render().contains("No pending friend requests."));

    let mut chat = MakeChat::new(session);
    chat.load().await;
    assert_eq!(chat.error(), Some(WALLET_NOT_INSTALLED));
    assert!(!chat.is_loading_friends());
    assert!(chat.render().contains("No friends yet. Add some friends!"));
}

#[tokio::test]
async fn home_connects_first_account() {
    let mock = MockChatApp::new(ALICE);
    let mut home = Home::new(mock.session());
    assert!(home.render().contains("Not Connected"));

    home.connect().await;
    assert_eq!(home.signer_address(), Some(ALICE));
    assert!(home.render().contains(&format!("Connected: {ALICE}")));
}

#[tokio::test]
async fn home_reports_locked_wallet() {
    let mock = MockChatApp::locked();
    let mut page = Home::new(mock.session());
    page.connect().await;
    assert_eq!(page.error(), Some(home::CONNECT_FAILED));
    assert!(page.signer_address().is_none());
}

#[tokio::test]
async fn home_shows_existing_connection_on_load() {
    let mock = MockChatApp::new(ALICE);
    let session = mock.session();
    session.connect().await.unwrap();

    let mut home = Home::new(session);
    home.load().await;
    assert_eq!(home.signer_address(), Some(ALICE));
}

#[tokio::test]
async fn create_account_success() {
    let mock = MockChatApp::new(ALICE);
    let mut form = AccountCreate::new(mock.session());
    form.name = "alice".into();
    form.phone_number = "5550100".into();
    form.gender = "female".into();

    form.submit().await;

    assert_eq!(form.success(), Some(account_create::ACCOUNT_CREATED));
    assert!(form.error().is_none());
    assert!(!form.is_loading());
    assert_eq!(mock.user_names(), ["alice"]);
    assert!(form.render().contains("[Create Account]"));
}

#[tokio::test]
async fn create_account_failure_shows_reason() {
    let mock = MockChatApp::new(ALICE);
    mock.fail("createAccount");
    let mut form = AccountCreate::new(mock.session());
    form.name = "alice".into();

    form.submit().await;

    let error = form.error().unwrap();
    assert!(error.starts_with("Error: "), "{error}");
    assert!(error.contains("createAccount failed"), "{error}");
    assert!(form.success().is_none());
    assert!(!form.is_loading());
}

#[tokio::test]
async fn all_users_lists_each_user_with_friend_lists() {
    let mock = MockChatApp::new(ALICE);
    mock.register("alice", ALICE);
    mock.register("bob", BOB);
    mock.register("carol", CAROL);
    mock.befriend(ALICE, BOB);

    let mut page = AllUsers::new(mock.session());
    page.load().await;

    assert_eq!(page.users().len(), 3);
    assert_eq!(mock.count("getAllAppUser"), 1);
    assert_eq!(mock.count("getMyFriendList"), 3);

    // Every row holds the connected account's list; only bob is in it.
    assert_eq!(page.row_action(BOB), all_users::RowAction::AcceptRequest);
    assert_eq!(page.row_action(CAROL), all_users::RowAction::SendRequest);
    assert_eq!(page.row_action(ALICE), all_users::RowAction::SendRequest);

    let view = page.render();
    assert_eq!(view.lines().iter().filter(|l| l.starts_with("Name: ")).count(), 3);
    assert!(view.contains("[Accept Friend Request]"));
    assert!(view.contains("[Send Friend Request]"));
    assert!(page.error().is_none());
}

#[tokio::test]
async fn all_users_empty_states() {
    let mock = MockChatApp::new(ALICE);
    let mut page = AllUsers::new(mock.session());
    page.load().await;
    assert!(page.render().contains("No users found."));

    mock.register("carol", CAROL);
    let mut page = AllUsers::new(mock.session());
    page.load().await;
    assert!(page.render().contains("No friends yet."));
}

#[tokio::test]
async fn all_users_send_request_sets_notice_and_refreshes() {
    let mock = MockChatApp::new(ALICE);
    mock.register("bob", BOB);
    let mut page = AllUsers::new(mock.session());
    page.load().await;

    page.send_friend_request(BOB).await;

    assert_eq!(page.notice(), Some("Friend request sent!"));
    assert!(!page.is_busy(BOB));
    assert_eq!(mock.pending_for(BOB), [ALICE]);
    assert_eq!(mock.count("getMyFriendList"), 2);
}

#[tokio::test]
async fn all_users_press_row_follows_label() {
    let mock = MockChatApp::new(ALICE);
    mock.register("bob", BOB);
    mock.request(BOB, ALICE);
    mock.befriend(ALICE, BOB);
    let mut page = AllUsers::new(mock.session());
    page.load().await;

    assert!(page.press_row(0).await);
    assert_eq!(mock.count("acceptFriendRequest"), 1);
    assert_eq!(page.notice(), Some("Friend request accepted!"));

    assert!(!page.press_row(5).await);
}

#[tokio::test]
async fn all_users_add_friend() {
    let mock = MockChatApp::new(ALICE);
    mock.register("carol", CAROL);
    let mut page = AllUsers::new(mock.session());
    page.load().await;

    page.add_friend(CAROL).await;

    assert_eq!(page.notice(), Some("Friend added successfully!"));
    assert_eq!(mock.friends_of(ALICE), [CAROL]);
    assert_eq!(page.friend_list(CAROL), Some(&[CAROL.to_string()][..]));
}

#[tokio::test]
async fn all_users_failures_set_page_error() {
    let mock = MockChatApp::new(ALICE);
    mock.register("bob", BOB);
    mock.fail("getMyFriendList");
    let mut page = AllUsers::new(mock.session());
    page.load().await;
    assert_eq!(page.error(), Some(all_users::FETCH_FRIENDS_FAILED));
    assert_eq!(page.users().len(), 1);

    mock.revert("sendFriendRequest");
    page.send_friend_request(BOB).await;
    assert_eq!(page.error(), Some(all_users::SEND_REQUEST_FAILED));
    assert!(page.notice().is_none());
    assert!(!page.is_busy(BOB));
}

#[tokio::test]
async fn all_users_fetch_failure() {
    let mock = MockChatApp::new(ALICE);
    mock.fail("getAllAppUser");
    let mut page = AllUsers::new(mock.session());
    page.load().await;
    assert_eq!(page.error(), Some(all_users::FETCH_USERS_FAILED));
    assert_eq!(mock.count("getMyFriendList"), 0);
}

#[tokio::test]
async fn all_users_page_adds_heading() {
    let mock = MockChatApp::new(ALICE);
    mock.register("bob", BOB);
    let mut page = AllUsersPage::new(mock.session());
    page.load().await;

    let view = page.render();
    assert_eq!(view.lines()[0], "View All Users");
    assert!(view.contains("Name: bob"));
}

#[tokio::test]
async fn chats_shows_account_and_pending_requests() {
    let mock = MockChatApp::new(ALICE);
    mock.register("alice", ALICE);
    mock.request(BOB, ALICE);
    mock.request(CAROL, ALICE);

    let mut page = Chats::new(mock.session());
    page.load().await;

    assert_eq!(page.account(), Some(ALICE));
    assert_eq!(page.account_name(), Some("alice"));
    assert_eq!(page.pending(), [BOB, CAROL]);
    let view = page.render();
    assert!(view.contains("Account Name: alice"));
    assert!(view.contains(&format!("Sender Address: {CAROL}")));
}

#[tokio::test]
async fn chats_accept_reloads_pending() {
    let mock = MockChatApp::new(ALICE);
    mock.request(BOB, ALICE);
    let mut page = Chats::new(mock.session());
    page.load().await;

    page.accept(BOB).await;

    assert_eq!(page.notice(), Some("Friend request accepted!"));
    assert!(page.pending().is_empty());
    assert!(!page.is_busy(BOB));
    assert_eq!(mock.friends_of(ALICE), [BOB]);
    assert_eq!(mock.count("getPendingRequests"), 2);
    assert!(page.render().contains("No pending friend requests."));
}

#[tokio::test]
async fn chats_unregistered_account_shows_fetching_name() {
    let mock = MockChatApp::new(ALICE);
    let mut page = Chats::new(mock.session());
    page.load().await;
    assert!(page.render().contains("Account Name: Fetching name..."));
}

#[tokio::test]
async fn chats_failures_set_page_error() {
    let mock = MockChatApp::new(ALICE);
    mock.request(BOB, ALICE);
    mock.fail("acceptFriendRequest");
    let mut page = Chats::new(mock.session());
    page.load().await;

    page.accept(BOB).await;
    assert_eq!(page.error(), Some(chats::ACCEPT_FAILED));
    assert_eq!(page.pending(), [BOB]);

    mock.fail("getPendingRequests");
    let mut page = Chats::new(mock.session());
    page.load().await;
    assert_eq!(page.error(), Some(chats::FETCH_PENDING_FAILED));
}

#[tokio::test]
async fn make_chat_loads_friends() {
    let mock = MockChatApp::new(ALICE);
    mock.register("alice", ALICE);
    mock.befriend(ALICE, BOB);
    let mut page = MakeChat::new(mock.session());
    assert!(page.render().contains("Loading friends..."));

    page.load().await;

    assert!(!page.is_loading_friends());
    assert_eq!(page.friends(), [BOB]);
    let view = page.render();
    assert!(view.contains("Please select a friend to start chatting."));
    assert!(view.contains("Username: alice"));
}

#[tokio::test]
async fn make_chat_select_fetches_once_each() {
    let mock = MockChatApp::new(ALICE);
    mock.register("bob", BOB);
    mock.befriend(ALICE, BOB);
    mock.post(BOB, ALICE, "hey");
    let mut page = MakeChat::new(mock.session());
    page.load().await;
    let before = mock.calls().len();

    page.select_friend(BOB).await;

    let calls = mock.calls();
    assert_eq!(&calls[before..], ["getMessages", "getUsername"]);
    assert_eq!(page.selected_friend_name(), Some("bob"));
    assert_eq!(page.messages().len(), 1);

    let view = page.render();
    assert!(view.contains("Chatting with bob"));
    assert!(view.lines().iter().any(|l| l.starts_with("< hey [")));
}

#[tokio::test]
async fn make_chat_empty_thread() {
    let mock = MockChatApp::new(ALICE);
    mock.befriend(ALICE, BOB);
    let mut page = MakeChat::new(mock.session());
    page.load().await;
    page.select_friend(BOB).await;
    assert!(page.render().contains("No messages yet. Start a conversation!"));
}

#[tokio::test]
async fn make_chat_blank_message_makes_no_call() {
    let mock = MockChatApp::new(ALICE);
    mock.befriend(ALICE, BOB);
    let mut page = MakeChat::new(mock.session());
    page.load().await;
    page.select_friend(BOB).await;
    let before = mock.calls().len();

    page.send_message("").await;
    page.send_message("   \t").await;

    assert_eq!(mock.calls().len(), before);
    assert!(page.messages().is_empty());
}

#[tokio::test]
async fn make_chat_send_without_selection_makes_no_call() {
    let mock = MockChatApp::new(ALICE);
    let mut page = MakeChat::new(mock.session());
    page.send_message("hello").await;
    assert!(mock.calls().is_empty());
}

#[tokio::test]
async fn make_chat_sent_message_is_reconciled_on_next_fetch() {
    let mock = MockChatApp::new(ALICE);
    mock.befriend(ALICE, BOB);
    let mut page = MakeChat::new(mock.session());
    page.load().await;
    page.select_friend(BOB).await;

    page.draft = "hello bob".into();
    page.send_draft().await;

    assert!(page.draft.is_empty());
    assert_eq!(page.messages().len(), 1);
    assert!(matches!(
        page.messages()[0].status,
        MessageStatus::Confirmed { .. }
    ));
    assert_eq!(page.messages()[0].message.sender, ALICE);
    assert!(page
        .render()
        .lines()
        .iter()
        .any(|l| l.trim_start().starts_with("hello bob [") && l.ends_with(" >")));

    page.refresh_messages().await;

    assert_eq!(page.messages().len(), 1);
    assert_eq!(page.messages()[0].status, MessageStatus::Stored);
    assert_eq!(mock.message_count(), 1);
}

#[tokio::test]
async fn make_chat_reverted_message_is_marked_failed() {
    let mock = MockChatApp::new(ALICE);
    mock.befriend(ALICE, BOB);
    mock.revert("sendMessage");
    let mut page = MakeChat::new(mock.session());
    page.load().await;
    page.select_friend(BOB).await;

    page.send_message("lost").await;

    assert_eq!(page.error(), Some(make_chat::SEND_FAILED));
    assert_eq!(page.messages()[0].status, MessageStatus::Failed);
    assert!(page.render().contains("(failed)"));

    page.refresh_messages().await;
    assert!(page.messages().is_empty());
}

#[tokio::test]
async fn make_chat_rejected_submission_adds_nothing() {
    let mock = MockChatApp::new(ALICE);
    mock.befriend(ALICE, BOB);
    mock.fail("sendMessage");
    let mut page = MakeChat::new(mock.session());
    page.load().await;
    page.select_friend(BOB).await;

    page.send_message("nope").await;

    assert_eq!(page.error(), Some(make_chat::SEND_FAILED));
    assert!(page.messages().is_empty());
}

#[tokio::test]
async fn make_chat_fetch_failures_set_page_error() {
    let mock = MockChatApp::new(ALICE);
    mock.fail("getMyFriendList");
    let mut page = MakeChat::new(mock.session());
    page.load().await;
    assert_eq!(page.error(), Some(make_chat::FETCH_FRIENDS_FAILED));
    assert!(!page.is_loading_friends());

    mock.fail("getMessages");
    page.select_friend(BOB).await;
    assert_eq!(page.error(), Some(make_chat::FETCH_MESSAGES_FAILED));
    assert_eq!(page.selected_friend(), Some(BOB));
}
