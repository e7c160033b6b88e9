//! The client's pages. Each page owns its view state, runs its workflow
//! through the [`Session`](crate::Session) and renders itself as a
//! [`View`].
//!
//! Remote failures never leave a page: they are logged and turned into the
//! page's error string.

pub mod account_create;
pub mod all_users;
pub mod chats;
pub mod home;
pub mod make_chat;

pub use account_create::AccountCreate;
pub use all_users::{AllUsers, AllUsersPage};
pub use chats::Chats;
pub use home::Home;
pub use make_chat::{MakeChat, MessageEntry, MessageStatus};

use chat_contract::ContractError;

use crate::session::page_error;
use crate::view::View;

/// Logs a failed remote call and returns the text the page shows for it.
fn report(action: &str, error: &ContractError, fallback: &str) -> String {
    tracing::warn!(%error, action, "remote call failed");
    page_error(error, fallback)
}

/// Renders the page's error and notice lines, if any.
fn render_status(view: &mut View, error: Option<&str>, notice: Option<&str>) {
    if let Some(error) = error {
        view.field("Error", error);
    }
    if let Some(notice) = notice {
        view.field("Notice", notice);
    }
}
