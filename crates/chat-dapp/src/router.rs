//! Path routing and the navigation bar.

use std::fmt;

use crate::error::UiError;
use crate::view::View;

/// One of the client's pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Home,
    AccountCreate,
    AllUsers,
    Chats,
    MakeChat,
}

/// Navbar links in display order.
pub const NAVBAR: [(&str, Route); 5] = [
    ("Home", Route::Home),
    ("All Users", Route::AllUsers),
    ("Chats requests", Route::Chats),
    ("Account Create", Route::AccountCreate),
    ("Make Chats", Route::MakeChat),
];

impl Route {
    pub const ALL: [Route; 5] = [
        Route::Home,
        Route::AccountCreate,
        Route::AllUsers,
        Route::Chats,
        Route::MakeChat,
    ];

    pub fn path(self) -> &'static str {
        match self {
            Route::Home => "/",
            Route::AccountCreate => "/AccountCreate",
            Route::AllUsers => "/AllUsersPage",
            Route::Chats => "/Chats",
            Route::MakeChat => "/MakeChat",
        }
    }

    /// Resolves a path. Case and a trailing slash are ignored.
    pub fn parse(path: &str) -> Result<Route, UiError> {
        let trimmed = path.trim();
        let normalized = match trimmed.trim_end_matches('/') {
            "" if trimmed.starts_with('/') => "/",
            p => p,
        };
        Self::ALL
            .into_iter()
            .find(|route| route.path().eq_ignore_ascii_case(normalized))
            .ok_or_else(|| UiError::UnknownRoute(path.to_string()))
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// Renders the navbar, marking the active route.
pub fn render_navbar(active: Route) -> View {
    let links: Vec<String> = NAVBAR
        .iter()
        .map(|(label, route)| {
            if *route == active {
                format!("*{label}* ({route})")
            } else {
                format!("{label} ({route})")
            }
        })
        .collect();
    let mut view = View::new();
    view.line(links.join(" | ")).separator();
    view
}
