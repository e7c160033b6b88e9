//! Hosts the current page for the shell.

use std::sync::Arc;

use crate::command::{Command, HELP};
use crate::error::UiError;
use crate::pages::{AccountCreate, AllUsersPage, Chats, Home, MakeChat};
use crate::router::{render_navbar, Route, NAVBAR};
use crate::session::Session;
use crate::view::View;

/// The page behind the current route.
#[derive(Debug)]
pub enum ActivePage {
    Home(Home),
    AccountCreate(AccountCreate),
    AllUsers(AllUsersPage),
    Chats(Chats),
    MakeChat(MakeChat),
}

impl ActivePage {
    fn new(route: Route, session: Arc<Session>) -> Self {
        match route {
            Route::Home => ActivePage::Home(Home::new(session)),
            Route::AccountCreate => ActivePage::AccountCreate(AccountCreate::new(session)),
            Route::AllUsers => ActivePage::AllUsers(AllUsersPage::new(session)),
            Route::Chats => ActivePage::Chats(Chats::new(session)),
            Route::MakeChat => ActivePage::MakeChat(MakeChat::new(session)),
        }
    }

    async fn load(&mut self) {
        match self {
            ActivePage::Home(page) => page.load().await,
            ActivePage::AccountCreate(_) => {}
            ActivePage::AllUsers(page) => page.load().await,
            ActivePage::Chats(page) => page.load().await,
            ActivePage::MakeChat(page) => page.load().await,
        }
    }

    fn render(&self) -> View {
        match self {
            ActivePage::Home(page) => page.render(),
            ActivePage::AccountCreate(page) => page.render(),
            ActivePage::AllUsers(page) => page.render(),
            ActivePage::Chats(page) => page.render(),
            ActivePage::MakeChat(page) => page.render(),
        }
    }
}

/// What the shell does after a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// The router and the page it currently shows.
#[derive(Debug)]
pub struct App {
    session: Arc<Session>,
    route: Route,
    page: ActivePage,
    /// One-off output of the last command (help, navigation list).
    message: Option<String>,
}

impl App {
    /// Opens the home page.
    pub async fn start(session: Arc<Session>) -> Self {
        let mut page = ActivePage::new(Route::Home, session.clone());
        page.load().await;
        Self {
            session,
            route: Route::Home,
            page,
            message: None,
        }
    }

    pub fn route(&self) -> Route {
        self.route
    }

    pub fn page(&self) -> &ActivePage {
        &self.page
    }

    /// Replaces the page with a fresh one for `route` and loads it.
    pub async fn navigate(&mut self, route: Route) {
        tracing::debug!(path = route.path(), "navigate");
        self.route = route;
        self.page = ActivePage::new(route, self.session.clone());
        self.page.load().await;
    }

    /// Runs one command against the current page.
    pub async fn dispatch(&mut self, command: Command) -> Result<Flow, UiError> {
        self.message = None;
        let name = command.name();

        let command = match command {
            Command::Quit => return Ok(Flow::Quit),
            Command::Help => {
                self.message = Some(HELP.to_string());
                return Ok(Flow::Continue);
            }
            Command::Nav => {
                let links: Vec<String> = NAVBAR
                    .iter()
                    .map(|(label, route)| format!("{label}: {route}"))
                    .collect();
                self.message = Some(links.join("\n"));
                return Ok(Flow::Continue);
            }
            Command::Go(path) => {
                let route = Route::parse(&path)?;
                self.navigate(route).await;
                return Ok(Flow::Continue);
            }
            Command::Reload => {
                self.navigate(self.route).await;
                return Ok(Flow::Continue);
            }
            command => command,
        };

        match (command, &mut self.page) {
            (Command::Connect, ActivePage::Home(page)) => page.connect().await,

            (Command::Name(value), ActivePage::AccountCreate(page)) => page.name = value,
            (Command::Phone(value), ActivePage::AccountCreate(page)) => page.phone_number = value,
            (Command::Gender(value), ActivePage::AccountCreate(page)) => page.gender = value,
            (Command::Create, ActivePage::AccountCreate(page)) => page.submit().await,

            (Command::Send(address), ActivePage::AllUsers(page)) => {
                page.users.send_friend_request(&address).await
            }
            (Command::Accept(address), ActivePage::AllUsers(page)) => {
                page.users.accept_friend_request(&address).await
            }
            (Command::Add(address), ActivePage::AllUsers(page)) => {
                page.users.add_friend(&address).await
            }
            (Command::Press(index), ActivePage::AllUsers(page)) => {
                if !page.users.press_row(index).await {
                    self.message = Some(format!("no row #{index}"));
                }
            }

            (Command::Accept(address), ActivePage::Chats(page)) => page.accept(&address).await,
            (Command::Press(index), ActivePage::Chats(page)) => {
                if !page.press_row(index).await {
                    self.message = Some(format!("no row #{index}"));
                }
            }

            (Command::Select(address), ActivePage::MakeChat(page)) => {
                page.select_friend(&address).await
            }
            (Command::Say(text), ActivePage::MakeChat(page)) => {
                page.draft = text;
                page.send_draft().await;
            }

            _ => {
                return Err(UiError::NotOnThisPage {
                    command: name.to_string(),
                    path: self.route.path(),
                })
            }
        }
        Ok(Flow::Continue)
    }

    /// The navbar followed by the current page.
    pub fn render(&self) -> View {
        let mut view = render_navbar(self.route);
        if let Some(message) = &self.message {
            for line in message.lines() {
                view.line(line);
            }
            view.blank();
        }
        view.nest(&self.page.render(), 0);
        view
    }
}
