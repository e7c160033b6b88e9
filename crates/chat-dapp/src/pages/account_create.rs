use std::sync::Arc;

use crate::session::Session;
use crate::view::View;

pub const ACCOUNT_CREATED: &str = "Account created successfully!";

/// Registration form for the connected account.
#[derive(Debug)]
pub struct AccountCreate {
    session: Arc<Session>,
    pub name: String,
    pub phone_number: String,
    pub gender: String,
    loading: bool,
    error: Option<String>,
    success: Option<String>,
}

impl AccountCreate {
    pub fn new(session: Arc<Session>) -> Self {
        Self {
            session,
            name: String::new(),
            phone_number: String::new(),
            gender: String::new(),
            loading: false,
            error: None,
            success: None,
        }
    }

    /// Sends `createAccount` and waits for it to be mined. Ignored while a
    /// submission is already in flight.
    pub async fn submit(&mut self) {
        if self.loading {
            return;
        }
        self.loading = true;
        self.error = None;
        self.success = None;

        let result = match self.session.chat_app().await {
            Ok(app) => {
                app.create_account(&self.name, &self.phone_number, &self.gender)
                    .await
            }
            Err(e) => Err(e),
        };
        match result {
            Ok(tx_hash) => {
                tracing::info!(%tx_hash, name = %self.name, "account created");
                self.success = Some(ACCOUNT_CREATED.to_string());
            }
            Err(e) => {
                let fallback = format!("Error: {e}");
                self.error = Some(super::report("createAccount", &e, &fallback));
            }
        }
        self.loading = false;
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn success(&self) -> Option<&str> {
        self.success.as_deref()
    }

    pub fn render(&self) -> View {
        let mut view = View::new();
        view.heading("Create Your Account")
            .field("Name", &self.name)
            .field("Phone Number", &self.phone_number)
            .field("Gender", &self.gender);
        if self.loading {
            view.button("Creating Account...", false);
        } else {
            view.button("Create Account", true);
        }
        super::render_status(&mut view, self.error(), self.success());
        view
    }
}
