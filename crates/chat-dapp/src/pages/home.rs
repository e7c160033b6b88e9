use std::sync::Arc;

use crate::session::Session;
use crate::view::View;

pub const CONNECT_FAILED: &str = "Failed to connect to the wallet. Please try again.";

/// Landing page with the wallet connect button.
#[derive(Debug)]
pub struct Home {
    session: Arc<Session>,
    signer_address: Option<String>,
    error: Option<String>,
}

impl Home {
    pub fn new(session: Arc<Session>) -> Self {
        Self {
            session,
            signer_address: None,
            error: None,
        }
    }

    /// Shows an existing connection without asking the wallet again.
    pub async fn load(&mut self) {
        self.signer_address = self.session.connected_address().await;
    }

    pub async fn connect(&mut self) {
        match self.session.connect().await {
            Ok(address) => {
                self.signer_address = Some(address);
                self.error = None;
            }
            Err(e) => self.error = Some(super::report("connect", &e, CONNECT_FAILED)),
        }
    }

    pub fn signer_address(&self) -> Option<&str> {
        self.signer_address.as_deref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn render(&self) -> View {
        let mut view = View::new();
        view.heading("Home").button("CONNECT WALLET", true);
        match &self.signer_address {
            Some(address) => view.line(format!("Connected: {address}")),
            None => view.line("Not Connected"),
        };
        super::render_status(&mut view, self.error(), None);
        view
    }
}
