//! Chat client for the `ChatApp` contract.
//!
//! A [`Session`] holds the wallet connection shared by every page. The
//! [`router`] maps paths to [`pages`], and [`App`] hosts the current page
//! for the terminal shell.

pub mod app;
pub mod bootstrap;
pub mod command;
pub mod config;
pub mod error;
pub mod logging;
pub mod pages;
pub mod router;
pub mod session;
pub mod view;

pub use app::{App, Flow};
pub use config::Config;
pub use error::{ConfigError, UiError};
pub use router::Route;
pub use session::Session;
