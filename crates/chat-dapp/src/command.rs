//! Shell commands.

use crate::error::UiError;

/// A parsed shell line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Go(String),
    Nav,
    Connect,
    Name(String),
    Phone(String),
    Gender(String),
    Create,
    Send(String),
    Accept(String),
    Add(String),
    Press(usize),
    Select(String),
    Say(String),
    Reload,
    Help,
    Quit,
}

pub const HELP: &str = "\
commands:
  go <path>        open a page (/, /AccountCreate, /AllUsersPage, /Chats, /MakeChat)
  nav              list the pages
  connect          connect the wallet (Home)
  name <value>     set the name field (Account Create)
  phone <value>    set the phone number field (Account Create)
  gender <value>   set the gender field (Account Create)
  create           submit the account form (Account Create)
  send <address>   send a friend request (All Users)
  accept <address> accept a friend request (All Users, Chats requests)
  add <address>    add a friend (All Users)
  press <row>      press the button of a numbered row (All Users, Chats requests)
  select <address> open the conversation with a friend (Make Chats)
  say <text>       send a message to the selected friend (Make Chats)
  reload           reload the current page
  help             show this help
  quit             exit";

impl Command {
    /// Parses one line. Returns `None` for a blank line.
    pub fn parse(line: &str) -> Result<Option<Command>, UiError> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(None);
        }
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };

        let required = |what: &'static str| -> Result<String, UiError> {
            if rest.is_empty() {
                Err(UiError::MissingArgument {
                    command: word.to_string(),
                    what,
                })
            } else {
                Ok(rest.to_string())
            }
        };

        let command = match word.to_ascii_lowercase().as_str() {
            "go" => Command::Go(required("a path")?),
            "nav" => Command::Nav,
            "connect" => Command::Connect,
            "name" => Command::Name(rest.to_string()),
            "phone" => Command::Phone(rest.to_string()),
            "gender" => Command::Gender(rest.to_string()),
            "create" => Command::Create,
            "send" => Command::Send(required("an address")?),
            "accept" => Command::Accept(required("an address")?),
            "add" => Command::Add(required("an address")?),
            "press" => {
                let row = required("a row number")?;
                let index = row.parse().map_err(|_| UiError::MissingArgument {
                    command: word.to_string(),
                    what: "a row number",
                })?;
                Command::Press(index)
            }
            "select" => Command::Select(required("an address")?),
            "say" => Command::Say(rest.to_string()),
            "reload" => Command::Reload,
            "help" | "?" => Command::Help,
            "quit" | "exit" => Command::Quit,
            _ => return Err(UiError::UnknownCommand(word.to_string())),
        };
        Ok(Some(command))
    }

    /// The command word, for error messages.
    pub fn name(&self) -> &'static str {
        match self {
            Command::Go(_) => "go",
            Command::Nav => "nav",
            Command::Connect => "connect",
            Command::Name(_) => "name",
            Command::Phone(_) => "phone",
            Command::Gender(_) => "gender",
            Command::Create => "create",
            Command::Send(_) => "send",
            Command::Accept(_) => "accept",
            Command::Add(_) => "add",
            Command::Press(_) => "press",
            Command::Select(_) => "select",
            Command::Say(_) => "say",
            Command::Reload => "reload",
            Command::Help => "help",
            Command::Quit => "quit",
        }
    }
}
