//! Development console: drive the manager by hand from stdin.
//!
//! Lines take the form `dispatchMessage {json}`, `deleteMessage <id>` or
//! `purgeUser <id>`. The bridge only accepts them in debug builds.

use serde::Deserialize;
use tracing::info;

use crate::bubble::{BubbleManager, Message, MessageText};
use crate::event::EventError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Dispatch(Message),
    Delete(String),
    Purge(String),
}

/// `dispatchMessage` payload, in the manager's own field names.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConsoleMessage {
    user_id: String,
    message_id: String,
    #[serde(default)]
    color: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    text: String,
}

impl From<ConsoleMessage> for Message {
    fn from(m: ConsoleMessage) -> Self {
        Self {
            user_id: m.user_id,
            message_id: m.message_id,
            color: m.color,
            name: m.name,
            text: MessageText::Plain(m.text),
        }
    }
}

/// Parse one console line.
///
/// # Errors
///
/// - [`EventError::UnknownCommand`] for an unrecognized verb
/// - [`EventError::InvalidJson`] for a bad `dispatchMessage` payload
/// - [`EventError::MissingField`] when a delete or purge has no id
pub fn parse_command(line: &str) -> Result<Command, EventError> {
    let line = line.trim();
    let (verb, arg) = line.split_once(char::is_whitespace).map_or((line, ""), |(verb, arg)| (verb, arg.trim()));

    match verb {
        "dispatchMessage" => {
            let message: ConsoleMessage = serde_json::from_str(arg)?;
            Ok(Command::Dispatch(message.into()))
        }
        "deleteMessage" => required(arg, "messageId").map(Command::Delete),
        "purgeUser" => required(arg, "userId").map(Command::Purge),
        other => Err(EventError::UnknownCommand(other.to_owned())),
    }
}

fn required(arg: &str, field: &'static str) -> Result<String, EventError> {
    if arg.is_empty() { Err(EventError::MissingField(field)) } else { Ok(arg.to_owned()) }
}

/// Run a parsed command against the manager.
pub fn run(manager: &mut BubbleManager, command: Command) {
    match command {
        Command::Dispatch(message) => {
            info!(message_id = %message.message_id, "console dispatch");
            manager.dispatch(message);
        }
        Command::Delete(message_id) => {
            let removed = manager.delete_message(&message_id);
            info!(%message_id, removed, "console delete");
        }
        Command::Purge(user_id) => {
            let removed = manager.purge_user(&user_id);
            info!(%user_id, removed, "console purge");
        }
    }
}

#[cfg(test)]
#[path = "console_test.rs"]
mod tests;
