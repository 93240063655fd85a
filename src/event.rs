//! Host event dispatcher. Turns host envelopes into manager operations.
//!
//! DESIGN
//! ======
//! Host input arrives as JSON envelopes tagged by `type`. Event envelopes are
//! first mapped to a [`Route`] by the pure [`route`] function, then
//! [`apply`] performs the side effect on the manager.
//!
//! ERROR HANDLING
//! ==============
//! Only envelope decoding can fail ([`parse_input`]). Once decoded, an event
//! that is missing its payload, names an unknown listener, or lacks a
//! required id is ignored with a debug line. Nothing here is fatal.

use std::time::Instant;

use serde::Deserialize;
use serde_json::Value as JsonValue;
use tracing::debug;

use crate::bubble::{BubbleManager, Message, MessageText, StyleConfig};
use crate::markup::Raw;

pub const MESSAGE_LISTENER: &str = "message";
pub const DELETE_MESSAGE_LISTENER: &str = "delete-message";
pub const DELETE_MESSAGES_LISTENER: &str = "delete-messages";

// =============================================================================
// ERRORS
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum EventError {
    #[error("invalid json: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error("missing field: {0}")]
    MissingField(&'static str),
    #[error("unknown command: {0}")]
    UnknownCommand(String),
}

// =============================================================================
// ENVELOPES
// =============================================================================

/// One line of host input.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", content = "detail")]
pub enum HostInput {
    #[serde(rename = "onEventReceived")]
    EventReceived(EventReceived),
    #[serde(rename = "onWidgetLoad")]
    WidgetLoad(WidgetLoad),
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct EventReceived {
    #[serde(default)]
    pub listener: String,
    #[serde(default)]
    pub event: Option<JsonValue>,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct WidgetLoad {
    #[serde(rename = "fieldData", default)]
    pub field_data: StyleConfig,
}

/// Decode one NDJSON line.
///
/// # Errors
///
/// Returns [`EventError::InvalidJson`] when the line is not a known envelope.
pub fn parse_input(line: &str) -> Result<HostInput, EventError> {
    Ok(serde_json::from_str(line)?)
}

// =============================================================================
// ROUTING
// =============================================================================

/// The manager operation an event maps to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Message(Message),
    DeleteMessage(String),
    PurgeUser(String),
    Ignore,
}

/// Map an event to its operation. Never fails; malformed events route to [`Route::Ignore`].
#[must_use]
pub fn route(received: &EventReceived) -> Route {
    let Some(event) = received.event.as_ref().filter(|e| !e.is_null()) else {
        return Route::Ignore;
    };

    // Alternate event family: anything carrying an item id renders as a message.
    let listener = if event.get("itemId").is_some() { MESSAGE_LISTENER } else { received.listener.as_str() };

    match listener {
        MESSAGE_LISTENER => match message_from_event(event) {
            Ok(message) => Route::Message(message),
            Err(err) => {
                debug!(%err, "message event ignored");
                Route::Ignore
            }
        },
        DELETE_MESSAGE_LISTENER => string_field(event, "msgId").map_or(Route::Ignore, Route::DeleteMessage),
        DELETE_MESSAGES_LISTENER => string_field(event, "userId").map_or(Route::Ignore, Route::PurgeUser),
        _ => Route::Ignore,
    }
}

/// Normalize `event.data` into a [`Message`].
///
/// # Errors
///
/// Returns [`EventError::MissingField`] when `data`, `userId` or `msgId` is absent.
pub fn message_from_event(event: &JsonValue) -> Result<Message, EventError> {
    let data = event.get("data").filter(|d| d.is_object()).ok_or(EventError::MissingField("data"))?;
    let user_id = string_field(data, "userId").ok_or(EventError::MissingField("userId"))?;
    let message_id = string_field(data, "msgId").ok_or(EventError::MissingField("msgId"))?;

    let text = match string_field(data, "renderedText") {
        Some(markup) => MessageText::Prepared(Raw::new(markup)),
        None => MessageText::Plain(string_field(data, "text").unwrap_or_default()),
    };

    Ok(Message {
        user_id,
        message_id,
        color: string_field(data, "displayColor").unwrap_or_default(),
        name: string_field(data, "displayName").unwrap_or_default(),
        text,
    })
}

/// Read a string field, accepting numeric ids as their decimal form.
fn string_field(value: &JsonValue, key: &str) -> Option<String> {
    match value.get(key)? {
        JsonValue::String(s) => Some(s.clone()),
        JsonValue::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

// =============================================================================
// APPLY
// =============================================================================

/// Perform the operation for one host input.
pub fn apply(manager: &mut BubbleManager, input: HostInput) {
    apply_at(manager, input, Instant::now());
}

/// [`apply`] with an explicit clock reading for dispatched bubbles.
pub fn apply_at(manager: &mut BubbleManager, input: HostInput, now: Instant) {
    match input {
        HostInput::EventReceived(received) => match route(&received) {
            Route::Message(message) => manager.dispatch_at(message, now),
            Route::DeleteMessage(message_id) => {
                manager.delete_message(&message_id);
            }
            Route::PurgeUser(user_id) => {
                manager.purge_user(&user_id);
            }
            Route::Ignore => debug!(listener = %received.listener, "event ignored"),
        },
        HostInput::WidgetLoad(load) => manager.reconfigure_style(load.field_data),
    }
}

#[cfg(test)]
#[path = "event_test.rs"]
mod tests;
