//! Typed chat events and their Socket.IO representation.
//!
//! Inbound payloads are parsed leniently the way a browser client would read
//! them: timestamps may be epoch milliseconds or ISO strings, join/leave
//! payloads may be `{ "username": .. }` or a bare string, and malformed
//! history rows are skipped rather than failing the whole snapshot.

#[cfg(test)]
#[path = "types_test.rs"]
mod types_test;

use frames::Packet;
use serde::Deserialize;
use serde_json::Value;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use crate::error::ClientError;
use crate::state::{ChatMessage, MessageText, Username};

pub const EVENT_HISTORY: &str = "history";
pub const EVENT_MESSAGE: &str = "message";
pub const EVENT_USER_JOINED: &str = "userJoined";
pub const EVENT_USER_LEFT: &str = "userLeft";
pub const EVENT_JOIN: &str = "join";

/// Events the server pushes to the client.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InboundEvent {
    History(Vec<ChatMessage>),
    Message(ChatMessage),
    UserJoined(String),
    UserLeft(String),
}

impl InboundEvent {
    /// Decode a Socket.IO event packet.
    ///
    /// `received_at` (epoch ms) stands in for a missing or unreadable
    /// message timestamp. Returns `Ok(None)` for event names this client does
    /// not handle.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Codec`] for a non-event packet and
    /// [`ClientError::Payload`] when a known event carries the wrong shape.
    pub fn from_packet(packet: &Packet, received_at: i64) -> Result<Option<Self>, ClientError> {
        let (name, args) = packet.event_parts()?;
        let payload = args.first().unwrap_or(&Value::Null);

        let event = match name {
            EVENT_HISTORY => {
                let rows = match payload {
                    Value::Array(rows) => rows,
                    other => return Err(shape_error(EVENT_HISTORY, other)),
                };
                let messages = rows
                    .iter()
                    .filter_map(|row| {
                        let parsed = parse_message(row, received_at);
                        if parsed.is_none() {
                            tracing::debug!(%row, "skipping malformed history row");
                        }
                        parsed
                    })
                    .collect();
                Self::History(messages)
            }
            EVENT_MESSAGE => match parse_message(payload, received_at) {
                Some(message) => Self::Message(message),
                None => return Err(shape_error(EVENT_MESSAGE, payload)),
            },
            EVENT_USER_JOINED => match parse_username(payload) {
                Some(name) => Self::UserJoined(name),
                None => return Err(shape_error(EVENT_USER_JOINED, payload)),
            },
            EVENT_USER_LEFT => match parse_username(payload) {
                Some(name) => Self::UserLeft(name),
                None => return Err(shape_error(EVENT_USER_LEFT, payload)),
            },
            _ => return Ok(None),
        };
        Ok(Some(event))
    }
}

/// Events the client sends to the server.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OutboundEvent {
    Join(Username),
    Message(MessageText),
}

impl OutboundEvent {
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Join(_) => EVENT_JOIN,
            Self::Message(_) => EVENT_MESSAGE,
        }
    }

    /// The single string argument carried by the event.
    #[must_use]
    pub fn payload(&self) -> &str {
        match self {
            Self::Join(name) => name.as_str(),
            Self::Message(text) => text.as_str(),
        }
    }

    #[must_use]
    pub fn to_packet(&self) -> Packet {
        Packet::event(self.name(), vec![Value::String(self.payload().to_owned())])
    }
}

fn shape_error(event: &'static str, payload: &Value) -> ClientError {
    ClientError::Payload { event, payload: payload.to_string() }
}

/// Wire shape of a chat message. `timestamp` is read leniently.
#[derive(Deserialize)]
struct WireMessage {
    username: String,
    text: String,
    #[serde(default)]
    timestamp: Value,
}

/// Join/leave payload: `{ "username": .. }` or a bare string.
#[derive(Deserialize)]
#[serde(untagged)]
enum WirePresence {
    Object { username: String },
    Bare(String),
}

fn parse_message(value: &Value, received_at: i64) -> Option<ChatMessage> {
    let Ok(wire) = WireMessage::deserialize(value) else {
        return None;
    };
    let timestamp = timestamp_millis(&wire.timestamp).unwrap_or(received_at);
    Some(ChatMessage::new(wire.username, wire.text, timestamp))
}

fn parse_username(value: &Value) -> Option<String> {
    match WirePresence::deserialize(value) {
        Ok(WirePresence::Object { username } | WirePresence::Bare(username)) => Some(username),
        Err(_) => None,
    }
}

/// Read a timestamp as epoch milliseconds.
///
/// Accepts integer or float milliseconds, numeric strings, and RFC 3339
/// strings such as `2024-05-01T12:30:00.000Z`.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn timestamp_millis(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f as i64)),
        Value::String(s) => {
            let s = s.trim();
            if let Ok(ms) = s.parse::<i64>() {
                return Some(ms);
            }
            match OffsetDateTime::parse(s, &Rfc3339) {
                Ok(at) => match i64::try_from(at.unix_timestamp_nanos() / 1_000_000) {
                    Ok(ms) => Some(ms),
                    Err(_) => None,
                },
                Err(_) => None,
            }
        }
        _ => None,
    }
}
