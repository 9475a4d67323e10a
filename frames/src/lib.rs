//! Engine.IO v4 / Socket.IO v5 frame model and text codec.
//!
//! A WebSocket text message carries exactly one Engine.IO packet. Engine.IO
//! `message` packets in turn carry one Socket.IO packet, which is where named
//! events live. Binary attachments are not supported; the chat protocol only
//! exchanges JSON.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Namespace every packet belongs to unless it says otherwise.
pub const DEFAULT_NAMESPACE: &str = "/";

/// Error returned by [`decode_frame`] and [`decode_packet`].
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// The text message had no packet type character.
    #[error("empty packet")]
    Empty,
    /// The leading Engine.IO type character is not in `0..=6`.
    #[error("unknown engine.io packet type: {0:?}")]
    UnknownFrameType(char),
    /// The leading Socket.IO type character is not in `0..=6`.
    #[error("unknown socket.io packet type: {0:?}")]
    UnknownPacketType(char),
    /// The ack id digits overflow a `u64`.
    #[error("invalid ack id: {0}")]
    InvalidAckId(String),
    /// An event packet whose payload is not `["name", ...args]`.
    #[error("malformed event payload: {0}")]
    MalformedEvent(&'static str),
    /// Binary event/ack packets need attachment frames, which are not handled.
    #[error("binary socket.io packets are not supported")]
    BinaryUnsupported,
    /// The JSON portion of a packet failed to parse.
    #[error("invalid packet json: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

/// Handshake payload of the Engine.IO `open` packet.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Handshake {
    pub sid: String,
    #[serde(default)]
    pub upgrades: Vec<String>,
    /// Milliseconds between server pings.
    pub ping_interval: u64,
    /// Milliseconds the server waits for a pong.
    pub ping_timeout: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_payload: Option<u64>,
}

/// A single Engine.IO packet, i.e. one WebSocket text message.
#[derive(Clone, Debug, PartialEq)]
pub enum Frame {
    Open(Handshake),
    Close,
    Ping(Option<String>),
    Pong(Option<String>),
    Message(Packet),
    Upgrade,
    Noop,
}

impl Frame {
    fn type_char(&self) -> char {
        match self {
            Self::Open(_) => '0',
            Self::Close => '1',
            Self::Ping(_) => '2',
            Self::Pong(_) => '3',
            Self::Message(_) => '4',
            Self::Upgrade => '5',
            Self::Noop => '6',
        }
    }
}

/// Socket.IO packet type.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PacketKind {
    Connect,
    Disconnect,
    Event,
    Ack,
    ConnectError,
}

impl PacketKind {
    fn as_char(self) -> char {
        match self {
            Self::Connect => '0',
            Self::Disconnect => '1',
            Self::Event => '2',
            Self::Ack => '3',
            Self::ConnectError => '4',
        }
    }

    fn from_char(c: char) -> Result<Self, CodecError> {
        match c {
            '0' => Ok(Self::Connect),
            '1' => Ok(Self::Disconnect),
            '2' => Ok(Self::Event),
            '3' => Ok(Self::Ack),
            '4' => Ok(Self::ConnectError),
            '5' | '6' => Err(CodecError::BinaryUnsupported),
            other => Err(CodecError::UnknownPacketType(other)),
        }
    }
}

/// A Socket.IO packet carried inside an Engine.IO `message`.
#[derive(Clone, Debug, PartialEq)]
pub struct Packet {
    pub kind: PacketKind,
    pub namespace: String,
    pub ack_id: Option<u64>,
    pub data: Option<Value>,
}

impl Packet {
    /// Connect request for the default namespace.
    #[must_use]
    pub fn connect() -> Self {
        Self { kind: PacketKind::Connect, namespace: DEFAULT_NAMESPACE.to_owned(), ack_id: None, data: None }
    }

    /// Disconnect notice for the default namespace.
    #[must_use]
    pub fn disconnect() -> Self {
        Self { kind: PacketKind::Disconnect, namespace: DEFAULT_NAMESPACE.to_owned(), ack_id: None, data: None }
    }

    /// Named event on the default namespace.
    #[must_use]
    pub fn event(name: &str, args: Vec<Value>) -> Self {
        let mut items = Vec::with_capacity(args.len() + 1);
        items.push(Value::String(name.to_owned()));
        items.extend(args);
        Self {
            kind: PacketKind::Event,
            namespace: DEFAULT_NAMESPACE.to_owned(),
            ack_id: None,
            data: Some(Value::Array(items)),
        }
    }

    /// Split an event packet into its name and arguments.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::MalformedEvent`] when the packet is not an event
    /// or its payload is not a non-empty array headed by a string.
    pub fn event_parts(&self) -> Result<(&str, &[Value]), CodecError> {
        if self.kind != PacketKind::Event {
            return Err(CodecError::MalformedEvent("not an event packet"));
        }
        split_event(self.data.as_ref())
    }
}

fn split_event(data: Option<&Value>) -> Result<(&str, &[Value]), CodecError> {
    let Some(Value::Array(items)) = data else {
        return Err(CodecError::MalformedEvent("payload is not an array"));
    };
    let Some((head, args)) = items.split_first() else {
        return Err(CodecError::MalformedEvent("payload is empty"));
    };
    let Some(name) = head.as_str() else {
        return Err(CodecError::MalformedEvent("event name is not a string"));
    };
    Ok((name, args))
}

/// Encode a frame into the text sent over the WebSocket.
///
/// # Panics
///
/// Never panics; serializing a `Handshake` or `serde_json::Value` cannot fail.
#[must_use]
pub fn encode_frame(frame: &Frame) -> String {
    let mut out = String::new();
    out.push(frame.type_char());
    match frame {
        Frame::Open(handshake) => {
            out.push_str(&serde_json::to_string(handshake).unwrap_or_default());
        }
        Frame::Ping(Some(payload)) | Frame::Pong(Some(payload)) => out.push_str(payload),
        Frame::Message(packet) => out.push_str(&encode_packet(packet)),
        Frame::Close | Frame::Ping(None) | Frame::Pong(None) | Frame::Upgrade | Frame::Noop => {}
    }
    out
}

/// Decode one WebSocket text message into a frame.
///
/// # Errors
///
/// Returns [`CodecError::Empty`] for empty text, [`CodecError::UnknownFrameType`]
/// for an unrecognised leading character, and any error from [`decode_packet`]
/// for `message` frames.
pub fn decode_frame(text: &str) -> Result<Frame, CodecError> {
    let mut chars = text.chars();
    let Some(kind) = chars.next() else {
        return Err(CodecError::Empty);
    };
    let rest = chars.as_str();

    let payload = || if rest.is_empty() { None } else { Some(rest.to_owned()) };

    match kind {
        '0' => Ok(Frame::Open(serde_json::from_str(rest)?)),
        '1' => Ok(Frame::Close),
        '2' => Ok(Frame::Ping(payload())),
        '3' => Ok(Frame::Pong(payload())),
        '4' => Ok(Frame::Message(decode_packet(rest)?)),
        '5' => Ok(Frame::Upgrade),
        '6' => Ok(Frame::Noop),
        other => Err(CodecError::UnknownFrameType(other)),
    }
}

/// Encode a Socket.IO packet (without the Engine.IO `4` prefix).
#[must_use]
pub fn encode_packet(packet: &Packet) -> String {
    let mut out = String::new();
    out.push(packet.kind.as_char());
    if packet.namespace != DEFAULT_NAMESPACE && !packet.namespace.is_empty() {
        out.push_str(&packet.namespace);
        out.push(',');
    }
    if let Some(id) = packet.ack_id {
        out.push_str(&id.to_string());
    }
    if let Some(data) = &packet.data {
        out.push_str(&data.to_string());
    }
    out
}

/// Decode a Socket.IO packet (the text after the Engine.IO `4` prefix).
///
/// # Errors
///
/// Returns [`CodecError::Empty`], [`CodecError::UnknownPacketType`],
/// [`CodecError::BinaryUnsupported`], [`CodecError::InvalidAckId`],
/// [`CodecError::InvalidJson`], or [`CodecError::MalformedEvent`] when an
/// event payload is not `["name", ...]`.
pub fn decode_packet(text: &str) -> Result<Packet, CodecError> {
    let mut chars = text.chars();
    let Some(kind) = chars.next() else {
        return Err(CodecError::Empty);
    };
    let kind = PacketKind::from_char(kind)?;
    let mut rest = chars.as_str();

    let mut namespace = DEFAULT_NAMESPACE.to_owned();
    if rest.starts_with('/') {
        match rest.find(',') {
            Some(end) => {
                namespace = rest[..end].to_owned();
                rest = &rest[end + 1..];
            }
            None => {
                namespace = rest.to_owned();
                rest = "";
            }
        }
    }

    let digits = rest.chars().take_while(char::is_ascii_digit).count();
    let ack_id = if digits > 0 {
        let raw = &rest[..digits];
        let id = raw
            .parse::<u64>()
            .map_err(|_| CodecError::InvalidAckId(raw.to_owned()))?;
        rest = &rest[digits..];
        Some(id)
    } else {
        None
    };

    let data = if rest.is_empty() { None } else { Some(serde_json::from_str::<Value>(rest)?) };

    if kind == PacketKind::Event {
        split_event(data.as_ref())?;
    }

    Ok(Packet { kind, namespace, ack_id, data })
}

#[cfg(test)]
#[path = "lib_test.rs"]
mod tests;
