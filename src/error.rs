//! Client error taxonomy.
//!
//! Validation and state-machine errors leave the client untouched so the
//! caller can report them and carry on. Transport errors end one connection
//! attempt; the socket loop decides whether to retry.

/// Errors surfaced by the chat client and its transport.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("username is empty")]
    EmptyUsername,
    #[error("message is empty")]
    EmptyMessage,
    #[error("already joined as {0}")]
    AlreadyJoined(String),
    #[error("join the chat before sending messages")]
    NotJoined,
    #[error("channel closed; the connection task has stopped")]
    ChannelClosed,
    #[error("invalid endpoint url: {0}")]
    InvalidUrl(String),
    #[error("websocket connect failed: {0}")]
    WsConnect(Box<tokio_tungstenite::tungstenite::Error>),
    #[error("websocket closed")]
    WsClosed,
    #[error("timed out waiting for the server")]
    Timeout,
    #[error("handshake failed: {0}")]
    Handshake(String),
    #[error("frame decode failed: {0}")]
    Codec(#[from] frames::CodecError),
    #[error("unexpected `{event}` payload: {payload}")]
    Payload { event: &'static str, payload: String },
    #[error("invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error("invalid configuration: {0}")]
    Config(String),
    #[error("terminal i/o failed: {0}")]
    Io(#[from] std::io::Error),
}

impl From<tokio_tungstenite::tungstenite::Error> for ClientError {
    fn from(error: tokio_tungstenite::tungstenite::Error) -> Self {
        Self::WsConnect(Box::new(error))
    }
}
