//! Client-side chat state.
//!
//! DESIGN
//! ======
//! State is split by concern (`chat` log, `session` identity, `draft` input,
//! `connection` status) so the synchronizer and the renderer can depend on
//! small focused models. None of these types touch the network.

pub mod chat;
pub mod connection;
pub mod draft;
pub mod session;

pub use chat::{ChatEntry, ChatLog, ChatMessage, SystemNotice};
pub use connection::ConnectionStatus;
pub use draft::{Draft, MAX_MESSAGE_CHARS, MessageText};
pub use session::{MAX_USERNAME_CHARS, Session, SessionPhase, Username};

/// Longest prefix of `text` holding at most `max` characters.
pub(crate) fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((end, _)) => &text[..end],
        None => text,
    }
}
