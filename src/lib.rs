//! Terminal client for a single-room real-time chat served over Socket.IO.
//!
//! The crate splits into plain client state (`state`), the synchronizer that
//! applies server events and validates user input (`sync`), the Socket.IO
//! transport (`net`), and line rendering (`render`). The binary in
//! `main.rs` wires them to stdin/stdout.

pub mod config;
pub mod error;
pub mod net;
pub mod render;
pub mod state;
pub mod sync;

pub use config::ClientConfig;
pub use error::ClientError;
pub use net::{Channel, ChannelEvent, ChannelHandle};
pub use sync::{Applied, ChatClient};
