//! The seam between the chat client and whatever carries its events.
//!
//! `ChatClient` only ever talks to a [`Channel`]; production code hands it a
//! [`ChannelHandle`] feeding the socket task, tests hand it a recorder.

use tokio::sync::mpsc;

use super::types::{InboundEvent, OutboundEvent};
use crate::error::ClientError;
use crate::state::ConnectionStatus;

/// Outbound half of the real-time channel.
pub trait Channel {
    /// Queue an event for delivery. Fire-and-forget: success means the event
    /// was accepted for sending, not that the server received it.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::ChannelClosed`] when nothing will ever send it.
    fn emit(&self, event: OutboundEvent) -> Result<(), ClientError>;
}

impl<C: Channel + ?Sized> Channel for &C {
    fn emit(&self, event: OutboundEvent) -> Result<(), ClientError> {
        (**self).emit(event)
    }
}

/// Everything the transport reports back to the client, in delivery order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ChannelEvent {
    Status(ConnectionStatus),
    Inbound(InboundEvent),
}

/// Queue-backed [`Channel`] connected to the socket task.
#[derive(Clone, Debug)]
pub struct ChannelHandle {
    tx: mpsc::UnboundedSender<OutboundEvent>,
}

impl ChannelHandle {
    pub(crate) fn new(tx: mpsc::UnboundedSender<OutboundEvent>) -> Self {
        Self { tx }
    }
}

impl Channel for ChannelHandle {
    fn emit(&self, event: OutboundEvent) -> Result<(), ClientError> {
        self.tx.send(event).map_err(|_| ClientError::ChannelClosed)
    }
}
