//! Chat client state synchronizer.
//!
//! DESIGN
//! ======
//! `ChatClient` owns the local view of the room: session, log, draft, and
//! connection status. It is mutated through `&mut self` only, one event at a
//! time, so handlers never interleave. Outbound traffic goes through the
//! injected [`Channel`]; inbound traffic arrives as [`ChannelEvent`]s that
//! the front end feeds to [`ChatClient::apply`].
//!
//! Emission failures leave state untouched: a failed `join` keeps the session
//! unjoined and a failed send keeps the draft for another try.

#[cfg(test)]
#[path = "sync_test.rs"]
mod sync_test;

use crate::error::ClientError;
use crate::net::{Channel, ChannelEvent, InboundEvent, OutboundEvent};
use crate::state::{ChatLog, ConnectionStatus, Draft, MessageText, Session, SystemNotice, Username};

/// What [`ChatClient::apply`] changed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Applied {
    /// One entry was appended to the log.
    Appended,
    /// The log was replaced by a history snapshot of this many entries.
    Replaced(usize),
    /// The connection status changed.
    Status(ConnectionStatus),
    /// Nothing changed.
    Ignored,
}

impl Applied {
    /// True when the log changed and the view should follow the newest entry.
    #[must_use]
    pub fn log_changed(self) -> bool {
        matches!(self, Self::Appended | Self::Replaced(_))
    }
}

pub struct ChatClient<C: Channel> {
    channel: C,
    session: Session,
    log: ChatLog,
    draft: Draft,
    connection: ConnectionStatus,
}

impl<C: Channel> ChatClient<C> {
    pub fn new(channel: C) -> Self {
        Self {
            channel,
            session: Session::default(),
            log: ChatLog::default(),
            draft: Draft::default(),
            connection: ConnectionStatus::default(),
        }
    }

    /// Emit `join` for `raw_name` and move the session to pending.
    ///
    /// # Errors
    ///
    /// [`ClientError::AlreadyJoined`] after a previous join,
    /// [`ClientError::EmptyUsername`] for a blank name, or the channel's
    /// error when the emission fails. Nothing is emitted or changed on error.
    pub fn join(&mut self, raw_name: &str) -> Result<&Username, ClientError> {
        if let Some(existing) = self.session.username() {
            return Err(ClientError::AlreadyJoined(existing.to_string()));
        }
        let username = Username::parse(raw_name)?;
        self.channel.emit(OutboundEvent::Join(username.clone()))?;
        tracing::info!(username = %username, "join sent");
        self.session.begin_join(username)?;
        self.session.username().ok_or(ClientError::NotJoined)
    }

    pub fn draft_mut(&mut self) -> &mut Draft {
        &mut self.draft
    }

    pub fn set_draft(&mut self, text: &str) {
        self.draft.set(text);
    }

    /// Send the current draft and clear it.
    ///
    /// # Errors
    ///
    /// [`ClientError::NotJoined`] before joining, [`ClientError::EmptyMessage`]
    /// for a blank draft, or the channel's error. The draft is kept on error.
    pub fn send_draft(&mut self) -> Result<(), ClientError> {
        self.ensure_joined()?;
        let text = self.draft.prepare()?;
        self.emit_message(text)?;
        self.draft.clear();
        Ok(())
    }

    /// Send `text` directly, leaving the draft alone.
    ///
    /// # Errors
    ///
    /// Same as [`ChatClient::send_draft`].
    pub fn send_message(&mut self, text: &str) -> Result<(), ClientError> {
        self.ensure_joined()?;
        let text = MessageText::parse(text)?;
        self.emit_message(text)
    }

    /// Apply one event from the transport.
    pub fn apply(&mut self, event: ChannelEvent) -> Applied {
        match event {
            ChannelEvent::Status(status) => {
                if status == self.connection {
                    return Applied::Ignored;
                }
                tracing::debug!(?status, "connection status changed");
                self.connection = status;
                Applied::Status(status)
            }
            ChannelEvent::Inbound(inbound) => self.apply_inbound(inbound),
        }
    }

    fn apply_inbound(&mut self, inbound: InboundEvent) -> Applied {
        if !self.session.is_joined() {
            tracing::debug!(?inbound, "dropping event received before join");
            return Applied::Ignored;
        }

        match inbound {
            InboundEvent::History(messages) => {
                // Only the snapshot confirming our join seeds the log. After
                // that, entries are never removed.
                if !self.session.confirm() {
                    tracing::debug!(len = messages.len(), "ignoring history snapshot after join");
                    return Applied::Ignored;
                }
                tracing::info!("join confirmed by server");
                Applied::Replaced(self.log.replace_with_history(messages))
            }
            InboundEvent::Message(message) => {
                self.log.push_message(message);
                Applied::Appended
            }
            InboundEvent::UserJoined(name) => {
                self.log.push_notice(SystemNotice::joined(&name));
                Applied::Appended
            }
            InboundEvent::UserLeft(name) => {
                self.log.push_notice(SystemNotice::left(&name));
                Applied::Appended
            }
        }
    }

    fn ensure_joined(&self) -> Result<(), ClientError> {
        if self.session.is_joined() {
            Ok(())
        } else {
            Err(ClientError::NotJoined)
        }
    }

    fn emit_message(&self, text: MessageText) -> Result<(), ClientError> {
        let chars = text.as_str().chars().count();
        self.channel.emit(OutboundEvent::Message(text))?;
        tracing::debug!(chars, "message sent");
        Ok(())
    }

    #[must_use]
    pub fn log(&self) -> &ChatLog {
        &self.log
    }

    #[must_use]
    pub fn session(&self) -> &Session {
        &self.session
    }

    #[must_use]
    pub fn connection(&self) -> ConnectionStatus {
        self.connection
    }

    #[must_use]
    pub fn draft(&self) -> &Draft {
        &self.draft
    }

    #[must_use]
    pub fn channel(&self) -> &C {
        &self.channel
    }
}
