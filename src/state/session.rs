#[cfg(test)]
#[path = "session_test.rs"]
mod session_test;

use std::fmt;

use super::truncate_chars;
use crate::error::ClientError;

pub const MAX_USERNAME_CHARS: usize = 20;

/// Display name: trimmed, non-empty, at most 20 characters.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Username(String);

impl Username {
    /// Trim, reject empty, and cut to [`MAX_USERNAME_CHARS`].
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::EmptyUsername`] when nothing is left after trimming.
    pub fn parse(raw: &str) -> Result<Self, ClientError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ClientError::EmptyUsername);
        }
        // Cutting can expose trailing whitespace that was inside the name.
        let cut = truncate_chars(trimmed, MAX_USERNAME_CHARS).trim_end();
        Ok(Self(cut.to_owned()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Join progress. `Pending` means `join` was emitted but the server has not
/// yet answered with history.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SessionPhase {
    #[default]
    Unjoined,
    Pending,
    Joined,
}

/// The local user's identity and join status.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Session {
    username: Option<Username>,
    phase: SessionPhase,
}

impl Session {
    #[must_use]
    pub fn username(&self) -> Option<&Username> {
        self.username.as_ref()
    }

    #[must_use]
    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    /// True from the moment `join` is emitted (the UI switches to the chat view).
    #[must_use]
    pub fn is_joined(&self) -> bool {
        self.phase != SessionPhase::Unjoined
    }

    /// True once the server answered the join.
    #[must_use]
    pub fn is_confirmed(&self) -> bool {
        self.phase == SessionPhase::Joined
    }

    /// `Unjoined -> Pending`. The username is fixed from here on.
    pub(crate) fn begin_join(&mut self, username: Username) -> Result<(), ClientError> {
        if let Some(existing) = &self.username {
            return Err(ClientError::AlreadyJoined(existing.to_string()));
        }
        self.username = Some(username);
        self.phase = SessionPhase::Pending;
        Ok(())
    }

    /// `Pending -> Joined`. Returns whether the phase changed.
    pub(crate) fn confirm(&mut self) -> bool {
        if self.phase == SessionPhase::Pending {
            self.phase = SessionPhase::Joined;
            return true;
        }
        false
    }
}
