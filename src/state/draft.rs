#[cfg(test)]
#[path = "draft_test.rs"]
mod draft_test;

use super::truncate_chars;
use crate::error::ClientError;

pub const MAX_MESSAGE_CHARS: usize = 500;

/// Outbound message text: trimmed, non-empty, at most 500 characters.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MessageText(String);

impl MessageText {
    /// # Errors
    ///
    /// Returns [`ClientError::EmptyMessage`] when nothing is left after trimming.
    pub fn parse(raw: &str) -> Result<Self, ClientError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ClientError::EmptyMessage);
        }
        let cut = truncate_chars(trimmed, MAX_MESSAGE_CHARS).trim_end();
        Ok(Self(cut.to_owned()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn into_string(self) -> String {
        self.0
    }
}

/// The message being composed. Never holds more than 500 characters.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Draft {
    text: String,
}

impl Draft {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }

    pub fn set(&mut self, text: &str) {
        self.text = truncate_chars(text, MAX_MESSAGE_CHARS).to_owned();
    }

    /// Append input, dropping whatever does not fit.
    pub fn push_str(&mut self, text: &str) {
        let room = MAX_MESSAGE_CHARS.saturating_sub(self.text.chars().count());
        self.text.push_str(truncate_chars(text, room));
    }

    pub fn clear(&mut self) {
        self.text.clear();
    }

    /// Validate the current contents without clearing them.
    pub(crate) fn prepare(&self) -> Result<MessageText, ClientError> {
        MessageText::parse(&self.text)
    }
}
