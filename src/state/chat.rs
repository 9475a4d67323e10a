#[cfg(test)]
#[path = "chat_test.rs"]
mod chat_test;

/// A chat message as displayed in the log.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChatMessage {
    pub username: String,
    pub text: String,
    /// Milliseconds since the Unix epoch.
    pub timestamp: i64,
}

impl ChatMessage {
    #[must_use]
    pub fn new(username: impl Into<String>, text: impl Into<String>, timestamp: i64) -> Self {
        Self { username: username.into(), text: text.into(), timestamp }
    }
}

/// A locally generated notice such as "bob joined the chat".
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SystemNotice {
    pub text: String,
}

impl SystemNotice {
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    #[must_use]
    pub fn joined(username: &str) -> Self {
        Self::new(format!("{username} joined the chat"))
    }

    #[must_use]
    pub fn left(username: &str) -> Self {
        Self::new(format!("{username} left the chat"))
    }
}

/// One displayed unit of chat content.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ChatEntry {
    Message(ChatMessage),
    Notice(SystemNotice),
}

impl ChatEntry {
    #[must_use]
    pub fn text(&self) -> &str {
        match self {
            Self::Message(m) => &m.text,
            Self::Notice(n) => &n.text,
        }
    }

    #[must_use]
    pub fn is_notice(&self) -> bool {
        matches!(self, Self::Notice(_))
    }
}

/// Ordered chat log. Insertion order is display order.
///
/// Entries are only ever appended; existing entries are never edited or
/// reordered. The single exception is [`ChatLog::replace_with_history`],
/// which swaps in the server's history snapshot when joining.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ChatLog {
    entries: Vec<ChatEntry>,
}

impl ChatLog {
    #[must_use]
    pub fn entries(&self) -> &[ChatEntry] {
        &self.entries
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn last(&self) -> Option<&ChatEntry> {
        self.entries.last()
    }

    pub fn push(&mut self, entry: ChatEntry) {
        self.entries.push(entry);
    }

    pub fn push_message(&mut self, message: ChatMessage) {
        self.push(ChatEntry::Message(message));
    }

    pub fn push_notice(&mut self, notice: SystemNotice) {
        self.push(ChatEntry::Notice(notice));
    }

    /// Replace the whole log with a history snapshot. Returns the new length.
    pub fn replace_with_history(&mut self, history: Vec<ChatMessage>) -> usize {
        self.entries = history.into_iter().map(ChatEntry::Message).collect();
        self.entries.len()
    }
}
