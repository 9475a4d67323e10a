#[cfg(test)]
#[path = "render_test.rs"]
mod render_test;

use std::ops::Range;

use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use time::{OffsetDateTime, UtcOffset};

use crate::state::{ChatEntry, ChatLog, ConnectionStatus};

const CLOCK: &[BorrowedFormatItem<'static>] = format_description!("[hour]:[minute]:[second]");
const UNKNOWN_TIME: &str = "--:--:--";

/// The terminal's UTC offset, or UTC when it cannot be determined.
///
/// Must run before any other thread is spawned; `time` refuses to read the
/// local offset from a multi-threaded process on most Unix targets.
#[must_use]
pub fn local_offset() -> UtcOffset {
    UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC)
}

/// Epoch milliseconds as `HH:MM:SS` at `offset`.
#[must_use]
pub fn format_time(timestamp_ms: i64, offset: UtcOffset) -> String {
    let nanos = i128::from(timestamp_ms) * 1_000_000;
    let Ok(at) = OffsetDateTime::from_unix_timestamp_nanos(nanos) else {
        return UNKNOWN_TIME.to_owned();
    };
    let Some(local) = at.checked_to_offset(offset) else {
        return UNKNOWN_TIME.to_owned();
    };
    local.format(CLOCK).unwrap_or_else(|_| UNKNOWN_TIME.to_owned())
}

#[must_use]
pub fn render_entry(entry: &ChatEntry, offset: UtcOffset) -> String {
    match entry {
        ChatEntry::Message(m) => format!("{}: {}  {}", m.username, m.text, format_time(m.timestamp, offset)),
        ChatEntry::Notice(n) => format!("* {}", n.text),
    }
}

#[must_use]
pub fn render_status(status: ConnectionStatus) -> String {
    match status {
        ConnectionStatus::Connected => "-- connected --".to_owned(),
        ConnectionStatus::Disconnected => "-- disconnected --".to_owned(),
        ConnectionStatus::Connecting => "-- connecting --".to_owned(),
        ConnectionStatus::Reconnecting { attempt } => format!("-- reconnecting (attempt {attempt}) --"),
    }
}

/// A window of `height` entries starting at `offset`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Viewport {
    pub height: usize,
    pub offset: usize,
}

impl Viewport {
    #[must_use]
    pub fn new(height: usize) -> Self {
        Self { height: height.max(1), offset: 0 }
    }

    /// Pin the window to the newest entry of a log holding `len` entries.
    pub fn follow(&mut self, len: usize) {
        self.offset = len.saturating_sub(self.height);
    }

    /// Indices of the entries inside the window.
    #[must_use]
    pub fn visible(&self, len: usize) -> Range<usize> {
        let start = self.offset.min(len);
        let end = self.offset.saturating_add(self.height).min(len);
        start..end
    }
}

/// Lines for the entries inside `viewport`, oldest first.
#[must_use]
pub fn render_log(log: &ChatLog, viewport: Viewport, offset: UtcOffset) -> Vec<String> {
    log.entries()[viewport.visible(log.len())]
        .iter()
        .map(|entry| render_entry(entry, offset))
        .collect()
}
