//! Notice surface: the chat-style feed next to the shell.

use std::collections::VecDeque;

use script_client::ScriptRow;
use serde::Serialize;

use crate::app::SharedState;
use crate::config::app_config::Timing;
use crate::events::{self, TypingPayload};
use crate::player::{RowCompleted, RowTicket, Tick};

use super::type_out;

const MAX_ENTRIES: usize = 200;
const WELCOME: &str = "Welcome to the chat room!";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NoticeEntry {
    /// `None` for system messages.
    pub row_id: Option<i64>,
    pub author: Option<String>,
    pub text: String,
}

#[derive(Debug)]
pub struct NoticeFeed {
    entries: VecDeque<NoticeEntry>,
}

impl Default for NoticeFeed {
    fn default() -> Self {
        Self::new()
    }
}

impl NoticeFeed {
    pub fn new() -> Self {
        let mut feed = Self {
            entries: VecDeque::with_capacity(MAX_ENTRIES),
        };
        feed.push(NoticeEntry {
            row_id: None,
            author: None,
            text: WELCOME.to_string(),
        });
        feed
    }

    pub fn push(&mut self, entry: NoticeEntry) {
        if self.entries.len() >= MAX_ENTRIES {
            self.entries.pop_front();
        }
        self.entries.push_back(entry);
    }

    pub fn entries(&self) -> Vec<NoticeEntry> {
        self.entries.iter().cloned().collect()
    }
}

pub async fn play(
    state: &SharedState,
    row: &ScriptRow,
    mut ticket: RowTicket,
    timing: Timing,
) -> Option<RowCompleted> {
    let text = row.notice.as_deref().unwrap_or_default();
    let typed = type_out(&mut ticket, text, timing.typing_interval, |partial, done| {
        state.broadcast(
            events::NOTICE_TYPING,
            TypingPayload {
                row_id: row.id,
                text: partial,
                done,
            },
        );
    })
    .await;
    if !typed {
        return None;
    }

    let entry = NoticeEntry {
        row_id: Some(row.id),
        author: row.author.clone().filter(|a| !a.is_empty()),
        text: text.to_string(),
    };
    state.notices().push(entry.clone());
    state.broadcast(events::NOTICE, entry);

    match ticket.sleep(timing.notice_dwell).await {
        Tick::Cancelled => None,
        Tick::Elapsed | Tick::Skipped => Some(ticket.complete()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn feed_starts_with_welcome() {
        let feed = NoticeFeed::new();
        let entries = feed.entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].text, "Welcome to the chat room!");
        assert!(entries[0].row_id.is_none());
    }

    #[test]
    fn feed_drops_oldest_when_full() {
        let mut feed = NoticeFeed::new();
        for id in 0..MAX_ENTRIES as i64 {
            feed.push(NoticeEntry {
                row_id: Some(id),
                author: Some("sugu".into()),
                text: format!("notice {id}"),
            });
        }
        let entries = feed.entries();
        assert_eq!(entries.len(), MAX_ENTRIES);
        assert_eq!(entries[0].row_id, Some(0));
    }
}
