//! Shell surface: a psql session transcript.

use std::collections::VecDeque;

use script_client::ScriptRow;
use serde::Serialize;

use crate::app::SharedState;
use crate::config::app_config::Timing;
use crate::events::{self, TypingPayload};
use crate::player::{RowCompleted, RowTicket, Tick};

use super::type_out;

pub const PROMPT: &str = "postgres=# ";
const MAX_LINES: usize = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LineKind {
    Command,
    Result,
    Info,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HistoryItem {
    #[serde(rename = "type")]
    pub kind: LineKind,
    pub content: String,
}

/// Bounded transcript; the oldest lines fall off first.
#[derive(Debug)]
pub struct ShellTranscript {
    lines: VecDeque<HistoryItem>,
}

impl Default for ShellTranscript {
    fn default() -> Self {
        Self::new()
    }
}

impl ShellTranscript {
    pub fn new() -> Self {
        let mut transcript = Self {
            lines: VecDeque::with_capacity(MAX_LINES),
        };
        transcript.push(LineKind::Info, "psql (15.3)");
        transcript.push(LineKind::Info, "Type \"help\" for help.");
        transcript.push(LineKind::Info, "");
        transcript
    }

    pub fn push(&mut self, kind: LineKind, content: impl Into<String>) -> HistoryItem {
        if self.lines.len() >= MAX_LINES {
            self.lines.pop_front();
        }
        let item = HistoryItem {
            kind,
            content: content.into(),
        };
        self.lines.push_back(item.clone());
        item
    }

    pub fn lines(&self) -> Vec<HistoryItem> {
        self.lines.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// Append a line to the shared transcript and broadcast it.
pub fn append_line(state: &SharedState, kind: LineKind, content: impl Into<String>) {
    let item = state.shell().push(kind, content);
    state.broadcast(events::SHELL_LINE, item);
}

/// Type the query at the prompt, print its response, then dwell.
pub async fn play(
    state: &SharedState,
    row: &ScriptRow,
    mut ticket: RowTicket,
    timing: Timing,
) -> Option<RowCompleted> {
    let query = row.query.as_deref().unwrap_or_default();
    let typed = type_out(&mut ticket, query, timing.typing_interval, |text, done| {
        state.broadcast(
            events::SHELL_TYPING,
            TypingPayload {
                row_id: row.id,
                text,
                done,
            },
        );
    })
    .await;
    if !typed {
        return None;
    }

    append_line(state, LineKind::Command, format!("{PROMPT}{query}"));
    if let Some(response) = row.response.as_deref().filter(|r| !r.is_empty()) {
        append_line(state, LineKind::Result, response);
    }

    match ticket.sleep(timing.query_dwell).await {
        Tick::Cancelled => None,
        Tick::Elapsed | Tick::Skipped => Some(ticket.complete()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transcript_starts_with_banner() {
        let t = ShellTranscript::new();
        let contents: Vec<_> = t.lines().into_iter().map(|l| l.content).collect();
        assert_eq!(contents, ["psql (15.3)", "Type \"help\" for help.", ""]);
        assert!(t.lines().iter().all(|l| l.kind == LineKind::Info));
    }

    #[test]
    fn transcript_is_bounded() {
        let mut t = ShellTranscript::new();
        for i in 0..(MAX_LINES + 10) {
            t.push(LineKind::Command, format!("{PROMPT}SELECT {i}"));
        }
        assert_eq!(t.len(), MAX_LINES);
        assert_eq!(
            t.lines().last().unwrap().content,
            format!("{PROMPT}SELECT {}", MAX_LINES + 9)
        );
    }

    #[test]
    fn history_item_uses_type_key() {
        let item = HistoryItem {
            kind: LineKind::Result,
            content: "1".into(),
        };
        let value = serde_json::to_value(item).unwrap();
        assert_eq!(value["type"], "result");
    }
}
