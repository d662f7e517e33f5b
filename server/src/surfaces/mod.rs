//! Presentation surfaces. Each row is shown by exactly one of them.

pub mod notice;
pub mod psql;
pub mod shell;
pub mod table_groups;

use std::time::Duration;

use script_client::ScriptRow;

use crate::app::SharedState;
use crate::config::app_config::Timing;
use crate::player::{RowCompleted, RowTicket, Tick};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowKind {
    Query,
    Notice,
    /// Nothing to display; completes right away.
    Empty,
}

fn has_text(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|v| !v.trim().is_empty())
}

/// Route by the row's `type`, falling back to whichever column has content.
pub fn classify(row: &ScriptRow) -> RowKind {
    let kind = row.kind.as_deref().map(|k| k.trim().to_ascii_lowercase());
    match kind.as_deref() {
        Some("query") if has_text(&row.query) => RowKind::Query,
        Some("notice" | "chat") if has_text(&row.notice) => RowKind::Notice,
        Some("query" | "notice" | "chat") => RowKind::Empty,
        _ if has_text(&row.query) => RowKind::Query,
        _ if has_text(&row.notice) => RowKind::Notice,
        _ => RowKind::Empty,
    }
}

/// Reveal `text` one character per `interval`.
///
/// `emit` gets every prefix and finally the whole text with `done = true`.
/// A skip jumps straight to the whole text. Returns false if the row was
/// cancelled, in which case the final emit never happens.
pub async fn type_out(
    ticket: &mut RowTicket,
    text: &str,
    interval: Duration,
    mut emit: impl FnMut(&str, bool),
) -> bool {
    let ends = text.char_indices().map(|(i, c)| i + c.len_utf8());
    for end in ends {
        if ticket.skipped() {
            break;
        }
        emit(&text[..end], false);
        match ticket.sleep(interval).await {
            Tick::Elapsed => {}
            Tick::Skipped => break,
            Tick::Cancelled => return false,
        }
    }
    if ticket.is_cancelled() {
        return false;
    }
    emit(text, true);
    true
}

/// Play one row on its surface. `None` means the row was cancelled.
pub async fn play_row(
    state: &SharedState,
    row: &ScriptRow,
    ticket: RowTicket,
    timing: Timing,
) -> Option<RowCompleted> {
    let kind = classify(row);
    tracing::debug!(row_id = row.id, ?kind, "Playing row");
    match kind {
        RowKind::Query => shell::play(state, row, ticket, timing).await,
        RowKind::Notice => notice::play(state, row, ticket, timing).await,
        RowKind::Empty => complete_when_running(ticket).await,
    }
}

/// Complete a row that shows nothing, holding it back while playback is paused.
async fn complete_when_running(mut ticket: RowTicket) -> Option<RowCompleted> {
    match ticket.sleep(Duration::ZERO).await {
        Tick::Cancelled => None,
        Tick::Elapsed | Tick::Skipped => Some(ticket.complete()),
    }
}
