//! Sequence player state machine.
//!
//! Pure state: no timers, no I/O. The conductor drives it and the
//! surfaces report completions back through [`super::timers::RowCompleted`].

use std::sync::Arc;

use serde::Serialize;
use script_client::ScriptRow;
use table_groups::{ApplyReport, TableGroupRegistry};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PlayerState {
    Idle,
    Loading,
    Active,
    Paused,
    Finished,
}

/// Result of reporting a row as complete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Completion {
    /// The row was not the current one (already processed or superseded).
    Stale,
    Advanced(ApplyReport),
    Finished(ApplyReport),
}

impl Completion {
    pub fn report(&self) -> Option<&ApplyReport> {
        match self {
            Self::Stale => None,
            Self::Advanced(r) | Self::Finished(r) => Some(r),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerSnapshot {
    pub state: PlayerState,
    pub current_row_index: usize,
    pub total_rows: usize,
    pub is_active: bool,
    pub is_paused: bool,
    pub current_row: Option<ScriptRow>,
}

#[derive(Debug)]
pub struct SequencePlayer {
    rows: Arc<[ScriptRow]>,
    index: usize,
    state: PlayerState,
}

impl Default for SequencePlayer {
    fn default() -> Self {
        Self::new()
    }
}

impl SequencePlayer {
    pub fn new() -> Self {
        Self {
            rows: Arc::from(Vec::new()),
            index: 0,
            state: PlayerState::Idle,
        }
    }

    pub fn state(&self) -> PlayerState {
        self.state
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn total_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn is_active(&self) -> bool {
        matches!(self.state, PlayerState::Active | PlayerState::Paused)
    }

    pub fn is_paused(&self) -> bool {
        self.state == PlayerState::Paused
    }

    /// Drop the current rows and wait for a fresh load. This is the only way `index` goes back.
    pub fn begin_loading(&mut self) {
        self.rows = Arc::from(Vec::new());
        self.index = 0;
        self.state = PlayerState::Loading;
    }

    /// Install fetched rows. With no rows the player never activates.
    pub fn load(&mut self, rows: Arc<[ScriptRow]>) {
        self.index = 0;
        self.state = if rows.is_empty() {
            PlayerState::Idle
        } else {
            PlayerState::Active
        };
        self.rows = rows;
    }

    pub fn current_row(&self) -> Option<&ScriptRow> {
        if !self.is_active() {
            return None;
        }
        self.rows.get(self.index)
    }

    /// Apply the current row's `added` tokens and move on.
    ///
    /// `row_id` must name the current row; anything else is a duplicate or
    /// late completion and is ignored.
    pub fn on_row_complete(&mut self, row_id: i64, registry: &mut TableGroupRegistry) -> Completion {
        let Some(row) = self.current_row() else {
            return Completion::Stale;
        };
        if row.id != row_id {
            return Completion::Stale;
        }

        let report = if row.added.is_empty() {
            ApplyReport::default()
        } else {
            registry.process_added_items(&row.added)
        };

        self.index += 1;
        if self.index >= self.rows.len() {
            self.state = PlayerState::Finished;
            Completion::Finished(report)
        } else {
            Completion::Advanced(report)
        }
    }

    /// Flip between Active and Paused. Other states are left alone.
    pub fn toggle_pause(&mut self) -> PlayerState {
        self.state = match self.state {
            PlayerState::Active => PlayerState::Paused,
            PlayerState::Paused => PlayerState::Active,
            other => other,
        };
        self.state
    }

    pub fn snapshot(&self) -> PlayerSnapshot {
        PlayerSnapshot {
            state: self.state,
            current_row_index: self.index,
            total_rows: self.rows.len(),
            is_active: self.is_active(),
            is_paused: self.is_paused(),
            current_row: self.current_row().cloned(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn row(id: i64, added: &[&str]) -> ScriptRow {
        ScriptRow {
            id,
            created_at: Utc::now(),
            kind: Some("query".into()),
            author: None,
            query: Some(format!("SELECT {id}")),
            response: Some("ok".into()),
            notice: None,
            added: added.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn rows(n: i64) -> Arc<[ScriptRow]> {
        (1..=n).map(|id| row(id, &[])).collect::<Vec<_>>().into()
    }

    #[test]
    fn starts_idle_with_nothing_to_show() {
        let player = SequencePlayer::new();
        assert_eq!(player.state(), PlayerState::Idle);
        assert!(player.current_row().is_none());
    }

    #[test]
    fn empty_load_never_activates() {
        let mut player = SequencePlayer::new();
        let mut registry = TableGroupRegistry::with_seed(1);
        player.begin_loading();
        assert_eq!(player.state(), PlayerState::Loading);
        player.load(rows(0));
        assert_eq!(player.state(), PlayerState::Idle);
        assert!(player.current_row().is_none());
        assert_eq!(player.on_row_complete(1, &mut registry), Completion::Stale);
        assert_eq!(player.toggle_pause(), PlayerState::Idle);
    }

    #[test]
    fn n_completions_advance_n_times_then_finish() {
        let mut player = SequencePlayer::new();
        let mut registry = TableGroupRegistry::with_seed(1);
        player.load(rows(4));

        let mut advances = 0;
        let mut last_index = player.index();
        while let Some(current) = player.current_row().map(|r| r.id) {
            let completion = player.on_row_complete(current, &mut registry);
            assert_ne!(completion, Completion::Stale);
            advances += 1;
            assert!(player.index() > last_index);
            assert!(player.index() <= player.total_rows());
            last_index = player.index();
        }

        assert_eq!(advances, 4);
        assert_eq!(player.state(), PlayerState::Finished);
        assert_eq!(player.index(), 4);
        assert!(!player.is_active());
    }

    #[test]
    fn duplicate_completion_is_ignored() {
        let mut player = SequencePlayer::new();
        let mut registry = TableGroupRegistry::with_seed(1);
        player.load(rows(3));

        assert!(matches!(player.on_row_complete(1, &mut registry), Completion::Advanced(_)));
        assert_eq!(player.on_row_complete(1, &mut registry), Completion::Stale);
        assert_eq!(player.index(), 1);
        assert_eq!(player.current_row().map(|r| r.id), Some(2));
    }

    #[test]
    fn completion_applies_added_tokens() {
        let mut player = SequencePlayer::new();
        let mut registry = TableGroupRegistry::with_seed(1);
        player.load(vec![row(10, &["orders.users", "billing:3"])].into());

        let completion = player.on_row_complete(10, &mut registry);
        let report = completion.report().unwrap();
        assert_eq!(report.groups_created, 2);
        assert!(matches!(completion, Completion::Finished(_)));
        assert_eq!(registry.get("orders").unwrap().shard_count, 1);
        assert!(registry.get("orders").unwrap().has_table("users"));
        assert_eq!(registry.get("billing").unwrap().shard_count, 3);
    }

    #[test]
    fn pause_keeps_current_row_visible() {
        let mut player = SequencePlayer::new();
        let mut registry = TableGroupRegistry::with_seed(1);
        player.load(rows(2));

        assert_eq!(player.toggle_pause(), PlayerState::Paused);
        assert_eq!(player.current_row().map(|r| r.id), Some(1));
        assert!(matches!(player.on_row_complete(1, &mut registry), Completion::Advanced(_)));
        assert_eq!(player.state(), PlayerState::Paused);
        assert_eq!(player.toggle_pause(), PlayerState::Active);
    }

    #[test]
    fn reload_is_the_only_reset() {
        let mut player = SequencePlayer::new();
        let mut registry = TableGroupRegistry::with_seed(1);
        player.load(rows(2));
        player.on_row_complete(1, &mut registry);
        player.on_row_complete(2, &mut registry);
        assert_eq!(player.state(), PlayerState::Finished);

        player.begin_loading();
        assert_eq!(player.index(), 0);
        player.load(rows(2));
        assert_eq!(player.snapshot().current_row.map(|r| r.id), Some(1));
    }

    #[test]
    fn snapshot_serializes_for_the_browser() {
        let mut player = SequencePlayer::new();
        player.load(rows(1));
        let value = serde_json::to_value(player.snapshot()).unwrap();
        assert_eq!(value["state"], "active");
        assert_eq!(value["totalRows"], 1);
        assert_eq!(value["currentRow"]["query"], "SELECT 1");
    }
}
