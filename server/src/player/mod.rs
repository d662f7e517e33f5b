//! Sequence player: state machine, row timers, and the conductor task that
//! plays rows through the presentation surfaces.

pub mod conductor;
pub mod state;
pub mod timers;

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use script_client::ScriptRow;
use table_groups::{TableGroupData, TableGroupRegistry};
use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;

pub use state::{Completion, PlayerSnapshot, PlayerState, SequencePlayer};
pub use timers::{RowCompleted, RowTicket, RowTimers, Tick};

/// Shared handle to the player, its registry, and its timers.
///
/// All player mutation goes through one mutex so completions, pause and
/// skip requests are applied in a single order.
#[derive(Clone)]
pub struct PlayerHandle {
    inner: Arc<PlayerInner>,
}

struct PlayerInner {
    player: Mutex<SequencePlayer>,
    registry: Mutex<TableGroupRegistry>,
    timers: RowTimers,
    reload: Notify,
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

impl PlayerHandle {
    pub fn new(registry: TableGroupRegistry, shutdown: CancellationToken) -> Self {
        Self {
            inner: Arc::new(PlayerInner {
                player: Mutex::new(SequencePlayer::new()),
                registry: Mutex::new(registry),
                timers: RowTimers::new(shutdown),
                reload: Notify::new(),
            }),
        }
    }

    pub fn timers(&self) -> &RowTimers {
        &self.inner.timers
    }

    pub fn snapshot(&self) -> PlayerSnapshot {
        lock(&self.inner.player).snapshot()
    }

    pub fn state(&self) -> PlayerState {
        lock(&self.inner.player).state()
    }

    pub fn current_row(&self) -> Option<ScriptRow> {
        lock(&self.inner.player).current_row().cloned()
    }

    pub fn table_groups(&self) -> Vec<TableGroupData> {
        lock(&self.inner.registry).snapshot()
    }

    /// Enter Loading: the registry goes back to `default` only and any pause is lifted.
    pub fn begin_loading(&self) {
        self.inner.timers.cancel_row();
        lock(&self.inner.registry).reset();
        let mut player = lock(&self.inner.player);
        player.begin_loading();
        self.inner.timers.set_paused(false);
    }

    pub fn load(&self, rows: Arc<[ScriptRow]>) -> PlayerState {
        let mut player = lock(&self.inner.player);
        player.load(rows);
        player.state()
    }

    /// Report a finished row. Stale completions are ignored.
    pub fn complete(&self, done: RowCompleted) -> Completion {
        let mut player = lock(&self.inner.player);
        let mut registry = lock(&self.inner.registry);
        let completion = player.on_row_complete(done.row_id, &mut registry);
        if completion == Completion::Stale {
            tracing::debug!(row_id = done.row_id, "Ignoring stale row completion");
        }
        completion
    }

    /// The timer flag is set under the player lock so it follows the state flips in order.
    pub fn toggle_pause(&self) -> PlayerState {
        let mut player = lock(&self.inner.player);
        let state = player.toggle_pause();
        self.inner.timers.set_paused(state == PlayerState::Paused);
        state
    }

    /// Finish the current row's animation now. Returns false when nothing is playing.
    pub fn skip_to_next(&self) -> bool {
        if !lock(&self.inner.player).is_active() {
            return false;
        }
        self.inner.timers.skip();
        true
    }

    /// Stop the current row and ask the conductor to fetch rows again.
    pub fn request_reload(&self) {
        self.inner.timers.cancel_row();
        self.inner.reload.notify_one();
    }

    pub async fn reload_requested(&self) {
        self.inner.reload.notified().await;
    }
}
