//! Conductor task: loads the script and plays rows one at a time.
//!
//! Only this task starts rows, so no two rows are ever on screen at once.
//! Pause, skip and reload requests reach it through the row timers and
//! the reload notification on [`super::PlayerHandle`].

use crate::app::SharedState;
use crate::surfaces;

use super::Completion;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stop {
    /// Ran out of rows (finished or never activated).
    Drained,
    Reload,
    Shutdown,
}

/// Run until shutdown.
pub async fn run(state: SharedState) {
    let shutdown = state.shutdown_token().clone();
    tracing::info!("Conductor started");

    loop {
        if !load_script(&state).await {
            break;
        }

        match play_until_done(&state).await {
            Stop::Shutdown => break,
            Stop::Reload => continue,
            Stop::Drained => {
                tokio::select! {
                    _ = shutdown.cancelled() => break,
                    _ = state.player().reload_requested() => {
                        tracing::info!("Reloading script");
                    }
                }
            }
        }
    }

    tracing::info!("Conductor stopped (shutdown)");
}

/// Fetch rows into the player. Returns false on shutdown.
async fn load_script(state: &SharedState) -> bool {
    let player = state.player();
    player.begin_loading();
    surfaces::table_groups::on_reset(state);
    state.broadcast_player_state();

    let token = state.auth().access_token().await;
    let rows = tokio::select! {
        _ = state.shutdown_token().cancelled() => return false,
        rows = state.store().load_rows(token.as_deref()) => rows,
    };

    let loaded = rows.len();
    let player_state = player.load(rows);
    tracing::info!(rows = loaded, state = ?player_state, "Script loaded");
    state.broadcast_player_state();
    true
}

async fn play_until_done(state: &SharedState) -> Stop {
    let player = state.player();
    let shutdown = state.shutdown_token();

    loop {
        let Some(row) = player.current_row() else {
            return Stop::Drained;
        };
        let ticket = player.timers().start_row(row.id);
        let timing = state.config().await.timing();

        let done = tokio::select! {
            biased;
            _ = shutdown.cancelled() => return Stop::Shutdown,
            _ = player.reload_requested() => {
                tracing::info!(row_id = row.id, "Reload requested during row");
                return Stop::Reload;
            }
            done = surfaces::play_row(state, &row, ticket, timing) => done,
        };

        // Cancelled without a reload or shutdown: the row is simply started again.
        let Some(done) = done else {
            continue;
        };

        let completion = player.complete(done);
        if let Some(report) = completion.report() {
            surfaces::table_groups::on_applied(state, row.id, report);
        }
        state.broadcast_player_state();

        if let Completion::Finished(_) = completion {
            tracing::info!("Script finished");
            return Stop::Drained;
        }
    }
}
