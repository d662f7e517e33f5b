//! Player controls:
//!   GET  /api/player         – player snapshot
//!   POST /api/player/pause   – toggle pause
//!   POST /api/player/skip    – finish the current row now
//!   POST /api/player/reload  – fetch the script again and restart

use axum::Json;
use axum::extract::State;
use serde_json::json;

use crate::app::SharedState;
use crate::player::PlayerState;

use super::{ApiResult, err_json, require_session};

/// GET /api/player
pub async fn get_player(State(state): State<SharedState>) -> ApiResult {
    Ok(Json(json!(state.player().snapshot())))
}

/// POST /api/player/pause
pub async fn toggle_pause(State(state): State<SharedState>) -> ApiResult {
    require_session(&state).await?;

    let new_state = state.player().toggle_pause();
    if !matches!(new_state, PlayerState::Active | PlayerState::Paused) {
        return Err(err_json(409, "Player is not active"));
    }

    tracing::info!(state = ?new_state, "Player pause toggled");
    state.broadcast_player_state();
    Ok(Json(json!({ "status": "ok", "state": new_state })))
}

/// POST /api/player/skip
pub async fn skip(State(state): State<SharedState>) -> ApiResult {
    require_session(&state).await?;

    if !state.player().skip_to_next() {
        return Err(err_json(409, "Player is not active"));
    }
    tracing::info!("Skip requested");
    Ok(Json(json!({ "status": "ok" })))
}

/// POST /api/player/reload
pub async fn reload(State(state): State<SharedState>) -> ApiResult {
    require_session(&state).await?;

    state.player().request_reload();
    tracing::info!("Reload requested");
    Ok(Json(json!({ "status": "ok", "message": "Reloading script" })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server::api::test_support::*;
    use chrono::Utc;
    use script_client::ScriptRow;

    fn rows() -> std::sync::Arc<[ScriptRow]> {
        vec![ScriptRow {
            id: 1,
            created_at: Utc::now(),
            kind: Some("query".into()),
            author: None,
            query: Some("SELECT 1".into()),
            response: None,
            notice: None,
            added: Vec::new(),
        }]
        .into()
    }

    #[tokio::test]
    async fn controls_need_an_active_player() {
        let state = state();
        let (status, value) = error(toggle_pause(State(state.clone())).await);
        assert_eq!(status, 409);
        assert_eq!(value["error"], "Player is not active");

        let (status, _) = error(skip(State(state)).await);
        assert_eq!(status, 409);
    }

    #[tokio::test]
    async fn pause_toggles_and_reports_state() {
        let state = state();
        state.player().load(rows());

        let value = body(toggle_pause(State(state.clone())).await);
        assert_eq!(value["state"], "paused");
        let value = body(get_player(State(state.clone())).await);
        assert_eq!(value["isPaused"], true);
        assert_eq!(value["currentRow"]["id"], 1);

        let value = body(toggle_pause(State(state)).await);
        assert_eq!(value["state"], "active");
    }

    #[tokio::test]
    async fn skip_on_active_player() {
        let state = state();
        state.player().load(rows());
        let value = body(skip(State(state)).await);
        assert_eq!(value["status"], "ok");
    }

    #[tokio::test]
    async fn mutations_require_sign_in_when_locked() {
        let state = locked_state();
        state.player().load(rows());

        for result in [
            toggle_pause(State(state.clone())).await,
            skip(State(state.clone())).await,
            reload(State(state.clone())).await,
        ] {
            let (status, value) = error(result);
            assert_eq!(status, 401);
            assert_eq!(value["error"], "Sign in required");
        }

        let value = body(get_player(State(state)).await);
        assert_eq!(value["state"], "active");
    }
}
