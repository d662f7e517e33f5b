//! Read-only views: full snapshot and table groups.

use axum::Json;
use axum::extract::State;
use serde_json::json;

use crate::app::SharedState;

use super::ApiResult;

/// GET /api/state
pub async fn get_state(State(state): State<SharedState>) -> ApiResult {
    Ok(Json(state.snapshot()))
}

/// GET /api/table-groups
pub async fn get_table_groups(State(state): State<SharedState>) -> ApiResult {
    let groups = state.player().table_groups();
    Ok(Json(json!({ "groups": groups, "count": groups.len() })))
}
