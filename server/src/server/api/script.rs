//! Script rows:
//!   GET  /api/script/rows – fresh fetch for the data viewer
//!   POST /api/script/rows – insert one row

use axum::Json;
use axum::extract::State;
use script_client::NewScriptRow;
use serde_json::json;

use crate::app::SharedState;
use crate::store::StoreError;

use super::{ApiResult, err_json, require_session};

fn has_content(row: &NewScriptRow) -> bool {
    [&row.query, &row.response, &row.notice]
        .iter()
        .any(|v| v.as_deref().is_some_and(|s| !s.trim().is_empty()))
        || !row.added.is_empty()
}

/// GET /api/script/rows
pub async fn get_rows(State(state): State<SharedState>) -> ApiResult {
    let token = state.auth().access_token().await;
    let rows = state
        .store()
        .try_load_rows(token.as_deref())
        .await
        .map_err(|e| match e {
            StoreError::NoSource => err_json(503, &e.to_string()),
            other => err_json(502, &format!("Failed to fetch rows: {other}")),
        })?;

    Ok(Json(json!({
        "rows": rows,
        "count": rows.len(),
        "source": state.store().source_name(),
    })))
}

/// POST /api/script/rows
pub async fn insert_row(
    State(state): State<SharedState>,
    Json(row): Json<NewScriptRow>,
) -> ApiResult {
    let token = require_session(&state).await?;

    if !has_content(&row) {
        return Err(err_json(400, "Row has no content"));
    }
    if !state.store().can_insert() {
        return Err(err_json(409, "Script source is read-only"));
    }

    let stored = state
        .store()
        .insert_row(&row, token.as_deref())
        .await
        .ok_or_else(|| err_json(502, "Failed to insert row"))?;

    Ok(Json(json!({ "status": "ok", "row": stored })))
}
