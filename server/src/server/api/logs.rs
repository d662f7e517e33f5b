//! Captured log access.

use axum::Json;
use axum::extract::Query;
use serde::Deserialize;
use serde_json::json;

use crate::log_buffer;

use super::ApiResult;

#[derive(Debug, Deserialize)]
pub struct LogQuery {
    pub limit: Option<usize>,
    /// Minimum level: error, warn, info, debug.
    pub level: Option<String>,
}

/// GET /api/logs
pub async fn get_logs(Query(q): Query<LogQuery>) -> ApiResult {
    let limit = q.limit.unwrap_or(100);
    let logs = log_buffer::recent(limit, q.level.as_deref());
    Ok(Json(json!({
        "logs": logs,
        "count": logs.len(),
        "limit": limit,
        "timestamp": chrono::Utc::now().to_rfc3339(),
    })))
}

/// POST /api/logs/clear
pub async fn clear_logs() -> ApiResult {
    let cleared = log_buffer::clear();
    Ok(Json(json!({ "status": "ok", "cleared": cleared })))
}
