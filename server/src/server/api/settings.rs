//! GET /api/settings/status – feature status and effective settings

use axum::Json;
use axum::extract::State;
use serde_json::json;

use crate::app::SharedState;
use crate::config::SettingsManager;

use super::ApiResult;

/// GET /api/settings/status
pub async fn get_settings_status(State(state): State<SharedState>) -> ApiResult {
    let sm = SettingsManager::from_env();
    let status = sm.check_feature_status();

    let mut settings: Vec<_> = sm.get_all_settings().into_values().collect();
    settings.sort_by(|a, b| a.key.cmp(&b.key));

    let config = state.config().await;
    Ok(Json(json!({
        "status": status,
        "settings": settings,
        "runtime": {
            "server_port": config.server_port,
            "script_source": state.store().source_name(),
            "require_auth": config.require_auth,
            "typing_interval_ms": config.typing_interval_ms,
            "query_dwell_ms": config.query_dwell_ms,
            "notice_dwell_ms": config.notice_dwell_ms,
        },
    })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server::api::test_support::*;

    #[tokio::test]
    async fn reports_runtime_timing() {
        let value = body(get_settings_status(State(state())).await);
        assert_eq!(value["runtime"]["typing_interval_ms"], 40);
        assert_eq!(value["runtime"]["script_source"], "none");
        assert!(value["settings"].as_array().unwrap().len() >= 10);
    }
}
