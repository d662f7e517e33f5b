//! REST API handlers grouped by domain.

pub mod auth;
pub mod logs;
pub mod player;
pub mod script;
pub mod settings;
pub mod shell;
pub mod state;

use axum::Json;
use axum::http::StatusCode;
use serde_json::{Value, json};

use crate::app::SharedState;

pub type ApiResult = Result<Json<Value>, (StatusCode, Json<Value>)>;

/// Standard error response.
pub fn err_json(status: u16, message: &str) -> (StatusCode, Json<Value>) {
    (
        StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
        Json(json!({ "status": "error", "error": message })),
    )
}

/// Gate for mutating endpoints.
///
/// With `REQUIRE_AUTH` on, a missing session is a 401. Returns the access
/// token when there is one, so callers can act as the signed-in user.
pub async fn require_session(state: &SharedState) -> Result<Option<String>, (StatusCode, Json<Value>)> {
    let token = state.auth().access_token().await;
    if token.is_none() && state.config().await.require_auth {
        return Err(err_json(401, "Sign in required"));
    }
    Ok(token)
}

#[cfg(test)]
pub(crate) mod test_support {
    use axum::Json;
    use serde_json::Value;

    use crate::app::SharedState;
    use crate::auth::AuthService;
    use crate::config::AppConfig;
    use crate::store::RowStore;

    pub fn state_with(config: AppConfig, store: RowStore) -> SharedState {
        SharedState::new(config, store, AuthService::disabled())
    }

    pub fn state() -> SharedState {
        state_with(AppConfig::default(), RowStore::empty())
    }

    pub fn locked_state() -> SharedState {
        state_with(
            AppConfig {
                require_auth: true,
                ..AppConfig::default()
            },
            RowStore::in_memory(Vec::new()),
        )
    }

    pub fn body(result: Result<Json<Value>, (axum::http::StatusCode, Json<Value>)>) -> Value {
        match result {
            Ok(Json(v)) => v,
            Err((status, Json(v))) => panic!("unexpected error {status}: {v}"),
        }
    }

    pub fn error(result: Result<Json<Value>, (axum::http::StatusCode, Json<Value>)>) -> (u16, Value) {
        match result {
            Ok(Json(v)) => panic!("expected an error, got {v}"),
            Err((status, Json(v))) => (status.as_u16(), v),
        }
    }
}
