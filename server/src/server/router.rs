use axum::{
    Router,
    routing::{get, post},
};
use tower_http::cors::CorsLayer;

use super::{api, assets, websocket};
use crate::app::SharedState;

/// Create the axum router with all routes.
pub fn create_router(state: SharedState) -> Router {
    Router::new()
        // --- Core ---
        .route("/status", get(status_handler))
        .route("/ws", get(websocket::ws_handler))
        .route("/api/state", get(api::state::get_state))
        // --- Player ---
        .route("/api/player", get(api::player::get_player))
        .route("/api/player/pause", post(api::player::toggle_pause))
        .route("/api/player/skip", post(api::player::skip))
        .route("/api/player/reload", post(api::player::reload))
        .route("/api/table-groups", get(api::state::get_table_groups))
        // --- Script rows ---
        .route("/api/script/rows", get(api::script::get_rows).post(api::script::insert_row))
        // --- Shell ---
        .route("/api/shell/exec", post(api::shell::exec))
        // --- Auth ---
        .route("/api/auth/session", get(api::auth::get_session).post(api::auth::set_session))
        .route("/api/auth/magic-link", post(api::auth::magic_link))
        .route("/api/auth/sign-out", post(api::auth::sign_out))
        // --- Settings ---
        .route("/api/settings/status", get(api::settings::get_settings_status))
        // --- Logs ---
        .route("/api/logs", get(api::logs::get_logs))
        .route("/api/logs/clear", post(api::logs::clear_logs))
        // --- Browser page at / ---
        .route("/", get(assets::index))
        .fallback(assets::fallback)
        // --- Middleware ---
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn status_handler() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
