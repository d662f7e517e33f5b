//! Auth session endpoints:
//!   GET  /api/auth/session    – current user + loading flag
//!   POST /api/auth/session    – adopt tokens from a magic link
//!   POST /api/auth/magic-link – send a magic link
//!   POST /api/auth/sign-out   – drop the session

use axum::Json;
use axum::extract::State;
use serde::Deserialize;
use serde_json::json;

use crate::app::SharedState;
use crate::auth::{AuthError, SessionTokens};

use super::{ApiResult, err_json};

#[derive(Debug, Deserialize)]
pub struct MagicLinkRequest {
    pub email: String,
}

fn auth_err(e: &AuthError) -> (axum::http::StatusCode, Json<serde_json::Value>) {
    let status = match e {
        AuthError::NotConfigured => 503,
        AuthError::NoSession => 401,
        AuthError::InvalidEmail | AuthError::Backend(_) => 400,
    };
    err_json(status, &e.user_message())
}

/// GET /api/auth/session
pub async fn get_session(State(state): State<SharedState>) -> ApiResult {
    let status = state.auth().status().await;
    let require_auth = state.config().await.require_auth;
    Ok(Json(json!({
        "user": status.user,
        "loading": status.loading,
        "authenticated": status.authenticated,
        "expires_at": status.expires_at,
        "require_auth": require_auth,
        "configured": state.auth().is_configured(),
    })))
}

/// POST /api/auth/session
pub async fn set_session(
    State(state): State<SharedState>,
    Json(tokens): Json<SessionTokens>,
) -> ApiResult {
    if tokens.access_token.trim().is_empty() {
        return Err(err_json(400, "access_token is required"));
    }
    let user = state.auth().establish_session(tokens).await.map_err(|e| {
        tracing::warn!("Failed to establish session: {e}");
        auth_err(&e)
    })?;
    Ok(Json(json!({ "status": "ok", "user": user })))
}

/// POST /api/auth/magic-link
pub async fn magic_link(
    State(state): State<SharedState>,
    Json(req): Json<MagicLinkRequest>,
) -> ApiResult {
    state.auth().sign_in_with_email(&req.email).await.map_err(|e| {
        tracing::warn!("Magic link request failed: {e}");
        auth_err(&e)
    })?;
    Ok(Json(json!({
        "status": "ok",
        "message": "Check your email for the login link!",
    })))
}

/// POST /api/auth/sign-out
pub async fn sign_out(State(state): State<SharedState>) -> ApiResult {
    state.auth().sign_out().await.map_err(|e| auth_err(&e))?;
    Ok(Json(json!({ "status": "ok" })))
}
