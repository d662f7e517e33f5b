//! Background task loops.

use std::time::Duration;

use tokio::time::sleep;
use tokio_util::sync::CancellationToken;

use crate::app::SharedState;
use crate::auth::AuthError;

const SESSION_CHECK_INTERVAL: Duration = Duration::from_secs(60);

/// Returns true when `token` was cancelled before `duration` passed.
pub(crate) async fn sleep_or_cancel(token: &CancellationToken, duration: Duration) -> bool {
    tokio::select! {
        _ = token.cancelled() => true,
        _ = sleep(duration) => false,
    }
}

/// Keep the auth session fresh. Checks once a minute; the refresh itself
/// only happens inside the expiry margin.
pub async fn session_refresh_loop(state: SharedState) {
    let shutdown_token = state.shutdown_token().clone();

    if !state.auth().is_configured() {
        tracing::debug!("Session refresh loop not started (no auth backend)");
        return;
    }

    loop {
        if sleep_or_cancel(&shutdown_token, SESSION_CHECK_INTERVAL).await {
            tracing::info!("Session refresh loop stopped (shutdown)");
            return;
        }

        match state.auth().refresh_if_needed().await {
            Ok(true) => tracing::info!("Auth session refreshed"),
            Ok(false) => {}
            Err(AuthError::NoSession) => {
                tracing::warn!("Auth session dropped after failed refresh");
            }
            Err(e) => tracing::warn!("Auth session refresh failed: {e}"),
        }
    }
}
