use std::time::Duration;

use tokio::time::sleep;

use crate::app::SharedState;

pub async fn graceful_shutdown(state: &SharedState) {
    tracing::info!("Shutdown sequence started");

    state.player().timers().cancel_row();
    state.shutdown_token().cancel();
    tracing::info!("Shutdown: conductor and background loops cancelled");

    // Let the server flush in-flight responses.
    sleep(Duration::from_millis(200)).await;
    tracing::info!("Shutdown sequence completed");
}
