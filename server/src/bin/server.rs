//! Demo server binary.
//!
//! Serves the browser page, plays the script, and stops on Ctrl+C.

use multigres_demo_lib::{build_state, init_foundation, init_tracing, shutdown, spawn_background_tasks};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    tracing::info!("Starting Multigres demo server");

    let config = init_foundation()?;
    let state = build_state(config);
    let server_handle = spawn_background_tasks(&state);

    tracing::info!(
        port = state.server_port(),
        "Demo server running. Press Ctrl+C to stop."
    );

    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutting down...");

    shutdown::graceful_shutdown(&state).await;
    if let Err(e) = server_handle.await {
        tracing::warn!("Server task ended abnormally: {e}");
    }
    Ok(())
}
