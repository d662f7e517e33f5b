use crate::app::SharedState;
use crate::auth::AuthService;
use crate::background;
use crate::config::{AppConfig, SettingsManager};
use crate::player::conductor;
use crate::server;
use crate::store::RowStore;

/// Load `.env`, resolve settings, and report what is missing. Fatal on error.
pub fn init_foundation() -> Result<AppConfig, anyhow::Error> {
    load_dotenv();

    let sm = SettingsManager::from_env();
    let config = AppConfig::load(&sm)?;

    let status = sm.check_feature_status();
    if !status.missing_settings.is_empty() || !status.warnings.is_empty() {
        tracing::warn!(
            "Missing settings: {:?}, warnings: {:?}",
            status.missing_settings,
            status.warnings
        );
    }

    tracing::info!(
        port = config.server_port,
        script_source = %status.script_source,
        require_auth = config.require_auth,
        "Settings loaded"
    );
    Ok(config)
}

/// Wire the row store, auth service and player around `config`.
pub fn build_state(config: AppConfig) -> SharedState {
    let store = RowStore::from_config(&config);
    let auth = AuthService::from_config(&config);
    SharedState::new(config, store, auth)
}

/// Spawn the web server, the conductor and the background loops.
pub fn spawn_background_tasks(state: &SharedState) -> tokio::task::JoinHandle<()> {
    let s = state.clone();
    let server_handle = tokio::spawn(async move {
        if let Err(e) = server::start_server(s).await {
            tracing::error!("Server failed: {e}");
        }
    });

    let s = state.clone();
    tokio::spawn(async move { conductor::run(s).await });

    let s = state.clone();
    tokio::spawn(async move { background::session_refresh_loop(s).await });

    server_handle
}

/// Load .env from multiple candidate paths.
fn load_dotenv() {
    let candidates = [".env", "../.env", "../../.env"];
    for path in &candidates {
        if dotenvy::from_filename(path).is_ok() {
            tracing::info!("Loaded .env from: {path}");
            return;
        }
    }
    tracing::info!("No .env file found, using system environment variables");
}
