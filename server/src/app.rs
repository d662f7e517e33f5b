use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::Serialize;
use serde_json::{Value, json};
use table_groups::TableGroupRegistry;
use tokio::sync::{RwLock, broadcast};
use tokio_util::sync::CancellationToken;

use crate::auth::AuthService;
use crate::config::AppConfig;
use crate::events;
use crate::player::PlayerHandle;
use crate::store::RowStore;
use crate::surfaces::notice::NoticeFeed;
use crate::surfaces::shell::ShellTranscript;

/// Application state shared by the axum handlers and the conductor task.
#[derive(Clone)]
pub struct SharedState {
    inner: Arc<SharedStateInner>,
}

struct SharedStateInner {
    /// Broadcast channel for WebSocket frames
    ws_tx: broadcast::Sender<String>,
    config: RwLock<AppConfig>,
    player: PlayerHandle,
    store: RowStore,
    auth: AuthService,
    shell: Mutex<ShellTranscript>,
    notices: Mutex<NoticeFeed>,
    /// Cancelled once on shutdown; background loops and row timers watch it.
    shutdown: CancellationToken,
}

impl SharedState {
    pub fn new(config: AppConfig, store: RowStore, auth: AuthService) -> Self {
        Self::with_registry(config, store, auth, TableGroupRegistry::new())
    }

    pub fn with_registry(
        config: AppConfig,
        store: RowStore,
        auth: AuthService,
        registry: TableGroupRegistry,
    ) -> Self {
        let (ws_tx, _) = broadcast::channel(2048);
        let shutdown = CancellationToken::new();

        Self {
            inner: Arc::new(SharedStateInner {
                ws_tx,
                config: RwLock::new(config),
                player: PlayerHandle::new(registry, shutdown.clone()),
                store,
                auth,
                shell: Mutex::new(ShellTranscript::new()),
                notices: Mutex::new(NoticeFeed::new()),
                shutdown,
            }),
        }
    }

    pub fn server_port(&self) -> u16 {
        self.inner
            .config
            .try_read()
            .map(|c| c.server_port)
            .unwrap_or(8080)
    }

    pub async fn config(&self) -> tokio::sync::RwLockReadGuard<'_, AppConfig> {
        self.inner.config.read().await
    }

    pub fn subscribe_ws(&self) -> broadcast::Receiver<String> {
        self.inner.ws_tx.subscribe()
    }

    pub fn player(&self) -> &PlayerHandle {
        &self.inner.player
    }

    pub fn store(&self) -> &RowStore {
        &self.inner.store
    }

    pub fn auth(&self) -> &AuthService {
        &self.inner.auth
    }

    pub fn shutdown_token(&self) -> &CancellationToken {
        &self.inner.shutdown
    }

    pub fn shell(&self) -> MutexGuard<'_, ShellTranscript> {
        self.inner.shell.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn notices(&self) -> MutexGuard<'_, NoticeFeed> {
        self.inner.notices.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Send a frame to every WebSocket client. No clients is not an error.
    pub fn broadcast(&self, kind: &str, data: impl Serialize) {
        let _ = self.inner.ws_tx.send(events::frame(kind, data));
    }

    pub fn broadcast_player_state(&self) {
        self.broadcast(events::PLAYER_STATE, self.player().snapshot());
    }

    pub fn broadcast_table_groups(&self) {
        self.broadcast(events::TABLE_GROUPS, self.player().table_groups());
    }

    /// Everything a freshly connected browser needs to render.
    pub fn snapshot(&self) -> Value {
        json!({
            "player": self.player().snapshot(),
            "shell": self.shell().lines(),
            "notices": self.notices().entries(),
            "tableGroups": self.player().table_groups(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_starts_with_banner_welcome_and_default_group() {
        let state = SharedState::new(AppConfig::default(), RowStore::empty(), AuthService::disabled());
        let snap = state.snapshot();
        assert_eq!(snap["player"]["state"], "idle");
        assert_eq!(snap["shell"][0]["content"], "psql (15.3)");
        assert_eq!(snap["notices"][0]["text"], "Welcome to the chat room!");
        assert_eq!(snap["tableGroups"][0]["name"], "default");
        assert_eq!(snap["tableGroups"][0]["shardCount"], 0);
    }

    #[tokio::test]
    async fn broadcast_reaches_subscribers() {
        let state = SharedState::new(AppConfig::default(), RowStore::empty(), AuthService::disabled());
        let mut rx = state.subscribe_ws();
        state.broadcast_player_state();
        let frame: Value = serde_json::from_str(&rx.recv().await.unwrap()).unwrap();
        assert_eq!(frame["type"], "player_state");
        assert_eq!(frame["data"]["totalRows"], 0);
    }
}
