//! Row Store: where the script rows come from.

use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};

use chrono::Utc;
use script_client::api::ScriptApiClient;
use script_client::{NewScriptRow, ProjectConfig, ScriptError, ScriptRow};

use crate::config::AppConfig;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("No script source configured")]
    NoSource,

    #[error("Script source is read-only")]
    ReadOnly,

    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid script file: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Remote(#[from] ScriptError),
}

enum RowSource {
    Remote(ScriptApiClient),
    File(PathBuf),
    Memory(Mutex<Vec<ScriptRow>>),
    None,
}

pub struct RowStore {
    source: RowSource,
}

impl RowStore {
    /// `SCRIPT_FILE` wins over the remote table when both are configured.
    pub fn from_config(config: &AppConfig) -> Self {
        let source = if let Some(path) = &config.script_file {
            RowSource::File(path.clone())
        } else if config.backend_configured() {
            RowSource::Remote(ScriptApiClient::new(
                ProjectConfig::new(&config.supabase_url, &config.supabase_anon_key),
                config.script_table.clone(),
            ))
        } else {
            RowSource::None
        };
        let store = Self { source };
        tracing::info!(source = store.source_name(), "Row store ready");
        store
    }

    pub fn in_memory(rows: Vec<ScriptRow>) -> Self {
        Self {
            source: RowSource::Memory(Mutex::new(rows)),
        }
    }

    pub fn empty() -> Self {
        Self {
            source: RowSource::None,
        }
    }

    pub fn source_name(&self) -> &'static str {
        match self.source {
            RowSource::Remote(_) => "remote",
            RowSource::File(_) => "file",
            RowSource::Memory(_) => "memory",
            RowSource::None => "none",
        }
    }

    pub fn can_insert(&self) -> bool {
        matches!(self.source, RowSource::Remote(_) | RowSource::Memory(_))
    }

    /// Fetch every row, ascending by id, without swallowing errors.
    pub async fn try_load_rows(&self, access_token: Option<&str>) -> Result<Vec<ScriptRow>, StoreError> {
        let mut rows = match &self.source {
            RowSource::Remote(client) => client.fetch_all_rows(access_token).await?,
            RowSource::File(path) => {
                let raw = tokio::fs::read_to_string(path)
                    .await
                    .map_err(|source| StoreError::Io {
                        path: path.clone(),
                        source,
                    })?;
                serde_json::from_str(&raw)?
            }
            RowSource::Memory(rows) => rows.lock().unwrap_or_else(PoisonError::into_inner).clone(),
            RowSource::None => return Err(StoreError::NoSource),
        };
        rows.sort_by_key(|r| r.id);
        rows.dedup_by_key(|r| r.id);
        Ok(rows)
    }

    /// Fetch every row. Failures are logged and give an empty script.
    pub async fn load_rows(&self, access_token: Option<&str>) -> Arc<[ScriptRow]> {
        match self.try_load_rows(access_token).await {
            Ok(rows) => {
                tracing::info!(count = rows.len(), source = self.source_name(), "Script rows loaded");
                rows.into()
            }
            Err(StoreError::NoSource) => {
                tracing::warn!("No script source configured, nothing to play");
                Arc::from(Vec::new())
            }
            Err(e) => {
                tracing::error!("Failed to load script rows: {e}");
                Arc::from(Vec::new())
            }
        }
    }

    pub async fn try_insert_row(
        &self,
        row: &NewScriptRow,
        access_token: Option<&str>,
    ) -> Result<ScriptRow, StoreError> {
        match &self.source {
            RowSource::Remote(client) => Ok(client.insert_row(row, access_token).await?),
            RowSource::Memory(rows) => {
                let mut rows = rows.lock().unwrap_or_else(PoisonError::into_inner);
                let id = rows.iter().map(|r| r.id).max().unwrap_or(0) + 1;
                let stored = ScriptRow {
                    id,
                    created_at: Utc::now(),
                    kind: row.kind.clone(),
                    author: row.author.clone(),
                    query: row.query.clone(),
                    response: row.response.clone(),
                    notice: row.notice.clone(),
                    added: row.added.clone(),
                };
                rows.push(stored.clone());
                Ok(stored)
            }
            RowSource::File(_) => Err(StoreError::ReadOnly),
            RowSource::None => Err(StoreError::NoSource),
        }
    }

    /// Insert one row. Failures are logged and give `None`.
    pub async fn insert_row(&self, row: &NewScriptRow, access_token: Option<&str>) -> Option<ScriptRow> {
        match self.try_insert_row(row, access_token).await {
            Ok(stored) => Some(stored),
            Err(e) => {
                tracing::error!("Failed to insert script row: {e}");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(id: i64) -> ScriptRow {
        ScriptRow {
            id,
            created_at: Utc::now(),
            kind: None,
            author: None,
            query: None,
            response: None,
            notice: None,
            added: Vec::new(),
        }
    }

    #[tokio::test]
    async fn rows_come_back_sorted_and_unique() {
        let store = RowStore::in_memory(vec![row(3), row(1), row(2), row(1)]);
        let ids: Vec<_> = store.load_rows(None).await.iter().map(|r| r.id).collect();
        assert_eq!(ids, [1, 2, 3]);
    }

    #[tokio::test]
    async fn missing_source_yields_empty_script() {
        let store = RowStore::empty();
        assert!(store.load_rows(None).await.is_empty());
        assert!(matches!(store.try_load_rows(None).await, Err(StoreError::NoSource)));
        assert!(store.insert_row(&NewScriptRow::default(), None).await.is_none());
    }

    #[tokio::test]
    async fn unreadable_file_yields_empty_script() {
        let config = AppConfig {
            script_file: Some(PathBuf::from("/nonexistent/multigres-demo/script.json")),
            ..AppConfig::default()
        };
        let store = RowStore::from_config(&config);
        assert_eq!(store.source_name(), "file");
        assert!(!store.can_insert());
        assert!(store.load_rows(None).await.is_empty());
    }

    #[tokio::test]
    async fn file_source_parses_and_sorts() {
        let path = std::env::temp_dir().join(format!("multigres-demo-{}.json", uuid::Uuid::new_v4()));
        std::fs::write(
            &path,
            r#"[
                {"id": 9, "created_at": "2025-03-01T10:00:00Z", "type": "notice", "notice": "later"},
                {"id": 4, "created_at": "2025-03-01T10:00:00Z", "type": "query", "query": "SELECT 1", "added": ["orders.users"]}
            ]"#,
        )
        .unwrap();

        let store = RowStore::from_config(&AppConfig {
            script_file: Some(path.clone()),
            ..AppConfig::default()
        });
        let rows = store.load_rows(None).await;
        std::fs::remove_file(&path).ok();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].id, 4);
        assert_eq!(rows[0].added, vec!["orders.users"]);
        assert_eq!(rows[1].notice.as_deref(), Some("later"));
    }

    #[tokio::test]
    async fn memory_insert_assigns_next_id() {
        let store = RowStore::in_memory(vec![row(7)]);
        let stored = store
            .insert_row(
                &NewScriptRow {
                    kind: Some("chat".into()),
                    notice: Some("hi".into()),
                    ..Default::default()
                },
                None,
            )
            .await
            .unwrap();
        assert_eq!(stored.id, 8);
        assert_eq!(store.load_rows(None).await.len(), 2);
    }

    #[test]
    fn remote_source_needs_url_and_key() {
        let config = AppConfig {
            supabase_url: "https://demo.supabase.co".into(),
            supabase_anon_key: "anon".into(),
            ..AppConfig::default()
        };
        let store = RowStore::from_config(&config);
        assert_eq!(store.source_name(), "remote");
        assert!(store.can_insert());
    }
}
