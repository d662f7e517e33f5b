use crate::models::{NewScriptRow, ScriptRow};

use super::*;

impl ScriptApiClient {
    /// Fetch every row of the table, ascending by id.
    pub async fn fetch_all_rows(
        &self,
        access_token: Option<&str>,
    ) -> Result<Vec<ScriptRow>, ScriptError> {
        let body = self
            .rest_get(&[("select", "*"), ("order", "id.asc")], access_token)
            .await?;
        let rows: Vec<ScriptRow> = serde_json::from_str(&body)?;
        tracing::debug!(table = %self.table, count = rows.len(), "Fetched script rows");
        Ok(rows)
    }

    /// Insert a single row and return it as stored.
    pub async fn insert_row(
        &self,
        row: &NewScriptRow,
        access_token: Option<&str>,
    ) -> Result<ScriptRow, ScriptError> {
        let body = self.rest_insert(&[row], access_token).await?;
        let mut rows: Vec<ScriptRow> = serde_json::from_str(&body)?;
        if rows.is_empty() {
            return Err(ScriptError::EmptyInsert);
        }
        let stored = rows.swap_remove(0);
        tracing::info!(table = %self.table, id = stored.id, "Inserted script row");
        Ok(stored)
    }
}
