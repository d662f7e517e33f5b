//! PostgREST client for the `script` table.
//!
//! Injects the `apikey` + Bearer headers on every request and maps
//! non-2xx responses to [`ScriptError::ApiError`].

mod request;
mod rows;

use crate::{ProjectConfig, ScriptError};

const REST_PREFIX: &str = "/rest/v1/";
pub const DEFAULT_TABLE: &str = "script";

/// Supabase REST client bound to one table.
pub struct ScriptApiClient {
    pub(super) http: reqwest::Client,
    pub(super) project: ProjectConfig,
    pub(super) table: String,
}

impl ScriptApiClient {
    pub fn table(&self) -> &str {
        &self.table
    }

    /// Full URL of the bound table.
    pub fn table_url(&self) -> Result<url::Url, ScriptError> {
        self.project
            .endpoint(&format!("{REST_PREFIX}{}", self.table))
    }
}
