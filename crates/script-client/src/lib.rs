//! Supabase client library for the demo script.
//!
//! Provides PostgREST access to the `script` table and GoTrue
//! magic-link authentication.

pub mod api;
pub mod auth;
pub mod models;

pub use models::{AuthUser, NewScriptRow, ScriptRow};

use serde::{Deserialize, Serialize};

/// Session tokens issued by GoTrue.
///
/// The caller is responsible for keeping this around (e.g. in server state).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_at: i64,
}

/// Unified error type for the script-client crate.
#[derive(Debug, thiserror::Error)]
pub enum ScriptError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Authentication required: no valid session")]
    AuthRequired,

    #[error("Session refresh failed: {0}")]
    SessionRefreshFailed(String),

    #[error("Supabase error (status {status}): {message}")]
    ApiError { status: u16, message: String },

    #[error("Insert returned no row")]
    EmptyInsert,

    #[error("Invalid header value: {0}")]
    InvalidHeader(#[from] reqwest::header::InvalidHeaderValue),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),
}

/// Connection parameters shared by the REST and auth clients.
#[derive(Debug, Clone)]
pub struct ProjectConfig {
    /// Project URL, e.g. `https://abc.supabase.co`.
    pub url: String,
    /// Public anon key, sent as `apikey`.
    pub anon_key: String,
}

impl ProjectConfig {
    pub fn new(url: impl Into<String>, anon_key: impl Into<String>) -> Self {
        Self {
            url: url.into().trim_end_matches('/').to_string(),
            anon_key: anon_key.into(),
        }
    }

    /// Join a path onto the project URL.
    pub fn endpoint(&self, path: &str) -> Result<url::Url, ScriptError> {
        let base = url::Url::parse(&self.url)?;
        Ok(base.join(path)?)
    }
}
