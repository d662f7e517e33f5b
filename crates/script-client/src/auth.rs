//! GoTrue (Supabase Auth) passwordless sign-in.
//!
//! Handles magic-link requests, user lookup, session refresh,
//! and sign-out.

use chrono::Utc;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use serde::Deserialize;
use serde_json::json;

use crate::models::AuthUser;
use crate::{ProjectConfig, ScriptError, Session};

/// Refresh a session when it expires within this many seconds.
const REFRESH_MARGIN_SECS: i64 = 5 * 60;

/// GoTrue token response.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: String,
    expires_in: i64,
    #[serde(default)]
    expires_at: Option<i64>,
}

/// GoTrue error payloads come in a few shapes depending on the endpoint.
#[derive(Debug, Default, Deserialize)]
struct ErrorResponse {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    error_description: Option<String>,
    #[serde(default)]
    msg: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

impl ErrorResponse {
    fn into_message(self, fallback: String) -> String {
        self.error_description
            .or(self.msg)
            .or(self.message)
            .or(self.error)
            .unwrap_or(fallback)
    }
}

/// Magic-link authentication against a Supabase project.
pub struct SupabaseAuth {
    project: ProjectConfig,
    http: reqwest::Client,
}

impl SupabaseAuth {
    pub fn new(project: ProjectConfig) -> Self {
        Self {
            project,
            http: reqwest::Client::new(),
        }
    }

    fn headers(&self, access_token: Option<&str>) -> Result<HeaderMap, ScriptError> {
        let mut headers = HeaderMap::new();
        headers.insert("apikey", HeaderValue::from_str(&self.project.anon_key)?);
        if let Some(token) = access_token {
            headers.insert(
                AUTHORIZATION,
                HeaderValue::from_str(&format!("Bearer {token}"))?,
            );
        }
        Ok(headers)
    }

    /// Build the OTP endpoint URL, carrying the optional redirect target.
    pub fn otp_url(&self, redirect_to: Option<&str>) -> Result<url::Url, ScriptError> {
        let mut url = self.project.endpoint("/auth/v1/otp")?;
        if let Some(target) = redirect_to.filter(|t| !t.is_empty()) {
            url.query_pairs_mut().append_pair("redirect_to", target);
        }
        Ok(url)
    }

    /// Send a magic link to `email`.
    pub async fn sign_in_with_email(
        &self,
        email: &str,
        redirect_to: Option<&str>,
    ) -> Result<(), ScriptError> {
        let url = self.otp_url(redirect_to)?;
        let resp = self
            .http
            .post(url.as_str())
            .headers(self.headers(None)?)
            .json(&json!({ "email": email, "create_user": true }))
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await?;
            return Err(api_error(status, body));
        }

        tracing::info!("Magic link requested");
        Ok(())
    }

    /// Look up the user that owns `access_token`.
    pub async fn get_user(&self, access_token: &str) -> Result<AuthUser, ScriptError> {
        let url = self.project.endpoint("/auth/v1/user")?;
        let resp = self
            .http
            .get(url.as_str())
            .headers(self.headers(Some(access_token))?)
            .send()
            .await?;

        let status = resp.status();
        let body = resp.text().await?;

        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(ScriptError::AuthRequired);
        }
        if !status.is_success() {
            return Err(api_error(status, body));
        }

        Ok(serde_json::from_str(&body)?)
    }

    /// Exchange a refresh token for a new session.
    pub async fn refresh_session(&self, refresh_token: &str) -> Result<Session, ScriptError> {
        tracing::info!("Refreshing auth session");

        let mut url = self.project.endpoint("/auth/v1/token")?;
        url.query_pairs_mut()
            .append_pair("grant_type", "refresh_token");

        let resp = self
            .http
            .post(url.as_str())
            .headers(self.headers(None)?)
            .json(&json!({ "refresh_token": refresh_token }))
            .send()
            .await?;

        self.parse_token_response(resp).await
    }

    /// Get a valid session, refreshing if it expires within the margin.
    ///
    /// Returns `Ok(None)` if the current session is still fine.
    /// Returns `Ok(Some(session))` when a refresh happened; the caller keeps the new one.
    pub async fn get_or_refresh_session(
        &self,
        current: &Session,
    ) -> Result<Option<Session>, ScriptError> {
        let now = Utc::now().timestamp();

        if now < current.expires_at - REFRESH_MARGIN_SECS {
            return Ok(None);
        }

        if current.refresh_token.is_empty() {
            return Err(ScriptError::AuthRequired);
        }

        tracing::info!(
            expires_in_secs = current.expires_at - now,
            "Session expiring soon, refreshing"
        );

        let refreshed = self.refresh_session(&current.refresh_token).await?;
        Ok(Some(refreshed))
    }

    /// Revoke the session server-side.
    pub async fn sign_out(&self, access_token: &str) -> Result<(), ScriptError> {
        let url = self.project.endpoint("/auth/v1/logout")?;
        let resp = self
            .http
            .post(url.as_str())
            .headers(self.headers(Some(access_token))?)
            .send()
            .await?;

        let status = resp.status();
        // An already revoked token is as good as signed out.
        if !status.is_success() && status != reqwest::StatusCode::UNAUTHORIZED {
            let body = resp.text().await?;
            return Err(api_error(status, body));
        }
        Ok(())
    }

    async fn parse_token_response(&self, resp: reqwest::Response) -> Result<Session, ScriptError> {
        let status = resp.status();
        let body = resp.text().await?;

        if !status.is_success() {
            let err: ErrorResponse = serde_json::from_str(&body).unwrap_or_default();
            return Err(ScriptError::SessionRefreshFailed(
                err.into_message(format!("{status}: {body}")),
            ));
        }

        let token: TokenResponse = serde_json::from_str(&body).map_err(|e| {
            ScriptError::SessionRefreshFailed(format!("failed to parse response: {e}"))
        })?;

        Ok(Session {
            access_token: token.access_token,
            refresh_token: token.refresh_token,
            expires_at: token
                .expires_at
                .unwrap_or_else(|| Utc::now().timestamp() + token.expires_in),
        })
    }
}

fn api_error(status: reqwest::StatusCode, body: String) -> ScriptError {
    let parsed: ErrorResponse = serde_json::from_str(&body).unwrap_or_default();
    ScriptError::ApiError {
        status: status.as_u16(),
        message: parsed.into_message(body),
    }
}
