//! Auth session held by the server on behalf of the browser.
//!
//! Sign-in is a magic link sent by the backend. The browser hands the
//! tokens from the link back to `/api/auth/session`, after which the
//! session is kept (and refreshed) here.

use std::sync::LazyLock;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::Utc;
use regex::Regex;
use script_client::auth::SupabaseAuth;
use script_client::{AuthUser, ProjectConfig, ScriptError, Session};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::config::AppConfig;

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap());

/// Default lifetime GoTrue gives access tokens.
const DEFAULT_EXPIRES_IN_SECS: i64 = 3600;

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Authentication backend is not configured")]
    NotConfigured,

    #[error("Invalid email address")]
    InvalidEmail,

    #[error("Not signed in")]
    NoSession,

    #[error("{0}")]
    Backend(#[from] ScriptError),
}

impl AuthError {
    /// Text suitable for showing next to the sign-in form.
    pub fn user_message(&self) -> String {
        match self {
            Self::Backend(ScriptError::ApiError { message, .. }) => message.clone(),
            other => other.to_string(),
        }
    }
}

/// Tokens carried back from the magic link.
#[derive(Debug, Clone, Deserialize)]
pub struct SessionTokens {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: String,
    #[serde(default)]
    pub expires_at: Option<i64>,
    #[serde(default)]
    pub expires_in: Option<i64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AuthStatus {
    pub user: Option<AuthUser>,
    pub loading: bool,
    pub authenticated: bool,
    pub expires_at: Option<i64>,
}

pub struct AuthService {
    client: Option<SupabaseAuth>,
    redirect_url: String,
    session: RwLock<Option<Session>>,
    user: RwLock<Option<AuthUser>>,
    loading: AtomicBool,
}

impl AuthService {
    pub fn new(client: Option<SupabaseAuth>, redirect_url: impl Into<String>) -> Self {
        Self {
            client,
            redirect_url: redirect_url.into(),
            session: RwLock::new(None),
            user: RwLock::new(None),
            loading: AtomicBool::new(false),
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        let client = config.backend_configured().then(|| {
            SupabaseAuth::new(ProjectConfig::new(
                &config.supabase_url,
                &config.supabase_anon_key,
            ))
        });
        Self::new(client, config.auth_redirect_url.clone())
    }

    /// No backend: every sign-in attempt fails with [`AuthError::NotConfigured`].
    pub fn disabled() -> Self {
        Self::new(None, "")
    }

    pub fn is_configured(&self) -> bool {
        self.client.is_some()
    }

    fn client(&self) -> Result<&SupabaseAuth, AuthError> {
        self.client.as_ref().ok_or(AuthError::NotConfigured)
    }

    pub async fn user(&self) -> Option<AuthUser> {
        self.user.read().await.clone()
    }

    pub fn loading(&self) -> bool {
        self.loading.load(Ordering::SeqCst)
    }

    pub async fn has_session(&self) -> bool {
        self.session.read().await.is_some()
    }

    pub async fn access_token(&self) -> Option<String> {
        self.session
            .read()
            .await
            .as_ref()
            .map(|s| s.access_token.clone())
    }

    pub async fn status(&self) -> AuthStatus {
        let expires_at = self.session.read().await.as_ref().map(|s| s.expires_at);
        let user = self.user().await;
        AuthStatus {
            authenticated: user.is_some(),
            user,
            loading: self.loading(),
            expires_at,
        }
    }

    /// Send a magic link. No retries; the error text is meant for the user.
    pub async fn sign_in_with_email(&self, email: &str) -> Result<(), AuthError> {
        let email = email.trim();
        if !EMAIL_RE.is_match(email) {
            return Err(AuthError::InvalidEmail);
        }
        let client = self.client()?;
        client
            .sign_in_with_email(email, Some(self.redirect_url.as_str()))
            .await?;
        tracing::info!("Magic link sent");
        Ok(())
    }

    /// Adopt the tokens from a magic link and look up their user.
    pub async fn establish_session(&self, tokens: SessionTokens) -> Result<AuthUser, AuthError> {
        let client = self.client()?;
        self.loading.store(true, Ordering::SeqCst);
        let result = client.get_user(&tokens.access_token).await;
        self.loading.store(false, Ordering::SeqCst);

        let user = result?;
        let expires_at = tokens.expires_at.unwrap_or_else(|| {
            Utc::now().timestamp() + tokens.expires_in.unwrap_or(DEFAULT_EXPIRES_IN_SECS)
        });
        *self.session.write().await = Some(Session {
            access_token: tokens.access_token,
            refresh_token: tokens.refresh_token,
            expires_at,
        });
        *self.user.write().await = Some(user.clone());

        tracing::info!(user_id = %user.id, "Auth session established");
        Ok(user)
    }

    /// Drop the local session and revoke it on the backend.
    pub async fn sign_out(&self) -> Result<(), AuthError> {
        let session = self.session.write().await.take();
        *self.user.write().await = None;

        let Some(session) = session else {
            return Err(AuthError::NoSession);
        };
        if let Some(client) = &self.client {
            if let Err(e) = client.sign_out(&session.access_token).await {
                tracing::warn!("Backend sign-out failed: {e}");
            }
        }
        tracing::info!("Signed out");
        Ok(())
    }

    /// Refresh the session when it is close to expiry. Returns whether it was refreshed.
    pub async fn refresh_if_needed(&self) -> Result<bool, AuthError> {
        let Some(current) = self.session.read().await.clone() else {
            return Ok(false);
        };
        let client = self.client()?;

        match client.get_or_refresh_session(&current).await {
            Ok(None) => Ok(false),
            Ok(Some(refreshed)) => {
                *self.session.write().await = Some(refreshed);
                Ok(true)
            }
            Err(ScriptError::AuthRequired) => {
                tracing::warn!("Session expired and cannot be refreshed, signing out");
                *self.session.write().await = None;
                *self.user.write().await = None;
                Err(AuthError::NoSession)
            }
            Err(e) => Err(e.into()),
        }
    }
}
