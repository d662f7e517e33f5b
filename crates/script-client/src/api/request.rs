use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use serde::Serialize;

use super::*;

impl ScriptApiClient {
    pub fn new(project: ProjectConfig, table: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            project,
            table: table.into(),
        }
    }

    /// Build headers. Uses the user's access token when given, the anon key otherwise.
    fn auth_headers(&self, access_token: Option<&str>) -> Result<HeaderMap, ScriptError> {
        let mut headers = HeaderMap::new();
        let bearer = format!(
            "Bearer {}",
            access_token.unwrap_or(self.project.anon_key.as_str())
        );
        headers.insert(AUTHORIZATION, HeaderValue::from_str(&bearer)?);
        headers.insert("apikey", HeaderValue::from_str(&self.project.anon_key)?);
        Ok(headers)
    }

    /// Execute a GET request with query pairs.
    pub(super) async fn rest_get(
        &self,
        query: &[(&str, &str)],
        access_token: Option<&str>,
    ) -> Result<String, ScriptError> {
        let url = self.table_url()?;
        let headers = self.auth_headers(access_token)?;
        let resp = self
            .http
            .get(url.as_str())
            .headers(headers)
            .query(query)
            .send()
            .await?;

        let status = resp.status();
        let body = resp.text().await?;

        if !status.is_success() {
            return Err(ScriptError::ApiError {
                status: status.as_u16(),
                message: body,
            });
        }

        Ok(body)
    }

    /// Execute a POST request asking PostgREST to echo the stored rows.
    pub(super) async fn rest_insert(
        &self,
        body: &impl Serialize,
        access_token: Option<&str>,
    ) -> Result<String, ScriptError> {
        let url = self.table_url()?;
        let headers = self.auth_headers(access_token)?;
        let resp = self
            .http
            .post(url.as_str())
            .headers(headers)
            .header("Prefer", "return=representation")
            .json(body)
            .send()
            .await?;

        let status = resp.status();
        let resp_body = resp.text().await?;

        if !status.is_success() {
            return Err(ScriptError::ApiError {
                status: status.as_u16(),
                message: resp_body,
            });
        }

        Ok(resp_body)
    }
}
