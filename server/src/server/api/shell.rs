//! Interactive psql prompt: POST /api/shell/exec

use axum::Json;
use axum::extract::State;
use serde::Deserialize;
use serde_json::json;

use crate::app::SharedState;
use crate::surfaces::psql;
use crate::surfaces::shell::{LineKind, PROMPT, append_line};

use super::{ApiResult, require_session};

#[derive(Debug, Deserialize)]
pub struct ExecRequest {
    pub input: String,
}

/// POST /api/shell/exec
pub async fn exec(State(state): State<SharedState>, Json(req): Json<ExecRequest>) -> ApiResult {
    require_session(&state).await?;

    let Some((kind, reply)) = psql::respond(&req.input) else {
        return Ok(Json(json!({ "status": "ok", "ignored": true })));
    };

    append_line(&state, LineKind::Command, format!("{PROMPT}{}", req.input));
    append_line(&state, kind, reply.clone());

    Ok(Json(json!({
        "status": "ok",
        "ignored": false,
        "type": kind,
        "output": reply,
    })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server::api::test_support::*;

    fn req(input: &str) -> Json<ExecRequest> {
        Json(ExecRequest {
            input: input.to_string(),
        })
    }

    #[tokio::test]
    async fn exec_appends_command_and_result() {
        let state = state();
        let before = state.shell().len();

        let value = body(exec(State(state.clone()), req("\\dt")).await);
        assert_eq!(value["type"], "result");
        assert!(value["output"].as_str().unwrap().contains("List of relations"));

        let lines = state.shell().lines();
        assert_eq!(lines.len(), before + 2);
        assert_eq!(lines[before].content, "postgres=# \\dt");
        assert_eq!(lines[before].kind, LineKind::Command);
    }

    #[tokio::test]
    async fn blank_input_is_ignored() {
        let state = state();
        let before = state.shell().len();
        let value = body(exec(State(state.clone()), req("   ")).await);
        assert_eq!(value["ignored"], true);
        assert_eq!(state.shell().len(), before);
    }

    #[tokio::test]
    async fn exec_requires_sign_in_when_locked() {
        let (status, _) = error(exec(State(locked_state()), req("help")).await);
        assert_eq!(status, 401);
    }
}
