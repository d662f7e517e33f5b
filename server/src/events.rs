//! WebSocket frame types.
//!
//! Every frame is a JSON object `{ "type": ..., "data": ... }`.

use serde::Serialize;
use serde_json::{Value, json};

pub const CONNECTED: &str = "connected";
pub const SNAPSHOT: &str = "snapshot";
pub const PLAYER_STATE: &str = "player_state";
pub const SHELL_TYPING: &str = "shell_typing";
pub const SHELL_LINE: &str = "shell_line";
pub const NOTICE_TYPING: &str = "notice_typing";
pub const NOTICE: &str = "notice";
pub const TABLE_GROUPS: &str = "table_groups";
pub const PONG: &str = "pong";

/// Partial text of the row currently being typed.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TypingPayload<'a> {
    pub row_id: i64,
    pub text: &'a str,
    pub done: bool,
}

/// Encode a frame. Payloads that fail to serialize become `null`.
pub fn frame(kind: &str, data: impl Serialize) -> String {
    let data = serde_json::to_value(data).unwrap_or(Value::Null);
    json!({ "type": kind, "data": data }).to_string()
}
