use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// One row of the `script` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScriptRow {
    pub id: i64,
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub query: Option<String>,
    #[serde(default)]
    pub response: Option<String>,
    #[serde(default)]
    pub notice: Option<String>,
    #[serde(default, deserialize_with = "deserialize_added")]
    pub added: Vec<String>,
}

/// Insert payload for the `script` table (`id` and `created_at` are assigned server-side).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewScriptRow {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notice: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub added: Vec<String>,
}

/// User record from GET /auth/v1/user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub last_sign_in_at: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum AddedRepr {
    List(Vec<Option<String>>),
    Text(String),
}

/// Accept `added` as null, a JSON array, or a text-encoded list.
fn deserialize_added<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let repr = Option::<AddedRepr>::deserialize(deserializer)?;
    Ok(match repr {
        None => Vec::new(),
        Some(AddedRepr::List(items)) => clean_list(items),
        Some(AddedRepr::Text(text)) => parse_added_text(&text),
    })
}

fn clean_list(items: Vec<Option<String>>) -> Vec<String> {
    items
        .into_iter()
        .flatten()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Split a text-encoded token list.
///
/// Handles JSON arrays stored as text (`["a","b"]`), Postgres array literals
/// (`{a,"b c"}`) and plain comma separated text.
pub fn parse_added_text(text: &str) -> Vec<String> {
    let trimmed = text.trim();
    if trimmed.starts_with('[') {
        if let Ok(items) = serde_json::from_str::<Vec<Option<String>>>(trimmed) {
            return clean_list(items);
        }
    }
    let inner = trimmed
        .strip_prefix('{')
        .and_then(|s| s.strip_suffix('}'))
        .unwrap_or(trimmed);

    inner
        .split(',')
        .map(|item| item.trim().trim_matches('"').trim())
        .filter(|item| !item.is_empty() && !item.eq_ignore_ascii_case("null"))
        .map(str::to_string)
        .collect()
}

/// `timestamptz` columns carry an offset, plain `timestamp` columns don't.
fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    if let Ok(dt) = DateTime::parse_from_rfc3339(&raw) {
        return Ok(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(&raw, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(&raw, "%Y-%m-%d %H:%M:%S%.f"))
        .map(|naive| naive.and_utc())
        .map_err(serde::de::Error::custom)
}
