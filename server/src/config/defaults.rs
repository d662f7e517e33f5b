//! All setting definitions with their default values.

use std::collections::HashMap;
use std::sync::LazyLock;

type DefTuple = (&'static str, &'static str, bool, bool, &'static str);

const DEFS: &[DefTuple] = &[
    ("SERVER_PORT", "8080", false, false, "HTTP + WebSocket port"),
    ("SUPABASE_URL", "", false, true, "Supabase project URL"),
    ("SUPABASE_ANON_KEY", "", true, true, "Supabase anon (public) API key"),
    ("SCRIPT_TABLE", "script", false, false, "Table holding the demo script rows"),
    ("SCRIPT_FILE", "", false, false, "Local JSON file used instead of the remote table"),
    ("AUTH_REDIRECT_URL", "", false, false, "Where magic links send the browser back to"),
    ("REQUIRE_AUTH", "false", false, false, "Reject control requests without a signed-in session"),
    ("TYPING_INTERVAL_MS", "40", false, false, "Delay between revealed characters"),
    ("QUERY_DWELL_MS", "2000", false, false, "How long a query result stays before the next row"),
    ("NOTICE_DWELL_MS", "5000", false, false, "How long a notice stays before the next row"),
];

/// A single setting definition.
#[derive(Debug, Clone)]
pub struct SettingDef {
    pub key: &'static str,
    pub default: &'static str,
    pub secret: bool,
    pub required: bool,
    pub description: &'static str,
}

/// Global setting definitions indexed by key.
pub static DEFAULT_SETTINGS: LazyLock<HashMap<&'static str, SettingDef>> = LazyLock::new(|| {
    DEFS.iter()
        .map(|&(key, default, secret, required, description)| {
            (
                key,
                SettingDef {
                    key,
                    default,
                    secret,
                    required,
                    description,
                },
            )
        })
        .collect()
});

/// Get the default value for a setting key, or `None` if not defined.
pub fn get_default(key: &str) -> Option<&'static str> {
    DEFAULT_SETTINGS.get(key).map(|d| d.default)
}
