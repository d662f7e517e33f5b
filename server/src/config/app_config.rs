//! Runtime application configuration resolved from the settings manager.

use std::path::PathBuf;
use std::time::Duration;

use super::manager::SettingsManager;

/// Runtime configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server_port: u16,
    pub supabase_url: String,
    pub supabase_anon_key: String,
    pub script_table: String,
    pub script_file: Option<PathBuf>,
    pub auth_redirect_url: String,
    pub require_auth: bool,
    pub typing_interval_ms: u64,
    pub query_dwell_ms: u64,
    pub notice_dwell_ms: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server_port: 8080,
            supabase_url: String::new(),
            supabase_anon_key: String::new(),
            script_table: "script".into(),
            script_file: None,
            auth_redirect_url: String::new(),
            require_auth: false,
            typing_interval_ms: 40,
            query_dwell_ms: 2000,
            notice_dwell_ms: 5000,
        }
    }
}

/// Timer settings read by the presentation surfaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timing {
    pub typing_interval: Duration,
    pub query_dwell: Duration,
    pub notice_dwell: Duration,
}

impl AppConfig {
    /// Load configuration from the settings manager.
    pub fn load(sm: &SettingsManager) -> Result<Self, anyhow::Error> {
        let g = |key: &str| -> String { sm.get_setting(key).unwrap_or_default() };
        let defaults = Self::default();

        let script_file = g("SCRIPT_FILE");
        let mut auth_redirect_url = g("AUTH_REDIRECT_URL");
        let server_port = parse_or(&g("SERVER_PORT"), defaults.server_port);
        if auth_redirect_url.is_empty() {
            auth_redirect_url = format!("http://localhost:{server_port}/");
        }

        Ok(Self {
            server_port,
            supabase_url: g("SUPABASE_URL"),
            supabase_anon_key: g("SUPABASE_ANON_KEY"),
            script_table: {
                let t = g("SCRIPT_TABLE");
                if t.is_empty() { defaults.script_table } else { t }
            },
            script_file: (!script_file.is_empty()).then(|| PathBuf::from(script_file)),
            auth_redirect_url,
            require_auth: g("REQUIRE_AUTH") == "true",
            typing_interval_ms: parse_or(&g("TYPING_INTERVAL_MS"), defaults.typing_interval_ms),
            query_dwell_ms: parse_or(&g("QUERY_DWELL_MS"), defaults.query_dwell_ms),
            notice_dwell_ms: parse_or(&g("NOTICE_DWELL_MS"), defaults.notice_dwell_ms),
        })
    }

    pub fn backend_configured(&self) -> bool {
        !self.supabase_url.is_empty() && !self.supabase_anon_key.is_empty()
    }

    pub fn timing(&self) -> Timing {
        Timing {
            typing_interval: Duration::from_millis(self.typing_interval_ms.max(1)),
            query_dwell: Duration::from_millis(self.query_dwell_ms),
            notice_dwell: Duration::from_millis(self.notice_dwell_ms),
        }
    }
}

fn parse_or<T: std::str::FromStr>(s: &str, default: T) -> T {
    if s.is_empty() {
        return default;
    }
    s.parse().unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn load_applies_overrides_and_derives_redirect() {
        let sm = SettingsManager::from_map(HashMap::from([
            ("SERVER_PORT".to_string(), "9000".to_string()),
            ("SCRIPT_FILE".to_string(), "demo.json".to_string()),
            ("QUERY_DWELL_MS".to_string(), "3000".to_string()),
        ]));
        let config = AppConfig::load(&sm).unwrap();
        assert_eq!(config.server_port, 9000);
        assert_eq!(config.auth_redirect_url, "http://localhost:9000/");
        assert_eq!(config.script_file, Some(PathBuf::from("demo.json")));
        assert_eq!(config.timing().query_dwell, Duration::from_secs(3));
        assert_eq!(config.timing().notice_dwell, Duration::from_secs(5));
        assert!(!config.backend_configured());
    }
}
