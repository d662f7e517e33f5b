//! SettingsManager: environment-backed settings with defaults and feature status.

use std::collections::HashMap;

use super::defaults::DEFAULT_SETTINGS;
use super::validation::validate_setting;
use super::{FeatureStatus, SettingInfo, SettingType};

/// Resolves setting keys against captured values, falling back to defaults.
pub struct SettingsManager {
    values: HashMap<String, String>,
}

impl SettingsManager {
    /// Capture every known key from the process environment.
    pub fn from_env() -> Self {
        let values = DEFAULT_SETTINGS
            .keys()
            .filter_map(|key| std::env::var(key).ok().map(|v| (key.to_string(), v)))
            .collect();
        Self::from_map(values)
    }

    /// Build from explicit values. Invalid values are dropped with a warning.
    pub fn from_map(values: HashMap<String, String>) -> Self {
        let values = values
            .into_iter()
            .filter(|(key, value)| {
                if !DEFAULT_SETTINGS.contains_key(key.as_str()) {
                    tracing::debug!("Ignoring unknown setting: {key}");
                    return false;
                }
                match validate_setting(key, value) {
                    Ok(()) => true,
                    Err(e) => {
                        tracing::warn!("Invalid value for {key} ({e}), using default");
                        false
                    }
                }
            })
            .collect();
        Self { values }
    }

    /// Get a setting value. Falls back to default if not set.
    pub fn get_setting(&self, key: &str) -> Result<String, anyhow::Error> {
        if let Some(val) = self.values.get(key) {
            return Ok(val.clone());
        }
        if let Some(def) = DEFAULT_SETTINGS.get(key) {
            return Ok(def.default.to_string());
        }
        anyhow::bail!("setting not found: {key}");
    }

    /// Get all settings with secrets masked.
    pub fn get_all_settings(&self) -> HashMap<String, SettingInfo> {
        DEFAULT_SETTINGS
            .values()
            .map(|def| {
                let value = self
                    .values
                    .get(def.key)
                    .cloned()
                    .unwrap_or_else(|| def.default.to_string());
                let has_value = !value.is_empty();
                let (setting_type, shown) = if def.secret {
                    (SettingType::Secret, if has_value { "********".to_string() } else { String::new() })
                } else {
                    (SettingType::Normal, value)
                };
                (
                    def.key.to_string(),
                    SettingInfo {
                        key: def.key.to_string(),
                        value: shown,
                        setting_type,
                        required: def.required,
                        description: def.description.to_string(),
                        has_value,
                    },
                )
            })
            .collect()
    }

    /// Check which features are properly configured.
    pub fn check_feature_status(&self) -> FeatureStatus {
        let g = |key: &str| self.get_setting(key).unwrap_or_default();

        let mut status = FeatureStatus {
            backend_configured: true,
            script_source: "remote".into(),
            auth_required: g("REQUIRE_AUTH") == "true",
            missing_settings: Vec::new(),
            warnings: Vec::new(),
        };

        for key in ["SUPABASE_URL", "SUPABASE_ANON_KEY"] {
            if g(key).is_empty() {
                status.missing_settings.push(key.to_string());
                status.backend_configured = false;
            }
        }

        if !g("SCRIPT_FILE").is_empty() {
            status.script_source = "file".into();
        } else if !status.backend_configured {
            status.script_source = "none".into();
            status
                .warnings
                .push("No script source configured - the player will stay idle".into());
        }

        if status.auth_required && !status.backend_configured {
            status
                .warnings
                .push("REQUIRE_AUTH is enabled but sign-in is unavailable without Supabase".into());
        }

        status
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manager(pairs: &[(&str, &str)]) -> SettingsManager {
        SettingsManager::from_map(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }

    #[test]
    fn falls_back_to_defaults() {
        let sm = manager(&[]);
        assert_eq!(sm.get_setting("SERVER_PORT").unwrap(), "8080");
        assert_eq!(sm.get_setting("SCRIPT_TABLE").unwrap(), "script");
        assert!(sm.get_setting("NOPE").is_err());
    }

    #[test]
    fn invalid_values_are_dropped() {
        let sm = manager(&[("SERVER_PORT", "http"), ("TYPING_INTERVAL_MS", "25")]);
        assert_eq!(sm.get_setting("SERVER_PORT").unwrap(), "8080");
        assert_eq!(sm.get_setting("TYPING_INTERVAL_MS").unwrap(), "25");
    }

    #[test]
    fn secrets_are_masked() {
        let sm = manager(&[("SUPABASE_ANON_KEY", "eyJhbGciOi")]);
        let all = sm.get_all_settings();
        let key = &all["SUPABASE_ANON_KEY"];
        assert_eq!(key.value, "********");
        assert!(key.has_value);
        assert_eq!(key.setting_type, SettingType::Secret);
    }

    #[test]
    fn feature_status_reports_missing_backend() {
        let status = manager(&[]).check_feature_status();
        assert!(!status.backend_configured);
        assert_eq!(status.script_source, "none");
        assert_eq!(status.missing_settings, vec!["SUPABASE_URL", "SUPABASE_ANON_KEY"]);

        let status = manager(&[("SCRIPT_FILE", "demo/script.json")]).check_feature_status();
        assert_eq!(status.script_source, "file");

        let status = manager(&[
            ("SUPABASE_URL", "https://demo.supabase.co"),
            ("SUPABASE_ANON_KEY", "anon"),
        ])
        .check_feature_status();
        assert!(status.backend_configured);
        assert!(status.missing_settings.is_empty());
    }
}
