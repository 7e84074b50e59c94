use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use zeroize::Zeroize;

use crate::error::{DcasError, Result};

/// Environment variable holding the risk-scoring credential.
pub const API_KEY_ENV: &str = "API_KEY";

/// Credential for the external scorer. Wiped on drop, never printed.
#[derive(Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl Drop for ApiKey {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(****)")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<ApiKey>,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_api_base")]
    pub api_base: String,
    /// Transactions sent to the external scorer per CAAT run.
    #[serde(default = "default_max_batch")]
    pub max_batch: usize,
    #[serde(default = "default_high_value_threshold")]
    pub high_value_threshold: f64,
    #[serde(default = "default_opening_balance")]
    pub opening_balance: f64,
    #[serde(default = "default_sync_delay_ms")]
    pub sync_delay_ms: u64,
}

fn default_model() -> String {
    "gemini-2.5-flash".to_string()
}

fn default_api_base() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

fn default_max_batch() -> usize {
    15
}

fn default_high_value_threshold() -> f64 {
    50_000_000.0
}

fn default_opening_balance() -> f64 {
    150_000_000.0
}

fn default_sync_delay_ms() -> u64 {
    2000
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_key: None,
            model: default_model(),
            api_base: default_api_base(),
            max_batch: default_max_batch(),
            high_value_threshold: default_high_value_threshold(),
            opening_balance: default_opening_balance(),
            sync_delay_ms: default_sync_delay_ms(),
        }
    }
}

fn config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("dcas")
}

pub fn settings_path() -> PathBuf {
    config_dir().join("settings.json")
}

/// Read settings from `path` (defaults when missing) and let a non-empty
/// `env_key` override the stored credential.
pub fn load_settings_from(path: &Path, env_key: Option<String>) -> Result<Settings> {
    let mut settings = if path.exists() {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| DcasError::Settings(format!("{}: {e}", path.display())))?
    } else {
        Settings::default()
    };
    if let Some(key) = env_key.filter(|k| !k.trim().is_empty()) {
        settings.api_key = Some(ApiKey::new(key));
    }
    if settings.max_batch == 0 {
        return Err(DcasError::Settings("max_batch must be at least 1".to_string()));
    }
    Ok(settings)
}

pub fn load_settings(path: Option<&Path>) -> Result<Settings> {
    let default_path = settings_path();
    let path = path.unwrap_or(&default_path);
    let settings = load_settings_from(path, std::env::var(API_KEY_ENV).ok())?;
    tracing::debug!(
        path = %path.display(),
        external_scorer = settings.api_key.is_some(),
        model = %settings.model,
        "settings loaded"
    );
    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_returns_defaults_when_missing() {
        let dir = tempfile::tempdir().unwrap();
        let s = load_settings_from(&dir.path().join("settings.json"), None).unwrap();
        assert!(s.api_key.is_none());
        assert_eq!(s.model, "gemini-2.5-flash");
        assert_eq!(s.max_batch, 15);
        assert_eq!(s.high_value_threshold, 50_000_000.0);
        assert_eq!(s.opening_balance, 150_000_000.0);
    }

    #[test]
    fn test_load_merges_with_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{"model": "gemini-2.0-pro", "sync_delay_ms": 0}"#).unwrap();
        let s = load_settings_from(&path, None).unwrap();
        assert_eq!(s.model, "gemini-2.0-pro");
        assert_eq!(s.sync_delay_ms, 0);
        assert_eq!(s.max_batch, 15);
    }

    #[test]
    fn test_env_key_overrides_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{"api_key": "from-file"}"#).unwrap();
        let s = load_settings_from(&path, Some("from-env".to_string())).unwrap();
        assert_eq!(s.api_key.unwrap().expose(), "from-env");

        let s = load_settings_from(&path, Some("  ".to_string())).unwrap();
        assert_eq!(s.api_key.unwrap().expose(), "from-file");
    }

    #[test]
    fn test_invalid_json_is_settings_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, "{not json").unwrap();
        assert!(matches!(
            load_settings_from(&path, None),
            Err(DcasError::Settings(_))
        ));
    }

    #[test]
    fn test_zero_batch_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{"max_batch": 0}"#).unwrap();
        assert!(load_settings_from(&path, None).is_err());
    }

    #[test]
    fn test_api_key_debug_is_redacted() {
        let key = ApiKey::new("super-secret");
        assert_eq!(format!("{key:?}"), "ApiKey(****)");
        let s = Settings {
            api_key: Some(key),
            ..Settings::default()
        };
        assert!(!format!("{s:?}").contains("super-secret"));
    }
}
