// src/infra/config.rs — Configuration loading (TOML)

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::infra::paths;

/// Environment variable overriding `remote.endpoint`.
pub const ENDPOINT_ENV: &str = "EGO_AUDITOR_ENDPOINT";
/// Environment variable overriding `remote.api_key`.
pub const API_KEY_ENV: &str = "EGO_AUDITOR_API_KEY";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub remote: RemoteConfig,

    #[serde(default)]
    pub validation: ValidationConfig,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub api: ApiConfig,
}

/// Hosted analysis function.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteConfig {
    pub endpoint: Option<String>,
    pub api_key: Option<String>,
    pub timeout_seconds: u64,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            api_key: None,
            timeout_seconds: 60,
        }
    }
}

impl RemoteConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds.max(1))
    }
}

/// Narrative length bounds. `min_chars` guards the analysis call,
/// `min_submission_chars` guards new submissions.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    pub min_chars: usize,
    pub min_submission_chars: usize,
    pub max_chars: usize,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            min_chars: 10,
            min_submission_chars: 50,
            max_chars: 10_000,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageConfig {
    /// SQLite file; defaults to `<data dir>/ego-auditor.db`.
    pub database: Option<PathBuf>,
    /// Keep sessions in memory only (nothing survives the process).
    #[serde(default)]
    pub in_memory: bool,
}

impl StorageConfig {
    pub fn database_path(&self) -> PathBuf {
        self.database.clone().unwrap_or_else(paths::db_path)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub port: u16,
    /// Bearer token required by the API when set.
    pub token: Option<String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            port: 7717,
            token: None,
        }
    }
}

impl Config {
    /// Load config from file, falling back to defaults, then apply env overrides.
    pub fn load() -> anyhow::Result<Self> {
        let path = paths::config_file_path();
        let mut config = if path.exists() {
            Self::load_from(&path)?
        } else {
            Self::default()
        };
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Overlay environment values. Empty values are ignored.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(endpoint) = lookup(ENDPOINT_ENV).filter(|v| !v.trim().is_empty()) {
            self.remote.endpoint = Some(endpoint);
        }
        if let Some(key) = lookup(API_KEY_ENV).filter(|v| !v.trim().is_empty()) {
            self.remote.api_key = Some(key);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_reasonable() {
        let c = Config::default();
        assert!(c.remote.endpoint.is_none());
        assert_eq!(c.remote.timeout_seconds, 60);
        assert_eq!(c.validation.min_chars, 10);
        assert_eq!(c.validation.min_submission_chars, 50);
        assert_eq!(c.validation.max_chars, 10_000);
        assert!(!c.storage.in_memory);
        assert_eq!(c.api.port, 7717);
    }

    #[test]
    fn test_parse_minimal_toml() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.validation.max_chars, 10_000);
    }

    #[test]
    fn test_parse_full_toml() {
        let toml_str = r#"
[remote]
endpoint = "https://example.test/functions/v1/ego-auditor-analysis"
api_key = "anon"
timeout_seconds = 15

[validation]
min_chars = 12
min_submission_chars = 40
max_chars = 2000

[storage]
database = "/tmp/auditor.db"
in_memory = true

[api]
port = 9000
token = "secret"
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(
            config.remote.endpoint.as_deref(),
            Some("https://example.test/functions/v1/ego-auditor-analysis")
        );
        assert_eq!(config.remote.timeout(), Duration::from_secs(15));
        assert_eq!(config.validation.min_submission_chars, 40);
        assert_eq!(config.storage.database_path(), PathBuf::from("/tmp/auditor.db"));
        assert!(config.storage.in_memory);
        assert_eq!(config.api.token.as_deref(), Some("secret"));
    }

    #[test]
    fn test_partial_section_uses_defaults() {
        let config: Config = toml::from_str("[remote]\nendpoint = \"http://x\"\n").unwrap();
        assert_eq!(config.remote.timeout_seconds, 60);
        assert!(config.remote.api_key.is_none());
    }

    #[test]
    fn test_env_overrides() {
        let mut config = Config::default();
        config.apply_env(|key| match key {
            ENDPOINT_ENV => Some("http://127.0.0.1:9/analyze".into()),
            API_KEY_ENV => Some("from-env".into()),
            _ => None,
        });
        assert_eq!(
            config.remote.endpoint.as_deref(),
            Some("http://127.0.0.1:9/analyze")
        );
        assert_eq!(config.remote.api_key.as_deref(), Some("from-env"));
    }

    #[test]
    fn test_env_blank_ignored() {
        let mut config = Config::default();
        config.remote.api_key = Some("file".into());
        config.apply_env(|_| Some("  ".into()));
        assert_eq!(config.remote.api_key.as_deref(), Some("file"));
        assert!(config.remote.endpoint.is_none());
    }

    #[test]
    fn test_zero_timeout_clamped() {
        let remote = RemoteConfig {
            timeout_seconds: 0,
            ..Default::default()
        };
        assert_eq!(remote.timeout(), Duration::from_secs(1));
    }

    #[test]
    fn test_serialize_roundtrip() {
        let config = Config::default();
        let serialized = toml::to_string(&config).unwrap();
        let deserialized: Config = toml::from_str(&serialized).unwrap();
        assert_eq!(deserialized.api.port, config.api.port);
        assert_eq!(
            deserialized.validation.min_chars,
            config.validation.min_chars
        );
    }

    #[test]
    fn test_load_nonexistent_file() {
        let result = Config::load_from(Path::new("/nonexistent/config.toml"));
        assert!(result.is_err());
    }
}
