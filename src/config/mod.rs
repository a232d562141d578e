mod loader;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

pub use loader::load_config;

/// Environment variable holding the Gemini API key
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

/// Main application configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub upstream: UpstreamConfig,
    #[serde(default)]
    pub stats: StatsConfig,
}

/// Proxy server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_host")]
    pub host: String,
}

fn default_port() -> u16 {
    8000
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            host: default_host(),
        }
    }
}

/// Upstream Gemini API configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UpstreamConfig {
    /// API base URL, without the `/models/...` suffix
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_model")]
    pub model: String,
    /// Request timeout in seconds. Unset means the HTTP client default (none).
    #[serde(default)]
    pub timeout_seconds: Option<u64>,
    /// Reply with the upstream's status code instead of always 200
    #[serde(default)]
    pub forward_status: bool,
    /// Never read from the config file, only from `GEMINI_API_KEY`
    #[serde(skip)]
    pub api_key: ApiKey,
}

fn default_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

fn default_model() -> String {
    "gemini-pro".to_string()
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            model: default_model(),
            timeout_seconds: None,
            forward_status: false,
            api_key: ApiKey::default(),
        }
    }
}

impl UpstreamConfig {
    /// Returns the base URL with trailing slash stripped
    pub fn base_url(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }
}

/// Upstream credential. Empty when `GEMINI_API_KEY` is unset.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Read the key from `GEMINI_API_KEY`
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read the key through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: FnOnce(&str) -> Option<String>,
    {
        Self(lookup(API_KEY_ENV).unwrap_or_default())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            f.write_str("ApiKey(<unset>)")
        } else {
            f.write_str("ApiKey(<redacted>)")
        }
    }
}

/// Stats logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StatsConfig {
    #[serde(default = "default_stats_enabled")]
    pub enabled: bool,
    #[serde(default)]
    pub format: StatsFormat,
}

fn default_stats_enabled() -> bool {
    true
}

impl Default for StatsConfig {
    fn default() -> Self {
        Self {
            enabled: default_stats_enabled(),
            format: StatsFormat::default(),
        }
    }
}

/// Stats output format
#[derive(Debug, Clone, Copy, Deserialize, Serialize, Default, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum StatsFormat {
    Pretty,
    Json,
    #[default]
    Compact,
}

impl AppConfig {
    /// Load configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        load_config(path)
    }

    /// Load configuration, falling back to built-in defaults
    ///
    /// An explicit path must exist. Without one, the usual locations are
    /// tried and the defaults are used if none of them exists.
    pub fn load_or_default(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        match config_path {
            Some(path) => Self::from_file(path),
            None => {
                let default_paths = ["config.yaml", "config.yml", "./config/config.yaml"];
                for p in default_paths {
                    let path = Path::new(p);
                    if path.exists() {
                        return Self::from_file(path);
                    }
                }
                tracing::debug!("No config file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Attach the API key read from the process environment
    pub fn with_api_key(mut self, api_key: ApiKey) -> Self {
        self.upstream.api_key = api_key;
        self
    }

    /// Check values that serde cannot reject on its own
    pub fn validate(&self) -> Result<(), ConfigError> {
        let base = url::Url::parse(self.upstream.base_url()).map_err(|e| {
            ConfigError::Validation(format!(
                "upstream.base_url '{}' is not a valid URL: {}",
                self.upstream.base_url, e
            ))
        })?;
        if !matches!(base.scheme(), "http" | "https") {
            return Err(ConfigError::Validation(format!(
                "upstream.base_url must use http or https, got '{}'",
                base.scheme()
            )));
        }
        if self.upstream.model.trim().is_empty() {
            return Err(ConfigError::Validation(
                "upstream.model must not be empty".to_string(),
            ));
        }
        if self.upstream.timeout_seconds == Some(0) {
            return Err(ConfigError::Validation(
                "upstream.timeout_seconds must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    NotFound(String),

    #[error("Failed to read configuration file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse configuration: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("Configuration validation error: {0}")]
    Validation(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upstream_config_default() {
        let config = UpstreamConfig::default();
        assert_eq!(
            config.base_url(),
            "https://generativelanguage.googleapis.com/v1beta"
        );
        assert_eq!(config.model, "gemini-pro");
        assert!(config.timeout_seconds.is_none());
        assert!(!config.forward_status);
        assert!(config.api_key.is_empty());
    }

    #[test]
    fn test_upstream_config_trailing_slash() {
        let config = UpstreamConfig {
            base_url: "http://127.0.0.1:9000/v1beta/".to_string(),
            ..UpstreamConfig::default()
        };
        assert_eq!(config.base_url(), "http://127.0.0.1:9000/v1beta");
    }

    #[test]
    fn test_server_config_default() {
        let config = ServerConfig::default();
        assert_eq!(config.port, 8000);
        assert_eq!(config.host, "0.0.0.0");
    }

    #[test]
    fn test_api_key_from_lookup() {
        let key = ApiKey::from_lookup(|name| {
            assert_eq!(name, "GEMINI_API_KEY");
            Some("abc123".to_string())
        });
        assert_eq!(key.expose(), "abc123");
        assert!(!key.is_empty());
    }

    #[test]
    fn test_api_key_missing_is_empty() {
        let key = ApiKey::from_lookup(|_| None);
        assert!(key.is_empty());
        assert_eq!(key.expose(), "");
    }

    #[test]
    fn test_api_key_debug_is_redacted() {
        let key = ApiKey::new("super-secret");
        let debug = format!("{:?}", key);
        assert!(!debug.contains("super-secret"));
        assert_eq!(debug, "ApiKey(<redacted>)");
        assert_eq!(format!("{:?}", ApiKey::default()), "ApiKey(<unset>)");

        let config = AppConfig::default().with_api_key(key);
        assert!(!format!("{:?}", config).contains("super-secret"));
    }

    #[test]
    fn test_api_key_not_serialized() {
        let config = AppConfig::default().with_api_key(ApiKey::new("super-secret"));
        let yaml = serde_yaml::to_string(&config).unwrap();
        assert!(!yaml.contains("super-secret"));
        assert!(!yaml.contains("api_key"));
    }

    #[test]
    fn test_api_key_in_file_is_ignored() {
        let config: AppConfig =
            serde_yaml::from_str("upstream:\n  api_key: from-file\n").unwrap();
        assert!(config.upstream.api_key.is_empty());
    }

    #[test]
    fn test_stats_format_default() {
        assert_eq!(StatsFormat::default(), StatsFormat::Compact);
    }

    #[test]
    fn test_stats_format_serde() {
        assert_eq!(serde_json::to_string(&StatsFormat::Pretty).unwrap(), "\"pretty\"");
        assert_eq!(serde_json::to_string(&StatsFormat::Json).unwrap(), "\"json\"");
        assert_eq!(serde_json::to_string(&StatsFormat::Compact).unwrap(), "\"compact\"");

        let pretty: StatsFormat = serde_json::from_str("\"pretty\"").unwrap();
        assert_eq!(pretty, StatsFormat::Pretty);
    }

    #[test]
    fn test_validate_default_ok() {
        assert!(AppConfig::default().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_url() {
        let mut config = AppConfig::default();
        config.upstream.base_url = "not a url".to_string();
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));

        config.upstream.base_url = "ftp://example.com".to_string();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("http or https"));
    }

    #[test]
    fn test_validate_rejects_empty_model_and_zero_timeout() {
        let mut config = AppConfig::default();
        config.upstream.model = "  ".to_string();
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.upstream.timeout_seconds = Some(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::NotFound("test.yaml".to_string());
        assert!(err.to_string().contains("test.yaml"));

        let err = ConfigError::Parse(serde_yaml::from_str::<AppConfig>("server: [").unwrap_err());
        assert!(err.to_string().contains("parse"));

        let err = ConfigError::Validation("invalid URL".to_string());
        assert!(err.to_string().contains("invalid URL"));
    }

    #[test]
    fn test_load_or_default_with_path() {
        let result = AppConfig::load_or_default(Some(Path::new("/nonexistent/config.yaml")));
        assert!(matches!(result, Err(ConfigError::NotFound(_))));
    }
}
