//! # Client Configuration
//!
//! Where the dashboard backend lives and how to authenticate against it.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     MUEEN_API_URL=https://dashboard.example.com/api/                   │
//! │     MUEEN_API_TOKEN=eyJ...                                             │
//! │     MUEEN_API_TIMEOUT_SECS=15                                          │
//! │                                                                         │
//! │  2. TOML Config File, [api] table                                      │
//! │     ~/.config/mueen-pos/register.toml (Linux)                          │
//! │     ~/Library/Application Support/com.mueen.pos/register.toml (macOS) │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     http://localhost:8000/api/, no token, 30 s timeout                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # register.toml
//! [api]
//! base_url = "https://dashboard.example.com/api/"
//! token = "..."
//! timeout_secs = 15
//! ```

use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

use crate::error::{ClientError, ClientResult};

/// Name of the shared register config file.
pub const CONFIG_FILE_NAME: &str = "register.toml";

fn default_base_url() -> String {
    "http://localhost:8000/api/".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_user_agent() -> String {
    concat!("mueen-register/", env!("CARGO_PKG_VERSION")).to_string()
}

/// Backend client settings.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    /// Root of the REST API. Endpoints are joined onto it.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Bearer token. Token refresh is handled outside the register.
    #[serde(default)]
    pub token: Option<Secret<String>>,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        ApiConfig {
            base_url: default_base_url(),
            token: None,
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    api: ApiConfig,
}

impl ApiConfig {
    /// Creates a config for `base_url` with defaults elsewhere.
    pub fn new(base_url: impl Into<String>) -> Self {
        ApiConfig {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Sets the bearer token.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(Secret::new(token.into()));
        self
    }

    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (`[api]` table of register.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> ClientResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(default_config_path) {
            if path.exists() {
                info!(?path, "Loading API config from file");
                config = Self::from_file(&path)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;

        Ok(config)
    }

    fn from_file(path: &Path) -> ClientResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    /// Parses the `[api]` table of a register.toml document.
    pub fn from_toml(contents: &str) -> ClientResult<Self> {
        let file: ConfigFile = toml::from_str(contents)?;
        Ok(file.api)
    }

    /// Applies `MUEEN_API_*` overrides read through `var`.
    pub fn apply_overrides<F>(&mut self, var: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = var("MUEEN_API_URL") {
            debug!(url = %url, "Overriding API URL from environment");
            self.base_url = url;
        }

        if let Some(token) = var("MUEEN_API_TOKEN") {
            debug!("Overriding API token from environment");
            self.token = Some(Secret::new(token));
        }

        if let Some(timeout) = var("MUEEN_API_TIMEOUT_SECS") {
            match timeout.parse::<u64>() {
                Ok(secs) => self.timeout_secs = secs,
                Err(_) => warn!(value = %timeout, "Ignoring invalid MUEEN_API_TIMEOUT_SECS"),
            }
        }
    }

    /// Validates the configuration.
    pub fn validate(&self) -> ClientResult<()> {
        let url = self.parsed_base_url()?;
        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(ClientError::InvalidUrl(format!(
                "API URL must start with http:// or https://, got: {}",
                self.base_url
            )));
        }

        if self.timeout_secs == 0 {
            return Err(ClientError::InvalidConfig(
                "timeout_secs must be greater than 0".into(),
            ));
        }

        if let Some(token) = &self.token {
            if token.expose_secret().trim().is_empty() {
                return Err(ClientError::InvalidConfig("token must not be blank".into()));
            }
        }

        Ok(())
    }

    /// Base URL with a trailing slash so relative endpoints join beneath it.
    pub fn parsed_base_url(&self) -> ClientResult<Url> {
        let mut raw = self.base_url.trim().to_string();
        if !raw.ends_with('/') {
            raw.push('/');
        }
        Ok(Url::parse(&raw)?)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Default location of register.toml.
pub fn default_config_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("com", "mueen", "pos")
        .map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_config() {
        let config = ApiConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.timeout_secs, 30);
        assert!(config.token.is_none());
    }

    #[test]
    fn test_config_validation() {
        let mut config = ApiConfig::new("ftp://example.com");
        assert!(matches!(config.validate(), Err(ClientError::InvalidUrl(_))));

        config.base_url = "not a url".to_string();
        assert!(config.validate().is_err());

        config.base_url = "https://example.com/api".to_string();
        assert!(config.validate().is_ok());

        config.timeout_secs = 0;
        assert!(matches!(config.validate(), Err(ClientError::InvalidConfig(_))));

        config.timeout_secs = 5;
        config = config.with_token("  ");
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_base_url_gets_trailing_slash() {
        let config = ApiConfig::new("https://example.com/api");
        let url = config.parsed_base_url().unwrap();
        assert_eq!(url.join("sales/sections/").unwrap().as_str(), "https://example.com/api/sales/sections/");
    }

    #[test]
    fn test_from_toml() {
        let config = ApiConfig::from_toml(
            r#"
            [api]
            base_url = "https://dash.example.com/api/"
            token = "abc"
            timeout_secs = 12

            [register]
            cashier = "ignored here"
            "#,
        )
        .unwrap();
        assert_eq!(config.base_url, "https://dash.example.com/api/");
        assert_eq!(config.token.as_ref().unwrap().expose_secret(), "abc");
        assert_eq!(config.timeout_secs, 12);
    }

    #[test]
    fn test_from_toml_without_api_table() {
        let config = ApiConfig::from_toml("").unwrap();
        assert_eq!(config.base_url, default_base_url());
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            ("MUEEN_API_URL", "https://override.example.com/api/"),
            ("MUEEN_API_TOKEN", "secret"),
            ("MUEEN_API_TIMEOUT_SECS", "nope"),
        ]
        .into_iter()
        .collect();

        let mut config = ApiConfig::default();
        config.apply_overrides(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.base_url, "https://override.example.com/api/");
        assert_eq!(config.token.as_ref().unwrap().expose_secret(), "secret");
        assert_eq!(config.timeout_secs, 30);
    }

    #[test]
    fn test_token_is_redacted_in_debug() {
        let config = ApiConfig::default().with_token("very-secret");
        assert!(!format!("{:?}", config).contains("very-secret"));
    }
}
