//! Client configuration.
//!
//! Configuration is layered: built-in defaults, then an optional TOML file,
//! then environment variables.
//!
//! ```
//! use dishly_client::ClientConfig;
//!
//! let config = ClientConfig::from_toml_str(r#"
//!     base_url = "https://api.dishly.app"
//!     page_limit = 20
//! "#).unwrap();
//! assert_eq!(config.page_limit, 20);
//! assert_eq!(config.timeout_ms, 30_000);
//!
//! // environment wins over the file
//! let env = vec![("DISHLY_PAGE_LIMIT".to_string(), "5".to_string())];
//! let config = config.with_env(&env).unwrap();
//! assert_eq!(config.page_limit, 5);
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;
use url::Url;

use crate::constants::{
    DEFAULT_BASE_URL, DEFAULT_TIMEOUT_MS, ENV_API_URL, ENV_PAGE_LIMIT, ENV_TIMEOUT_MS,
};
use dishly_feed::DEFAULT_PAGE_LIMIT;

/// Errors raised while loading configuration.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("failed to read config file {}: {source}", .path.display())]
    Io {
        /// File that was read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The config file is not valid TOML for this schema.
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    /// A setting has an unusable value.
    #[error("invalid {key} {value:?}: {reason}")]
    Invalid {
        /// Setting name (file key or environment variable).
        key: &'static str,
        /// Offending value.
        value: String,
        /// What is wrong with it.
        reason: &'static str,
    },
}

/// Settings for talking to the Dishly API.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
#[non_exhaustive]
pub struct ClientConfig {
    /// Base URL of the API, without the `/api` prefix.
    pub base_url: String,
    /// Items requested per page.
    pub page_limit: usize,
    /// Per-request timeout in milliseconds.
    pub timeout_ms: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            page_limit: DEFAULT_PAGE_LIMIT,
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }
}

impl ClientConfig {
    /// Defaults pointed at `base_url`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Parse a TOML document. Missing keys keep their defaults.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), "loaded config file");
        Self::from_toml_str(&source)
    }

    /// Apply overrides from an environment snapshot.
    pub fn with_env(mut self, env: &[(String, String)]) -> Result<Self, ConfigError> {
        if let Some(url) = env_get(env, ENV_API_URL) {
            self.base_url = url.to_string();
        }
        if let Some(raw) = env_get(env, ENV_PAGE_LIMIT) {
            self.page_limit = raw.parse().map_err(|_| ConfigError::Invalid {
                key: ENV_PAGE_LIMIT,
                value: raw.to_string(),
                reason: "expected a positive integer",
            })?;
        }
        if let Some(raw) = env_get(env, ENV_TIMEOUT_MS) {
            self.timeout_ms = raw.parse().map_err(|_| ConfigError::Invalid {
                key: ENV_TIMEOUT_MS,
                value: raw.to_string(),
                reason: "expected milliseconds",
            })?;
        }
        self.validate()?;
        Ok(self)
    }

    /// Apply overrides from the process environment.
    pub fn with_process_env(self) -> Result<Self, ConfigError> {
        let env: Vec<(String, String)> = std::env::vars().collect();
        self.with_env(&env)
    }

    /// Parsed base URL.
    pub fn base(&self) -> Result<Url, ConfigError> {
        let url = Url::parse(&self.base_url).map_err(|_| ConfigError::Invalid {
            key: "base_url",
            value: self.base_url.clone(),
            reason: "not an absolute URL",
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::Invalid {
                key: "base_url",
                value: self.base_url.clone(),
                reason: "scheme must be http or https",
            });
        }
        Ok(url)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        self.base()?;
        if self.page_limit == 0 {
            return Err(ConfigError::Invalid {
                key: "page_limit",
                value: "0".to_string(),
                reason: "must be at least 1",
            });
        }
        if self.timeout_ms == 0 {
            return Err(ConfigError::Invalid {
                key: "timeout_ms",
                value: "0".to_string(),
                reason: "must be at least 1",
            });
        }
        Ok(())
    }
}

/// Non-blank value of `name` in an environment snapshot.
fn env_get<'a>(env: &'a [(String, String)], name: &str) -> Option<&'a str> {
    env.iter()
        .find(|(k, _)| k == name)
        .map(|(_, v)| v.trim())
        .filter(|v| !v.is_empty())
}
