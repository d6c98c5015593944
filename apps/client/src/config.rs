use crate::backend::BackendKind;
use search_core::SearchConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use url::Url;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read {path:?}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid configuration in {path:?}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid backend base url {url:?}")]
    BaseUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct Config {
    pub search: SearchConfig,
    pub backend: BackendConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct BackendConfig {
    pub kind: BackendKind,
    pub base_url: String,
    /// Per HTTP request, in milliseconds
    pub http_timeout_ms: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            kind: BackendKind::SearchCode,
            base_url: searchcode::DEFAULT_BASE_URL.to_string(),
            http_timeout_ms: searchcode::DEFAULT_HTTP_TIMEOUT.as_millis() as u64,
        }
    }
}

impl BackendConfig {
    pub fn base_url(&self) -> Result<Url, ConfigError> {
        Url::parse(&self.base_url).map_err(|source| ConfigError::BaseUrl {
            url: self.base_url.clone(),
            source,
        })
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_millis(self.http_timeout_ms)
    }
}

impl Config {
    fn load_str(path: &Path, user_config_str: &str) -> Result<Config, ConfigError> {
        toml::from_str(user_config_str).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load `path`, or the platform config file when `None`. A missing file means
    /// defaults.
    pub fn load(path: Option<&Path>) -> Result<Config, ConfigError> {
        let config_path = match path {
            Some(path) => path.to_path_buf(),
            None => ::config::client_config_path(),
        };

        match std::fs::read_to_string(&config_path) {
            Ok(user_config_str) => Self::load_str(&config_path, &user_config_str),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound && path.is_none() => {
                tracing::debug!(path = ?config_path, "no config file, using defaults");
                Ok(Config::default())
            }
            Err(source) => Err(ConfigError::Read {
                path: config_path,
                source,
            }),
        }
    }
}
