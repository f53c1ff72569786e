//! Session configuration.
//!
//! Configuration is optional: [`SessionConfig::default`] gives working
//! values, and a JSON file can override any subset of fields.
//!
//! ```json
//! {
//!   "connect_timeout_secs": 10,
//!   "read_timeout_secs": 120,
//!   "download_dir": "/var/tmp/webdav",
//!   "default_headers": { "OCS-APIRequest": "true" }
//! }
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use reqwest::header::HeaderMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::error::WebDavError;
use crate::session::constants::{CONNECT_TIMEOUT_SECS, READ_TIMEOUT_SECS};
use crate::session::parse_headers;
use crate::user_agent;

/// Errors raised while loading a configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read config {path}: {source}")]
    Read {
        /// Config file path.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid JSON for [`SessionConfig`].
    #[error("failed to parse config {path}: {source}")]
    Parse {
        /// Config file path.
        path: PathBuf,
        /// The underlying parse error.
        #[source]
        source: serde_json::Error,
    },

    /// A field holds a value outside its accepted range.
    #[error("invalid config value for {field}: {reason}")]
    Invalid {
        /// Offending field.
        field: &'static str,
        /// Why it was rejected.
        reason: &'static str,
    },
}

/// Settings shared by every request of a [`crate::WebDavSession`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SessionConfig {
    /// TCP/TLS connect timeout in seconds.
    pub connect_timeout_secs: u64,
    /// Maximum idle time between body reads in seconds.
    pub read_timeout_secs: u64,
    /// User-Agent override.
    pub user_agent: Option<String>,
    /// Directory staged downloads are written to (OS temp dir when unset).
    pub download_dir: Option<PathBuf>,
    /// Headers added to every request, below caller headers in precedence.
    pub default_headers: BTreeMap<String, String>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            connect_timeout_secs: CONNECT_TIMEOUT_SECS,
            read_timeout_secs: READ_TIMEOUT_SECS,
            user_agent: None,
            download_dir: None,
            default_headers: BTreeMap::new(),
        }
    }
}

impl SessionConfig {
    /// Loads a configuration file. Missing fields keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read, is not valid
    /// JSON, or holds out-of-range values.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        debug!(path = %path.display(), "loaded session config");
        Ok(config)
    }

    /// Checks value ranges.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] for zero timeouts.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.connect_timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                field: "connect_timeout_secs",
                reason: "must be greater than zero",
            });
        }
        if self.read_timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                field: "read_timeout_secs",
                reason: "must be greater than zero",
            });
        }
        Ok(())
    }

    /// Effective User-Agent.
    #[must_use]
    pub fn user_agent(&self) -> String {
        self.user_agent
            .clone()
            .unwrap_or_else(user_agent::default_user_agent)
    }

    /// Effective staging directory.
    #[must_use]
    pub fn download_dir(&self) -> PathBuf {
        self.download_dir.clone().unwrap_or_else(std::env::temp_dir)
    }

    /// Default headers as a header map.
    ///
    /// # Errors
    ///
    /// Returns [`WebDavError::InvalidHeader`] for names or values that are not
    /// valid HTTP.
    pub fn default_header_map(&self) -> Result<HeaderMap, WebDavError> {
        parse_headers(
            self.default_headers
                .iter()
                .map(|(name, value)| (name.as_str(), value.as_str())),
        )
    }
}
