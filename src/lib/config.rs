//! Loading and validating the setup configuration.
//!
//! The configuration is a JSON document:
//!
//! ```json
//! {
//!   "envFilePath": ".env",
//!   "webpackConfigPath": "webpack.config.js",
//!   "vars": {
//!     "api": ["API_URL", "API_KEY"],
//!     "featureFlags": ["ENABLE_BETA"]
//!   }
//! }
//! ```
//!
//! `envFilePath` and `vars` are required, `webpackConfigPath` is optional.

use std::path::{Path, PathBuf};

use serde::Deserialize;

#[cfg(feature = "tracing")]
use tracing::debug;

use crate::declaration::Declaration;

/// Validated configuration for one run.
#[derive(Debug, Clone, PartialEq)]
pub struct SetupConfig {
  pub env_file_path: PathBuf,
  pub webpack_config_path: Option<PathBuf>,
  pub vars: Declaration,
}

/// Configuration as it appears on disk, before validation.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawConfig {
  env_file_path: Option<String>,
  webpack_config_path: Option<String>,
  vars: Option<Declaration>,
}

impl SetupConfig {
  /// Reads and validates the configuration file at `path`.
  pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
    let path = path.as_ref();

    #[cfg(feature = "tracing")]
    debug!(?path, "Loading configuration");

    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
    Self::from_json(&content)
  }

  /// Parses and validates configuration text.
  pub fn from_json(content: &str) -> Result<Self, ConfigError> {
    let raw: RawConfig = serde_json::from_str(content)?;
    Self::validate(raw)
  }

  fn validate(raw: RawConfig) -> Result<Self, ConfigError> {
    let env_file_path = raw
      .env_file_path
      .filter(|p| !p.trim().is_empty())
      .ok_or(ConfigError::MissingEnvFilePath)?;
    let vars = raw.vars.ok_or(ConfigError::MissingVars)?;

    Ok(SetupConfig {
      env_file_path: PathBuf::from(env_file_path),
      webpack_config_path: raw
        .webpack_config_path
        .filter(|p| !p.trim().is_empty())
        .map(PathBuf::from),
      vars,
    })
  }
}

/// Errors that stop a run before any file is touched.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
  /// Error reading the configuration file
  #[error("Failed to read config file {0}: {1}")]
  Io(PathBuf, std::io::Error),
  /// The configuration file is not valid JSON
  #[error("Invalid config file: {0}")]
  Json(#[from] serde_json::Error),
  /// `envFilePath` is absent or empty
  #[error("No envFilePath specified in config")]
  MissingEnvFilePath,
  /// `vars` is absent
  #[error("No vars specified in config")]
  MissingVars,
}
