//! Build configuration.
//!
//! The configuration is a JSON document shared by every target:
//!
//! ```json
//! {
//!   "vagrant-targets": {
//!     "msvc2015-win64": { "msvc_version": "14.0", "msvc_redist": "https://..." }
//!   },
//!   "fpm-params": { "name": "wkhtmltox", "vendor": "wkhtmltopdf.org" }
//! }
//! ```
//!
//! It is read-only input to the pipelines.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::target::Target;

/// Errors raised while loading or querying the configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("failed to read config {path}: {source}")]
  Read {
    path: String,
    #[source]
    source: std::io::Error,
  },

  #[error("failed to parse config: {0}")]
  Parse(#[from] serde_json::Error),

  #[error("no configuration for target {0}")]
  MissingTarget(String),

  #[error("target {target} has no {key} configured")]
  MissingTargetKey { target: String, key: &'static str },
}

/// Per-target toolchain parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetConfig {
  /// Visual Studio version, e.g. "14.0".
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub msvc_version: Option<String>,

  /// Download URL of the matching Visual C++ redistributable.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub msvc_redist: Option<String>,

  /// Expected SHA-256 (lowercase hex) of the redistributable.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub msvc_redist_sha256: Option<String>,
}

/// The whole build configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
  #[serde(default, alias = "vagrant-targets")]
  pub targets: HashMap<String, TargetConfig>,

  /// Extra `fpm` options, passed through in document order.
  #[serde(default, alias = "fpm-params")]
  pub fpm_params: IndexMap<String, serde_json::Value>,

  /// NSIS template; defaults to `<src_dir>/packaging/wkhtmltox.nsi`.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub nsis_script: Option<PathBuf>,
}

impl Config {
  pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
      path: path.display().to_string(),
      source,
    })?;
    Self::from_json(&content)
  }

  pub fn from_json(content: &str) -> Result<Self, ConfigError> {
    Ok(serde_json::from_str(content)?)
  }

  /// Look up the parameters of `target`.
  pub fn target(&self, target: &Target) -> Result<&TargetConfig, ConfigError> {
    self
      .targets
      .get(target.as_str())
      .ok_or_else(|| ConfigError::MissingTarget(target.to_string()))
  }

  /// The Visual Studio version required by `target`.
  pub fn msvc_version(&self, target: &Target) -> Result<&str, ConfigError> {
    required(target, "msvc_version", self.target(target)?.msvc_version.as_deref())
  }

  /// The redistributable download URL for `target`.
  pub fn msvc_redist(&self, target: &Target) -> Result<&str, ConfigError> {
    required(target, "msvc_redist", self.target(target)?.msvc_redist.as_deref())
  }

  /// `fpm` parameters as `(key, value)` pairs with non-string values rendered as JSON.
  pub fn fpm_params(&self) -> impl Iterator<Item = (&str, String)> {
    self.fpm_params.iter().map(|(key, value)| {
      let value = match value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
      };
      (key.as_str(), value)
    })
  }

  /// Path of the NSIS template for a source tree.
  pub fn nsis_script(&self, src_dir: &Path) -> PathBuf {
    self
      .nsis_script
      .clone()
      .unwrap_or_else(|| src_dir.join("packaging").join("wkhtmltox.nsi"))
  }
}

fn required<'a>(target: &Target, key: &'static str, value: Option<&'a str>) -> Result<&'a str, ConfigError> {
  value.ok_or_else(|| ConfigError::MissingTargetKey {
    target: target.to_string(),
    key,
  })
}
