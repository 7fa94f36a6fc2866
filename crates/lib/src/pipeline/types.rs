//! Types shared by the target pipelines.

use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;

use crate::command::CommandError;
use crate::config::{Config, ConfigError};
use crate::consts::{APP_DIR, DIST_DIR, STAGING_DIR};
use crate::environment::BuildEnvironment;
use crate::fetch::FetchError;
use crate::target::Target;

/// Errors that abort a pipeline phase.
#[derive(Debug, Error)]
pub enum PipelineError {
  /// Required per-target parameters are absent.
  #[error("configuration error: {0}")]
  Config(#[from] ConfigError),

  /// The expected compiler toolset could not be located.
  #[error("toolchain not found for {target}: {message}")]
  ToolchainNotFound { target: String, message: String },

  /// An external command failed.
  #[error(transparent)]
  Command(#[from] CommandError),

  /// Downloading a redistributable failed.
  #[error(transparent)]
  Fetch(#[from] FetchError),

  /// No pipeline packages for this target.
  #[error("unsupported target: {0}")]
  UnsupportedTarget(String),

  /// Filesystem operation in the build directory failed.
  #[error("io error at {path}: {source}")]
  Io {
    path: String,
    #[source]
    source: std::io::Error,
  },

  /// The packager finished without leaving the expected artifact.
  #[error("no {pattern} produced in {dir}")]
  MissingArtifact { dir: String, pattern: &'static str },

  /// Walking the staged install tree failed.
  #[error("failed to list staged files: {0}")]
  WalkDir(#[from] walkdir::Error),
}

impl PipelineError {
  pub(crate) fn io(path: &Path) -> impl FnOnce(std::io::Error) -> Self + '_ {
    move |source| PipelineError::Io {
      path: path.display().to_string(),
      source,
    }
  }
}

/// Everything a pipeline phase needs to know about the build.
#[derive(Debug, Clone)]
pub struct BuildContext {
  pub config: Config,
  pub target: Target,
  /// Build directory, containing the build system output in `app/`.
  pub build_dir: PathBuf,
  /// Product source tree (license file, NSIS template).
  pub src_dir: PathBuf,
}

impl BuildContext {
  pub fn new(
    config: Config,
    target: impl Into<Target>,
    build_dir: impl Into<PathBuf>,
    src_dir: impl Into<PathBuf>,
  ) -> Self {
    Self {
      config,
      target: target.into(),
      build_dir: build_dir.into(),
      src_dir: src_dir.into(),
    }
  }

  /// `<build_dir>/app`
  pub fn app_dir(&self) -> PathBuf {
    self.build_dir.join(APP_DIR)
  }

  /// `<build_dir>/wkhtmltox`
  pub fn staging_dir(&self) -> PathBuf {
    self.build_dir.join(STAGING_DIR)
  }

  /// `<build_dir>/dist`
  pub fn dist_dir(&self) -> PathBuf {
    self.build_dir.join(DIST_DIR)
  }
}

/// Result of `prepare_build`.
#[derive(Debug, Clone, Serialize)]
pub struct Prepared {
  /// Environment for the build system and every later command.
  pub env: BuildEnvironment,
  /// Extra general build-system arguments (prefix, defines, libraries).
  pub build_args: String,
  /// Extra build-system variable overrides.
  pub build_system_args: String,
}

/// Result of `package_build`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PackageOutcome {
  /// Packaging ran. `artifacts` lists the files this crate placed; tools
  /// that choose their own output location contribute nothing.
  Packaged { artifacts: Vec<PathBuf> },
  /// An optional tool was missing and no package was produced.
  Skipped { reason: String },
}
