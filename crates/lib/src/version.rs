//! Version descriptor for a packaged artifact.

use std::fmt;

use crate::target::Target;

/// Release version and package iteration, both opaque strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Version {
  pub release: String,
  pub iteration: String,
}

impl Version {
  pub fn new(release: impl Into<String>, iteration: impl Into<String>) -> Self {
    Self {
      release: release.into(),
      iteration: iteration.into(),
    }
  }

  /// `<release>-<iteration>`
  pub fn hyphenated(&self) -> String {
    format!("{}-{}", self.release, self.iteration)
  }

  /// `<release>-<iteration>.<target>`, the version handed to `fpm`.
  pub fn package_version(&self, target: &Target) -> String {
    format!("{}-{}.{}", self.release, self.iteration, target)
  }

  /// Four-component numeric version as required by NSIS `VIProductVersion`.
  pub fn nsis_version(&self) -> String {
    nsis_version(&self.release)
  }
}

impl fmt::Display for Version {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.hyphenated())
  }
}

/// Drop any pre-release suffix and pad with `.0` up to four components.
///
/// Versions that already have four or more components are left alone.
pub fn nsis_version(release: &str) -> String {
  let mut version = release.split('-').next().unwrap_or_default().to_string();
  while version.matches('.').count() < 3 {
    version.push_str(".0");
  }
  version
}
