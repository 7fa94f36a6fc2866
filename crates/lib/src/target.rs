//! Target identifiers.
//!
//! A target names a platform/architecture combination such as
//! `osx-cocoa-x86-64` or `msvc2015-win64`. The last `-`-separated segment is
//! the architecture suffix handed to the Windows installer generator.

use std::fmt;

use crate::platform::os::Os;

/// Suffix marking a 64-bit Windows target.
const WIN64_SUFFIX: &str = "-win64";

/// A build target identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Target(String);

impl Target {
  pub fn new(name: impl Into<String>) -> Self {
    Self(name.into())
  }

  pub fn as_str(&self) -> &str {
    &self.0
  }

  /// The operating system this target packages for, if any.
  pub fn os(&self) -> Option<Os> {
    Os::for_target(&self.0)
  }

  /// True for 64-bit Windows targets (`*-win64`).
  pub fn is_win64(&self) -> bool {
    self.0.ends_with(WIN64_SUFFIX)
  }

  /// The last `-`-separated segment, e.g. `win64` for `msvc2015-win64`.
  pub fn arch_suffix(&self) -> &str {
    self.0.rsplit('-').next().unwrap_or(&self.0)
  }
}

impl fmt::Display for Target {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}

impl From<String> for Target {
  fn from(name: String) -> Self {
    Self::new(name)
  }
}

impl From<&str> for Target {
  fn from(name: &str) -> Self {
    Self::new(name)
  }
}
