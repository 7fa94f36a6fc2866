//! Host and target platform identification.

pub mod os;

use std::fmt;

use os::Os;

/// The machine this process runs on (e.g. "x86_64-macos")
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Host {
  pub arch: &'static str,
  pub os: Os,
}

impl Host {
  /// Detect the current host at runtime
  ///
  /// Returns `None` if the OS is not supported
  pub fn current() -> Option<Self> {
    Some(Self {
      arch: std::env::consts::ARCH,
      os: Os::current()?,
    })
  }

  /// Returns true when a pipeline for `os` can run natively on this host.
  pub fn can_package_for(&self, os: Os) -> bool {
    self.os == os
  }
}

impl fmt::Display for Host {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}-{}", self.arch, self.os)
  }
}
