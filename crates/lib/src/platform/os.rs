use std::fmt;

/// Operating systems a target can be packaged for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Os {
  Linux,
  MacOs,
  Windows,
}

impl Os {
  /// Detect the operating system this process runs on
  pub fn current() -> Option<Self> {
    match std::env::consts::OS {
      "linux" => Some(Self::Linux),
      "macos" => Some(Self::MacOs),
      "windows" => Some(Self::Windows),
      _ => None,
    }
  }

  /// Infer the operating system a target name builds for.
  ///
  /// `osx-*` and `macos-*` names map to macOS, `msvc*` names map to Windows.
  /// Other targets (Linux distributions, `mxe-*` cross builds) are not handled
  /// by a packaging pipeline here.
  pub fn for_target(target: &str) -> Option<Self> {
    let target = target.to_ascii_lowercase();
    if target.starts_with("osx") || target.starts_with("macos") {
      Some(Self::MacOs)
    } else if target.starts_with("msvc") {
      Some(Self::Windows)
    } else {
      None
    }
  }

  /// Returns the lowercase string identifier for this OS
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Linux => "linux",
      Self::MacOs => "macos",
      Self::Windows => "windows",
    }
  }
}

impl fmt::Display for Os {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.as_str())
  }
}
