//! Shared helpers for pipeline tests.

use std::path::PathBuf;

use tempfile::TempDir;
use wkpack_lib::{BuildContext, Config};

/// A throwaway build directory laid out like a finished product build.
pub struct BuildTree {
  pub temp: TempDir,
}

impl BuildTree {
  /// Create `<tmp>/build/app` and an empty `<tmp>/src`.
  pub fn new() -> Self {
    let temp = TempDir::new().unwrap();
    std::fs::create_dir_all(temp.path().join("build").join("app")).unwrap();
    std::fs::create_dir_all(temp.path().join("src")).unwrap();
    Self { temp }
  }

  pub fn build_dir(&self) -> PathBuf {
    self.temp.path().join("build")
  }

  pub fn src_dir(&self) -> PathBuf {
    self.temp.path().join("src")
  }

  pub fn staging_dir(&self) -> PathBuf {
    self.build_dir().join("wkhtmltox")
  }

  /// Write a file relative to the temp root, creating parents.
  pub fn write_file(&self, relative_path: &str, content: &str) -> PathBuf {
    let path = self.temp.path().join(relative_path);
    if let Some(parent) = path.parent() {
      std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(&path, content).unwrap();
    path
  }

  /// Pretend `make install` already ran by populating the staging tree.
  pub fn stage(&self, files: &[&str]) {
    for file in files {
      self.write_file(&format!("build/wkhtmltox/{file}"), "");
    }
  }

  pub fn context(&self, config: Config, target: &str) -> BuildContext {
    BuildContext::new(config, target, self.build_dir(), self.src_dir())
  }
}

pub fn config(json: &str) -> Config {
  Config::from_json(json).unwrap()
}
