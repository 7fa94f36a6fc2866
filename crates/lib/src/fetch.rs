//! Downloads with optional SHA-256 verification.
//!
//! The download itself is delegated to `curl` so that proxies and TLS setup
//! of the build machine apply unchanged.

use std::io::Read;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};
use thiserror::Error;
use tracing::{debug, info};

use crate::command::{CommandError, CommandRunner, Invocation};
use crate::environment::BuildEnvironment;

#[derive(Debug, Error)]
pub enum FetchError {
  #[error(transparent)]
  Command(#[from] CommandError),

  #[error("download of {url} did not produce {path}")]
  NotDownloaded { url: String, path: String },

  #[error("hash mismatch for {url}: expected {expected}, got {actual}")]
  HashMismatch {
    url: String,
    expected: String,
    actual: String,
  },

  #[error("failed to read {path}: {source}")]
  Read {
    path: String,
    #[source]
    source: std::io::Error,
  },
}

/// `curl -fsSL -o <file_name> "<url>"`, run inside `dir`.
pub fn download_invocation(url: &str, file_name: &str, dir: &Path) -> Invocation {
  Invocation::new("curl")
    .args(["-fsSL", "-o", file_name])
    .quoted(url)
    .current_dir(dir)
}

/// Download `url` to `dir/file_name`.
///
/// When `expected_sha256` is given the file is hashed after download and a
/// mismatch is an error. The file is left in place either way.
pub fn fetch(
  runner: &mut dyn CommandRunner,
  env: &BuildEnvironment,
  url: &str,
  dir: &Path,
  file_name: &str,
  expected_sha256: Option<&str>,
) -> Result<PathBuf, FetchError> {
  info!(url = %url, "fetching URL");

  let dest_path = dir.join(file_name);
  runner.run(&download_invocation(url, file_name, dir), env)?;

  let Some(expected) = expected_sha256 else {
    debug!(path = ?dest_path, "no checksum configured, skipping verification");
    return Ok(dest_path);
  };

  if !dest_path.exists() {
    return Err(FetchError::NotDownloaded {
      url: url.to_string(),
      path: dest_path.display().to_string(),
    });
  }

  let actual = hash_file(&dest_path)?;
  if !actual.eq_ignore_ascii_case(expected) {
    return Err(FetchError::HashMismatch {
      url: url.to_string(),
      expected: expected.to_string(),
      actual,
    });
  }

  info!(path = ?dest_path, "download verified");
  Ok(dest_path)
}

/// Compute the lowercase hex SHA-256 of a file.
pub fn hash_file(path: &Path) -> Result<String, FetchError> {
  let read_err = |source| FetchError::Read {
    path: path.display().to_string(),
    source,
  };

  let mut file = std::fs::File::open(path).map_err(read_err)?;
  let mut hasher = Sha256::new();
  let mut buffer = [0u8; 8192];

  loop {
    let bytes_read = file.read(&mut buffer).map_err(read_err)?;
    if bytes_read == 0 {
      break;
    }
    hasher.update(&buffer[..bytes_read]);
  }

  Ok(hex::encode(hasher.finalize()))
}
