//! Shell scripts shipped inside the macOS package.
//!
//! The uninstaller is generated from the staged install tree so that it
//! removes exactly what the package installs.

use std::path::Path;

use walkdir::WalkDir;

use crate::consts::{ARCHIVE, MACOS_IDENTIFIER_PREFIX, MACOS_INSTALL_ROOT, MACOS_INSTALLER_PREFIX, PRODUCT, UNINSTALLER};

/// Every non-directory entry below `root`, relative to it, sorted.
///
/// Symlinks are listed but not followed.
pub fn staged_files(root: &Path) -> Result<Vec<String>, walkdir::Error> {
  let mut files = Vec::new();

  for entry in WalkDir::new(root).sort_by_file_name() {
    let entry = entry?;
    if entry.file_type().is_dir() {
      continue;
    }

    let rel_path = entry.path().strip_prefix(root).unwrap_or(entry.path());
    let rel_path = rel_path
      .components()
      .map(|c| c.as_os_str().to_string_lossy())
      .collect::<Vec<_>>()
      .join("/");
    files.push(rel_path);
  }

  files.sort();
  Ok(files)
}

/// Uninstaller removing `files` (relative to the install root) and itself.
pub fn uninstaller_script<S: AsRef<str>>(files: &[S]) -> String {
  let mut script = format!(
    r#"#!/bin/bash
if [ "$(id -u)" != "0" ]; then
   echo "This script must be run as sudo {uninstaller}" 1>&2
   exit 1
fi
cd {root}
if which pkgutil >/dev/null; then
    pkgutil --forget {identifier}.{product}
fi
"#,
    uninstaller = UNINSTALLER,
    root = MACOS_INSTALL_ROOT,
    identifier = MACOS_IDENTIFIER_PREFIX,
    product = PRODUCT,
  );

  for file in files {
    script.push_str(&remove_line(file.as_ref(), "rm -f"));
  }
  script.push_str(&remove_line(&format!("{MACOS_INSTALL_ROOT}/include/{PRODUCT}"), "rm -df"));
  script.push_str(
    remove_line(&format!("{MACOS_INSTALL_ROOT}/bin/{UNINSTALLER}"), "rm -f").trim_end_matches('\n'),
  );
  script
}

/// `echo REMOVE <absolute> && <rm> <path>`; relative paths are resolved against the install root.
fn remove_line(path: &str, rm: &str) -> String {
  let shown = if path.starts_with('/') {
    path.to_string()
  } else {
    format!("{MACOS_INSTALL_ROOT}/{path}")
  };
  format!("echo REMOVE {shown} && {rm} {path}\n")
}

/// Post-install hook unpacking the archive into the install root.
pub fn extract_script() -> String {
  format!(
    r#"#!/bin/bash
TGTDIR={root}
BASEDIR={prefix}
cd $TGTDIR
tar ozxf $BASEDIR/{archive}
mv $BASEDIR/{uninstaller} $TGTDIR/bin
rm -fr $BASEDIR
"#,
    root = MACOS_INSTALL_ROOT,
    prefix = MACOS_INSTALLER_PREFIX,
    archive = ARCHIVE,
    uninstaller = UNINSTALLER,
  )
}
