//! macOS pipeline: libc++ toolchain flags and an `fpm`-built `.pkg`.
//!
//! The package does not install files directly. It carries a root-owned
//! tarball of the staged tree plus an `extract.sh` post-install hook that
//! unpacks it into `/usr/local` and drops a generated uninstaller next to the
//! binaries.

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use super::types::{BuildContext, PackageOutcome, PipelineError, Prepared};
use super::{Pipeline, staged_install};
use crate::command::{CommandRunner, Invocation};
use crate::consts::{
  ARCHIVE, DIST_DIR, EXTRACT_SCRIPT, MACOS_COMPILER_FLAGS, MACOS_FLAG_VARS, MACOS_IDENTIFIER_PREFIX,
  MACOS_INSTALLER_PREFIX, UNINSTALLER,
};
use crate::environment::BuildEnvironment;
use crate::platform::os::Os;
use crate::scripts::{extract_script, staged_files, uninstaller_script};
use crate::util::path::normalize_path;
use crate::version::Version;

#[derive(Debug, Default, Clone, Copy)]
pub struct MacOsPipeline;

impl Pipeline for MacOsPipeline {
  fn os(&self) -> Os {
    Os::MacOs
  }

  fn prepare_build(
    &self,
    ctx: &BuildContext,
    base: &BuildEnvironment,
    _runner: &mut dyn CommandRunner,
  ) -> Result<Prepared, PipelineError> {
    ctx.config.target(&ctx.target)?;

    let mut env = base.clone();
    let mut build_system_args = String::new();

    for var in MACOS_FLAG_VARS {
      env = env.with_var(var, MACOS_COMPILER_FLAGS);
      build_system_args.push_str(&format!(
        "\"QMAKE_{var}+=-fvisibility=hidden -fvisibility-inlines-hidden\" "
      ));
    }

    let build_args = format!("--prefix={}", ctx.build_dir.join("qt").display());
    debug!(target = %ctx.target, %build_args, "prepared macOS build");

    Ok(Prepared {
      env,
      build_args,
      build_system_args,
    })
  }

  fn package_build(
    &self,
    ctx: &BuildContext,
    version: &Version,
    env: &BuildEnvironment,
    runner: &mut dyn CommandRunner,
  ) -> Result<PackageOutcome, PipelineError> {
    info!(target = %ctx.target, %version, "packaging for macOS");
    runner.run(&staged_install("make", ctx), env)?;

    let dist_dir = ctx.dist_dir();
    recreate_dir(&dist_dir)?;

    let staging_dir = ctx.staging_dir();
    let user = env
      .get("USER")
      .map(str::to_string)
      .unwrap_or_else(whoami::username);
    for invocation in archive_invocations(&staging_dir, &user) {
      runner.run(&invocation, env)?;
    }

    let files = staged_files(&staging_dir)?;
    debug!(count = files.len(), "generating uninstaller");
    let uninstaller = dist_dir.join(UNINSTALLER);
    write_file(&uninstaller, &uninstaller_script(&files))?;

    let extract = ctx.build_dir.join(EXTRACT_SCRIPT);
    write_file(&extract, &extract_script())?;

    make_executable(&extract)?;
    make_executable(&uninstaller)?;

    runner.run(&fpm_invocation(ctx, version), env)?;

    let artifacts = move_packages_up(&ctx.build_dir)?;
    info!(?artifacts, "macOS package ready");
    Ok(PackageOutcome::Packaged { artifacts })
  }
}

/// Archive the staged tree owned by `root:wheel`, then hand it back to `user`.
pub fn archive_invocations(staging_dir: &Path, user: &str) -> [Invocation; 3] {
  let archive = format!("../{DIST_DIR}/{ARCHIVE}");
  [
    Invocation::new("sudo")
      .args(["chown", "-R", "root:wheel", "."])
      .current_dir(staging_dir),
    Invocation::new("tar")
      .args(["zcf", archive.as_str(), "."])
      .current_dir(staging_dir),
    Invocation::new("sudo")
      .args(["chown", "-R", user, "."])
      .current_dir(staging_dir),
  ]
}

/// The `fpm` call building the `.pkg` from `dist/`.
pub fn fpm_invocation(ctx: &BuildContext, version: &Version) -> Invocation {
  let mut invocation = Invocation::new("fpm")
    .args([
      "-t",
      "osxpkg",
      "--osxpkg-identifier-prefix",
      MACOS_IDENTIFIER_PREFIX,
      "-f",
      "-s",
      "dir",
      "--after-install",
      EXTRACT_SCRIPT,
    ])
    .arg("--version")
    .quoted(version.package_version(&ctx.target));

  for (key, value) in ctx.config.fpm_params() {
    invocation = invocation.arg(format!("--{key}")).quoted(value);
  }

  invocation
    .args(["--prefix", MACOS_INSTALLER_PREFIX, "-C", DIST_DIR, "."])
    .current_dir(&ctx.build_dir)
}

fn recreate_dir(dir: &Path) -> Result<(), PipelineError> {
  if dir.exists() {
    std::fs::remove_dir_all(dir).map_err(PipelineError::io(dir))?;
  }
  std::fs::create_dir_all(dir).map_err(PipelineError::io(dir))
}

fn write_file(path: &Path, content: &str) -> Result<(), PipelineError> {
  std::fs::write(path, content).map_err(PipelineError::io(path))
}

#[cfg(unix)]
fn make_executable(path: &Path) -> Result<(), PipelineError> {
  use std::os::unix::fs::PermissionsExt;

  let mut perms = std::fs::metadata(path).map_err(PipelineError::io(path))?.permissions();
  perms.set_mode(perms.mode() | 0o111);
  std::fs::set_permissions(path, perms).map_err(PipelineError::io(path))
}

#[cfg(not(unix))]
fn make_executable(_path: &Path) -> Result<(), PipelineError> {
  Ok(())
}

/// Move every `wk*.pkg` in `build_dir` to its parent directory.
fn move_packages_up(build_dir: &Path) -> Result<Vec<PathBuf>, PipelineError> {
  let mut moved = Vec::new();

  for entry in std::fs::read_dir(build_dir).map_err(PipelineError::io(build_dir))? {
    let entry = entry.map_err(PipelineError::io(build_dir))?;
    let name = entry.file_name();
    let Some(name) = name.to_str() else { continue };
    if !(name.starts_with("wk") && name.ends_with(".pkg")) || !entry.path().is_file() {
      continue;
    }

    let dest = normalize_path(&build_dir.join("..").join(name));
    std::fs::rename(entry.path(), &dest).map_err(PipelineError::io(&dest))?;
    moved.push(dest);
  }

  if moved.is_empty() {
    return Err(PipelineError::MissingArtifact {
      dir: build_dir.display().to_string(),
      pattern: "wk*.pkg",
    });
  }

  moved.sort();
  Ok(moved)
}
