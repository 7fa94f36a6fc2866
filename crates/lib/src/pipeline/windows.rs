//! Windows pipeline: MSVC toolset environment and an NSIS installer.
//!
//! Preparation locates the Visual Studio install for the configured MSVC
//! version, runs its `vcvarsall.bat` and captures the resulting environment.
//! Packaging is skipped, without error, on machines without NSIS.

use std::fmt;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use super::types::{BuildContext, PackageOutcome, PipelineError, Prepared};
use super::{Pipeline, staged_install};
use crate::command::{CommandRunner, Invocation};
use crate::consts::{MAKENSIS, NSIS_TOOL, VCREDIST, WINDOWS_BUILD_ARGS};
use crate::environment::BuildEnvironment;
use crate::fetch::fetch;
use crate::platform::os::Os;
use crate::target::Target;
use crate::tools::ToolResolver;
use crate::util::path::normalize_path;
use crate::version::Version;

/// Argument passed to `vcvarsall.bat`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolsetArch {
  /// 32-bit compiler for 32-bit code.
  X86,
  /// Native 64-bit compiler.
  Amd64,
  /// 32-bit hosted compiler producing 64-bit code.
  X86Amd64,
}

impl ToolsetArch {
  /// Pick the toolset for `target` from the VC directory `msvc_dir`.
  ///
  /// 64-bit targets prefer the native compiler when `bin/amd64/cl.exe`
  /// exists and fall back to the cross compiler otherwise.
  pub fn select(target: &Target, msvc_dir: &Path) -> Self {
    if !target.is_win64() {
      return Self::X86;
    }
    if msvc_dir.join("bin").join("amd64").join("cl.exe").exists() {
      Self::Amd64
    } else {
      Self::X86Amd64
    }
  }

  pub fn as_str(&self) -> &'static str {
    match self {
      Self::X86 => "x86",
      Self::Amd64 => "amd64",
      Self::X86Amd64 => "x86_amd64",
    }
  }
}

impl fmt::Display for ToolsetArch {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

pub struct WindowsPipeline {
  tools: Box<dyn ToolResolver>,
}

impl WindowsPipeline {
  pub fn new(tools: Box<dyn ToolResolver>) -> Self {
    Self { tools }
  }

  /// Directory of an NSIS install that actually contains `makensis.exe`.
  fn nsis_dir(&self) -> Option<PathBuf> {
    self
      .tools
      .resolve_installed_tool(NSIS_TOOL)
      .filter(|dir| dir.join(MAKENSIS).exists())
  }
}

impl fmt::Debug for WindowsPipeline {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("WindowsPipeline").finish_non_exhaustive()
  }
}

impl Pipeline for WindowsPipeline {
  fn os(&self) -> Os {
    Os::Windows
  }

  fn prepare_build(
    &self,
    ctx: &BuildContext,
    base: &BuildEnvironment,
    runner: &mut dyn CommandRunner,
  ) -> Result<Prepared, PipelineError> {
    let msvc_version = ctx.config.msvc_version(&ctx.target)?;
    let msvc_dir = locate_msvc(&ctx.target, msvc_version, base)?;

    let vcvarsall = msvc_dir.join("vcvarsall.bat");
    if !vcvarsall.exists() {
      return Err(PipelineError::ToolchainNotFound {
        target: ctx.target.to_string(),
        message: format!("{} does not exist", vcvarsall.display()),
      });
    }

    let arch = ToolsetArch::select(&ctx.target, &msvc_dir);
    info!(target = %ctx.target, %msvc_version, %arch, "capturing MSVC environment");

    let stdout = runner.run(&vcvars_invocation(&vcvarsall, arch), base)?;
    let captured = parse_set_output(&stdout);
    debug!(count = captured.len(), "captured environment variables");

    Ok(Prepared {
      env: base.clone().merged(captured),
      build_args: WINDOWS_BUILD_ARGS.to_string(),
      build_system_args: String::new(),
    })
  }

  fn package_build(
    &self,
    ctx: &BuildContext,
    version: &Version,
    env: &BuildEnvironment,
    runner: &mut dyn CommandRunner,
  ) -> Result<PackageOutcome, PipelineError> {
    info!(target = %ctx.target, %version, "packaging for Windows");
    runner.run(&staged_install("nmake", ctx), env)?;

    let Some(nsis_dir) = self.nsis_dir() else {
      warn!(target = %ctx.target, "NSIS not found, skipping installer generation");
      return Ok(PackageOutcome::Skipped {
        reason: format!("{} is not installed", NSIS_TOOL),
      });
    };

    let msvc_version = ctx.config.msvc_version(&ctx.target)?;
    let redist_url = ctx.config.msvc_redist(&ctx.target)?;
    let redist_sha256 = ctx.config.target(&ctx.target)?.msvc_redist_sha256.as_deref();

    fetch(runner, env, redist_url, &ctx.build_dir, VCREDIST, redist_sha256)?;

    let invocation = makensis_invocation(ctx, version, &nsis_dir, msvc_version);
    runner.run(&invocation, env)?;

    info!(target = %ctx.target, "installer generated");
    Ok(PackageOutcome::Packaged { artifacts: Vec::new() })
  }
}

/// `<VS<ver>COMNTOOLS>/../../VC` for the configured Visual Studio version.
fn locate_msvc(target: &Target, msvc_version: &str, env: &BuildEnvironment) -> Result<PathBuf, PipelineError> {
  let var = format!("VS{}COMNTOOLS", msvc_version.replace('.', ""));
  let tool_dir = env.get(&var).ok_or_else(|| PipelineError::ToolchainNotFound {
    target: target.to_string(),
    message: format!("{var} is not set"),
  })?;

  Ok(normalize_path(&Path::new(tool_dir).join("..").join("..").join("VC")))
}

/// Run `vcvarsall.bat` and dump the resulting environment with `set`.
pub fn vcvars_invocation(vcvarsall: &Path, arch: ToolsetArch) -> Invocation {
  Invocation::shell(format!("(\"{}\" {}>nul)&&set", vcvarsall.display(), arch))
}

/// Parse `KEY=VALUE` lines as printed by `set`.
pub fn parse_set_output(stdout: &str) -> Vec<(String, String)> {
  stdout
    .lines()
    .filter_map(|line| {
      let (key, value) = line.trim_end_matches('\r').split_once('=')?;
      (!key.is_empty()).then(|| (key.to_string(), value.to_string()))
    })
    .collect()
}

/// The `makensis` call producing the installer.
pub fn makensis_invocation(ctx: &BuildContext, version: &Version, nsis_dir: &Path, msvc_version: &str) -> Invocation {
  Invocation::executable(&nsis_dir.join(MAKENSIS))
    .arg("/NOCD")
    .arg(format!("/DVERSION={}", version.hyphenated()))
    .arg(format!("/DSIMPLE_VERSION={}", version.nsis_version()))
    .arg(format!("/DTARGET={}", ctx.target))
    .arg(format!("/DMSVC={msvc_version}"))
    .arg(format!("/DARCH={}", ctx.target.arch_suffix()))
    .arg(format!("/DLICENSE={}", ctx.src_dir.join("LICENSE").display()))
    .quoted(ctx.config.nsis_script(&ctx.src_dir).display().to_string())
    .current_dir(&ctx.build_dir)
}
