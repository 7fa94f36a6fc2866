//! Target pipelines.
//!
//! Each supported platform implements [`Pipeline`], a two-phase contract:
//! - `prepare_build` runs before the product build and yields the build
//!   environment plus extra arguments for the build system
//! - `package_build` runs after the build and turns the install output into
//!   a distributable package
//!
//! The caller owns the build directory for the lifetime of a pipeline run;
//! nothing here locks it.

pub mod macos;
pub mod types;
pub mod windows;

use tracing::warn;

use crate::command::{CommandRunner, Invocation};
use crate::environment::BuildEnvironment;
use crate::platform::Host;
use crate::platform::os::Os;
use crate::target::Target;
use crate::tools::{RegistryToolResolver, ToolResolver};
use crate::version::Version;

pub use macos::MacOsPipeline;
pub use types::{BuildContext, PackageOutcome, PipelineError, Prepared};
pub use windows::WindowsPipeline;

/// Build preparation and packaging for one platform.
pub trait Pipeline {
  /// The platform this pipeline packages for.
  fn os(&self) -> Os;

  /// Compute the build environment and extra build-system arguments.
  ///
  /// Does not modify the process environment; the returned environment must
  /// be passed to every later command, including `package_build`.
  fn prepare_build(
    &self,
    ctx: &BuildContext,
    base: &BuildEnvironment,
    runner: &mut dyn CommandRunner,
  ) -> Result<Prepared, PipelineError>;

  /// Stage the install output and produce the platform package.
  fn package_build(
    &self,
    ctx: &BuildContext,
    version: &Version,
    env: &BuildEnvironment,
    runner: &mut dyn CommandRunner,
  ) -> Result<PackageOutcome, PipelineError>;
}

/// Select the pipeline for `target`, discovering tools from the registry.
pub fn pipeline_for(target: &Target) -> Result<Box<dyn Pipeline>, PipelineError> {
  pipeline_with_tools(target, Box::new(RegistryToolResolver))
}

/// Select the pipeline for `target` using `tools` for optional tool discovery.
pub fn pipeline_with_tools(target: &Target, tools: Box<dyn ToolResolver>) -> Result<Box<dyn Pipeline>, PipelineError> {
  let os = target
    .os()
    .ok_or_else(|| PipelineError::UnsupportedTarget(target.to_string()))?;

  if let Some(host) = Host::current() {
    if !host.can_package_for(os) {
      warn!(%target, %host, "target platform differs from host, external tools may be missing");
    }
  }

  let pipeline: Box<dyn Pipeline> = match os {
    Os::MacOs => Box::new(MacOsPipeline),
    Os::Windows => Box::new(WindowsPipeline::new(tools)),
    Os::Linux => return Err(PipelineError::UnsupportedTarget(target.to_string())),
  };
  Ok(pipeline)
}

/// `<make> install INSTALL_ROOT=<staging dir>`, run in the `app` directory.
pub(crate) fn staged_install(make: &str, ctx: &BuildContext) -> Invocation {
  Invocation::new(make)
    .arg("install")
    .arg(format!("INSTALL_ROOT={}", ctx.staging_dir().display()))
    .current_dir(ctx.app_dir())
}
