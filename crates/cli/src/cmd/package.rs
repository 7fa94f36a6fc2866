//! Implementation of the `wkpack package` command.
//!
//! Runs preparation again to obtain the build environment (nothing persists
//! between processes), then stages the install output and packages it.

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use owo_colors::OwoColorize;

use wkpack_lib::command::SystemRunner;
use wkpack_lib::consts::NSIS_TOOL;
use wkpack_lib::pipeline::pipeline_with_tools;
use wkpack_lib::tools::{RegistryToolResolver, StaticToolResolver, ToolResolver};
use wkpack_lib::{BuildEnvironment, PackageOutcome, Version};

use super::load_context;
use crate::BuildArgs;
use crate::output::{OutputFormat, format_duration, print_json, print_success, print_warning, symbols};

pub fn cmd_package(
  args: &BuildArgs,
  release: &str,
  iteration: &str,
  nsis_dir: Option<PathBuf>,
  format: OutputFormat,
) -> Result<()> {
  let start = Instant::now();
  let ctx = load_context(args)?;

  let tools: Box<dyn ToolResolver> = match nsis_dir {
    Some(dir) => Box::new(StaticToolResolver::new().with_tool(NSIS_TOOL, dir)),
    None => Box::new(RegistryToolResolver),
  };
  let pipeline = pipeline_with_tools(&ctx.target, tools)?;
  let mut runner = SystemRunner::new();

  let prepared = pipeline
    .prepare_build(&ctx, &BuildEnvironment::from_process(), &mut runner)
    .with_context(|| format!("Failed to prepare build for {}", ctx.target))?;

  let version = Version::new(release, iteration);
  let outcome = pipeline
    .package_build(&ctx, &version, &prepared.env, &mut runner)
    .with_context(|| format!("Failed to package {} {}", ctx.target, version))?;

  if format.is_json() {
    return print_json(&outcome);
  }

  match outcome {
    PackageOutcome::Packaged { artifacts } => {
      print_success(&format!(
        "Packaged {} {} in {}",
        ctx.target,
        version,
        format_duration(start.elapsed())
      ));
      for artifact in artifacts {
        println!("  {} {}", symbols::ARROW.cyan(), artifact.display());
      }
    }
    PackageOutcome::Skipped { reason } => {
      print_warning(&format!("No package built for {}: {}", ctx.target, reason));
    }
  }

  Ok(())
}
