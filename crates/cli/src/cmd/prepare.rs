//! Implementation of the `wkpack prepare` command.
//!
//! Computes the build environment for a target and prints what the build
//! system must be invoked with. The environment is printed as the variables
//! that differ from the current process environment.

use anyhow::{Context, Result};

use wkpack_lib::command::SystemRunner;
use wkpack_lib::{BuildEnvironment, pipeline_for};

use super::load_context;
use crate::BuildArgs;
use crate::output::{OutputFormat, print_env_var, print_json, print_stat, print_success};

pub fn cmd_prepare(args: &BuildArgs, format: OutputFormat) -> Result<()> {
  let ctx = load_context(args)?;
  let pipeline = pipeline_for(&ctx.target)?;

  let base = BuildEnvironment::from_process();
  let prepared = pipeline
    .prepare_build(&ctx, &base, &mut SystemRunner::new())
    .with_context(|| format!("Failed to prepare build for {}", ctx.target))?;
  let changes = prepared.env.changes_from(&base);

  if format.is_json() {
    let json_output = serde_json::json!({
      "target": ctx.target.as_str(),
      "build_args": prepared.build_args,
      "build_system_args": prepared.build_system_args,
      "env": changes,
    });
    print_json(&json_output)?;
    return Ok(());
  }

  print_success(&format!("Prepared {} ({})", ctx.target, pipeline.os()));
  print_stat("Build args", &prepared.build_args);
  print_stat("Build system args", &prepared.build_system_args);
  println!();
  println!("Environment:");
  for (key, value) in changes {
    print_env_var(key, value);
  }

  Ok(())
}
