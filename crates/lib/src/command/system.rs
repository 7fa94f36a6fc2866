//! Runs invocations as real child processes.

use std::process::Command;

use tracing::{debug, info};

use super::{CommandError, CommandRunner, Invocation, Program};
use crate::environment::BuildEnvironment;

/// Spawns processes and waits for them.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl SystemRunner {
  pub fn new() -> Self {
    Self
  }
}

impl CommandRunner for SystemRunner {
  fn run(&mut self, invocation: &Invocation, env: &BuildEnvironment) -> Result<String, CommandError> {
    let cmd = invocation.display();
    info!(cmd = %cmd, "executing command");

    let mut command = build_command(invocation);
    env.apply(&mut command);
    if let Some(dir) = invocation.get_current_dir() {
      command.current_dir(dir);
    }

    debug!(working_dir = ?invocation.get_current_dir(), "spawning process");

    let output = command.output().map_err(|source| CommandError::Spawn {
      cmd: cmd.clone(),
      source,
    })?;

    if !output.status.success() {
      let stderr = String::from_utf8_lossy(&output.stderr);
      let stdout = String::from_utf8_lossy(&output.stdout);

      if !stderr.is_empty() {
        debug!(stderr = %stderr, "command stderr");
      }
      if !stdout.is_empty() {
        debug!(stdout = %stdout, "command stdout");
      }

      return Err(CommandError::Failed {
        cmd,
        code: output.status.code(),
      });
    }

    let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();

    if !stdout.is_empty() {
      debug!(stdout = %stdout, "command output");
    }

    Ok(stdout)
  }
}

fn build_command(invocation: &Invocation) -> Command {
  match invocation.program() {
    Program::Exec { path, .. } => {
      let mut command = Command::new(path);
      command.args(invocation.get_args().iter().map(|a| a.value()));
      command
    }
    Program::Shell(line) => shell_command(line),
  }
}

#[cfg(unix)]
fn shell_command(line: &str) -> Command {
  let mut command = Command::new("/bin/sh");
  command.arg("-c").arg(line);
  command
}

// cmd.exe strips the outer quotes itself, so the line is passed verbatim.
#[cfg(windows)]
fn shell_command(line: &str) -> Command {
  use std::os::windows::process::CommandExt;

  let mut command = Command::new("cmd.exe");
  command.raw_arg(format!("/c \"{}\"", line));
  command
}
