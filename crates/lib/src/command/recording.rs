//! A runner that records invocations instead of spawning them.
//!
//! Lets the pipelines be exercised without the external toolchain installed.

use tracing::info;

use super::{CommandError, CommandRunner, Invocation};
use crate::environment::BuildEnvironment;

#[derive(Debug, Default, Clone)]
pub struct RecordingRunner {
  calls: Vec<Invocation>,
  responses: Vec<(String, String)>,
  failures: Vec<String>,
}

impl RecordingRunner {
  pub fn new() -> Self {
    Self::default()
  }

  /// Answer invocations whose command line contains `pattern` with `stdout`.
  pub fn respond_to(mut self, pattern: impl Into<String>, stdout: impl Into<String>) -> Self {
    self.responses.push((pattern.into(), stdout.into()));
    self
  }

  /// Fail invocations whose command line contains `pattern` with exit code 1.
  pub fn fail_on(mut self, pattern: impl Into<String>) -> Self {
    self.failures.push(pattern.into());
    self
  }

  pub fn calls(&self) -> &[Invocation] {
    &self.calls
  }

  /// Rendered command lines in call order.
  pub fn commands(&self) -> Vec<String> {
    self.calls.iter().map(Invocation::display).collect()
  }
}

impl CommandRunner for RecordingRunner {
  fn run(&mut self, invocation: &Invocation, _env: &BuildEnvironment) -> Result<String, CommandError> {
    let cmd = invocation.display();
    info!(cmd = %cmd, cwd = ?invocation.get_current_dir(), "would execute command");
    self.calls.push(invocation.clone());

    if self.failures.iter().any(|pattern| cmd.contains(pattern.as_str())) {
      return Err(CommandError::Failed { cmd, code: Some(1) });
    }

    Ok(
      self
        .responses
        .iter()
        .find(|(pattern, _)| cmd.contains(pattern.as_str()))
        .map(|(_, stdout)| stdout.clone())
        .unwrap_or_default(),
    )
  }
}
