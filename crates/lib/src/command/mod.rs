//! External command construction and execution.
//!
//! Every tool the pipelines drive is described by an [`Invocation`]: a program,
//! an ordered argument list and a working directory. The same value is used
//! to spawn the process and to render the exact command line for logs and
//! tests, so argument quoting and ordering are checked without running tools.

mod recording;
mod system;

use std::fmt;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::environment::BuildEnvironment;

pub use recording::RecordingRunner;
pub use system::SystemRunner;

/// Errors raised by a [`CommandRunner`].
#[derive(Debug, Error)]
pub enum CommandError {
  /// The process could not be started.
  #[error("failed to spawn {cmd}: {source}")]
  Spawn {
    cmd: String,
    #[source]
    source: std::io::Error,
  },

  /// The process exited unsuccessfully.
  #[error("command failed with exit code {code:?}: {cmd}")]
  Failed { cmd: String, code: Option<i32> },
}

/// A single argument and how it is rendered on a command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Arg {
  /// Rendered as-is.
  Plain(String),
  /// Rendered wrapped in double quotes.
  Quoted(String),
}

impl Arg {
  /// The value handed to the process.
  pub fn value(&self) -> &str {
    match self {
      Arg::Plain(v) | Arg::Quoted(v) => v,
    }
  }
}

impl fmt::Display for Arg {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Arg::Plain(v) => f.write_str(v),
      Arg::Quoted(v) => write!(f, "\"{}\"", v),
    }
  }
}

/// What gets spawned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Program {
  /// An executable, optionally rendered quoted (paths with spaces).
  Exec { path: String, quoted: bool },
  /// A line interpreted by the platform shell (`/bin/sh -c` or `cmd /c`).
  Shell(String),
}

/// A typed external command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
  program: Program,
  args: Vec<Arg>,
  cwd: Option<PathBuf>,
}

impl Invocation {
  /// Invoke `program` looked up on `PATH`.
  pub fn new(program: impl Into<String>) -> Self {
    Self {
      program: Program::Exec {
        path: program.into(),
        quoted: false,
      },
      args: Vec::new(),
      cwd: None,
    }
  }

  /// Invoke an executable by absolute path, rendered quoted.
  pub fn executable(path: &Path) -> Self {
    Self {
      program: Program::Exec {
        path: path.display().to_string(),
        quoted: true,
      },
      args: Vec::new(),
      cwd: None,
    }
  }

  /// Run `line` through the platform shell.
  ///
  /// Only used where shell redirection and chaining are part of the
  /// contract (toolset environment capture).
  pub fn shell(line: impl Into<String>) -> Self {
    Self {
      program: Program::Shell(line.into()),
      args: Vec::new(),
      cwd: None,
    }
  }

  pub fn arg(mut self, arg: impl Into<String>) -> Self {
    self.args.push(Arg::Plain(arg.into()));
    self
  }

  pub fn args<I, S>(mut self, args: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    self.args.extend(args.into_iter().map(|a| Arg::Plain(a.into())));
    self
  }

  /// Append an argument rendered in double quotes.
  pub fn quoted(mut self, arg: impl Into<String>) -> Self {
    self.args.push(Arg::Quoted(arg.into()));
    self
  }

  pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
    self.cwd = Some(dir.into());
    self
  }

  pub fn program(&self) -> &Program {
    &self.program
  }

  pub fn get_args(&self) -> &[Arg] {
    &self.args
  }

  pub fn get_current_dir(&self) -> Option<&Path> {
    self.cwd.as_deref()
  }

  /// The command line as a shell would read it.
  pub fn display(&self) -> String {
    self.to_string()
  }
}

impl fmt::Display for Invocation {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match &self.program {
      Program::Exec { path, quoted: true } => write!(f, "\"{}\"", path)?,
      Program::Exec { path, quoted: false } => f.write_str(path)?,
      Program::Shell(line) => f.write_str(line)?,
    }
    for arg in &self.args {
      write!(f, " {}", arg)?;
    }
    Ok(())
  }
}

/// Runs invocations to completion.
///
/// Implementations block until the process exits and return its trimmed
/// stdout. A non-zero exit is an error.
pub trait CommandRunner {
  fn run(&mut self, invocation: &Invocation, env: &BuildEnvironment) -> Result<String, CommandError>;
}

impl<R: CommandRunner + ?Sized> CommandRunner for &mut R {
  fn run(&mut self, invocation: &Invocation, env: &BuildEnvironment) -> Result<String, CommandError> {
    (**self).run(invocation, env)
  }
}
