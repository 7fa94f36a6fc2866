//! Immutable build environment.
//!
//! Preparation never touches the process environment. It returns a
//! [`BuildEnvironment`] that every later [`Invocation`](crate::command::Invocation)
//! is spawned with.

use std::collections::BTreeMap;
use std::process::Command;

use serde::Serialize;

/// A complete set of environment variables for spawned commands.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct BuildEnvironment {
  vars: BTreeMap<String, String>,
}

impl BuildEnvironment {
  /// Snapshot the current process environment.
  ///
  /// Variables whose name or value is not valid Unicode are skipped.
  pub fn from_process() -> Self {
    Self::from_vars(
      std::env::vars_os().filter_map(|(key, value)| Some((key.into_string().ok()?, value.into_string().ok()?))),
    )
  }

  pub fn from_vars<K, V>(vars: impl IntoIterator<Item = (K, V)>) -> Self
  where
    K: Into<String>,
    V: Into<String>,
  {
    Self::default().merged(vars)
  }

  /// Look up a variable. Names are case-insensitive on Windows.
  pub fn get(&self, key: &str) -> Option<&str> {
    self
      .vars
      .get(key)
      .or_else(|| self.vars.iter().find(|(k, _)| same_key(k, key)).map(|(_, v)| v))
      .map(String::as_str)
  }

  /// Return a copy with `key` set to `value`.
  pub fn with_var(self, key: impl Into<String>, value: impl Into<String>) -> Self {
    self.merged([(key.into(), value.into())])
  }

  /// Return a copy with every pair of `vars` layered on top.
  pub fn merged<K, V>(mut self, vars: impl IntoIterator<Item = (K, V)>) -> Self
  where
    K: Into<String>,
    V: Into<String>,
  {
    for (key, value) in vars {
      let key = key.into();
      self.vars.retain(|existing, _| !same_key(existing, &key));
      self.vars.insert(key, value.into());
    }
    self
  }

  pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
    self.vars.iter().map(|(k, v)| (k.as_str(), v.as_str()))
  }

  pub fn len(&self) -> usize {
    self.vars.len()
  }

  pub fn is_empty(&self) -> bool {
    self.vars.is_empty()
  }

  /// Variables that are new or different compared to `base`.
  pub fn changes_from<'a>(&'a self, base: &'a BuildEnvironment) -> BTreeMap<&'a str, &'a str> {
    self
      .iter()
      .filter(|(key, value)| base.get(key) != Some(*value))
      .collect()
  }

  /// Replace the environment of `command` with this one.
  pub fn apply(&self, command: &mut Command) {
    command.env_clear().envs(&self.vars);
  }
}

#[cfg(windows)]
fn same_key(a: &str, b: &str) -> bool {
  a.eq_ignore_ascii_case(b)
}

#[cfg(not(windows))]
fn same_key(a: &str, b: &str) -> bool {
  a == b
}
