//! Discovery of optional third-party tools.
//!
//! Tools such as NSIS record their install directory in the Windows registry
//! under `HKLM\SOFTWARE\<name>`. Because the toolchain and the OS may differ in
//! bitness, the lookup is retried in each registry view (see
//! [`RegistryView::PROBE_ORDER`]).

use std::collections::HashMap;
use std::path::PathBuf;

use tracing::debug;

/// Finds where an optional tool is installed.
pub trait ToolResolver {
  /// Install directory of `name`, or `None` if it is not installed.
  fn resolve_installed_tool(&self, name: &str) -> Option<PathBuf>;
}

/// A registry view to read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistryView {
  /// Whatever view matches the bitness of this process.
  Default,
  /// The 64-bit view, even from a 32-bit process.
  Wow64_64,
  /// The 32-bit view, even from a 64-bit process.
  Wow64_32,
}

impl RegistryView {
  pub const PROBE_ORDER: [RegistryView; 3] = [RegistryView::Default, RegistryView::Wow64_64, RegistryView::Wow64_32];

  #[cfg(windows)]
  fn flags(self) -> windows_sys::Win32::System::Registry::REG_ROUTINE_FLAGS {
    use windows_sys::Win32::System::Registry::{RRF_SUBKEY_WOW6432KEY, RRF_SUBKEY_WOW6464KEY};

    match self {
      RegistryView::Default => 0,
      RegistryView::Wow64_64 => RRF_SUBKEY_WOW6464KEY,
      RegistryView::Wow64_32 => RRF_SUBKEY_WOW6432KEY,
    }
  }
}

/// Try `read` in every view of [`RegistryView::PROBE_ORDER`], returning the first hit.
pub fn probe_views<T>(mut read: impl FnMut(RegistryView) -> Option<T>) -> Option<T> {
  RegistryView::PROBE_ORDER.into_iter().find_map(|view| {
    let value = read(view);
    debug!(?view, found = value.is_some(), "probed registry view");
    value
  })
}

/// Resolves tools from the `HKLM\SOFTWARE\<name>` default value.
///
/// Always resolves nothing on non-Windows hosts.
#[derive(Debug, Default, Clone, Copy)]
pub struct RegistryToolResolver;

impl ToolResolver for RegistryToolResolver {
  fn resolve_installed_tool(&self, name: &str) -> Option<PathBuf> {
    let subkey = format!("SOFTWARE\\{}", name);
    let value = probe_views(|view| read_default_value(&subkey, view))?;
    if value.is_empty() {
      return None;
    }
    Some(PathBuf::from(value))
  }
}

#[cfg(windows)]
fn read_default_value(subkey: &str, view: RegistryView) -> Option<String> {
  use std::ptr;
  use windows_sys::Win32::Foundation::ERROR_SUCCESS;
  use windows_sys::Win32::System::Registry::{HKEY_LOCAL_MACHINE, RRF_RT_REG_SZ, RegGetValueW};

  let subkey: Vec<u16> = subkey.encode_utf16().chain(std::iter::once(0)).collect();
  let flags = RRF_RT_REG_SZ | view.flags();

  let mut size: u32 = 0;
  // SAFETY: subkey is NUL-terminated; a null data pointer only queries the size.
  let status = unsafe {
    RegGetValueW(
      HKEY_LOCAL_MACHINE,
      subkey.as_ptr(),
      ptr::null(),
      flags,
      ptr::null_mut(),
      ptr::null_mut(),
      &mut size,
    )
  };
  if status != ERROR_SUCCESS || size == 0 {
    return None;
  }

  let mut buffer = vec![0u16; (size as usize).div_ceil(2)];
  // SAFETY: buffer holds at least `size` bytes.
  let status = unsafe {
    RegGetValueW(
      HKEY_LOCAL_MACHINE,
      subkey.as_ptr(),
      ptr::null(),
      flags,
      ptr::null_mut(),
      buffer.as_mut_ptr().cast(),
      &mut size,
    )
  };
  if status != ERROR_SUCCESS {
    return None;
  }

  let len = buffer.iter().position(|&c| c == 0).unwrap_or(buffer.len());
  Some(String::from_utf16_lossy(&buffer[..len]))
}

#[cfg(not(windows))]
fn read_default_value(_subkey: &str, _view: RegistryView) -> Option<String> {
  None
}

/// Resolves tools from a fixed name-to-directory table.
#[derive(Debug, Default, Clone)]
pub struct StaticToolResolver {
  tools: HashMap<String, PathBuf>,
}

impl StaticToolResolver {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with_tool(mut self, name: impl Into<String>, dir: impl Into<PathBuf>) -> Self {
    self.tools.insert(name.into(), dir.into());
    self
  }
}

impl ToolResolver for StaticToolResolver {
  fn resolve_installed_tool(&self, name: &str) -> Option<PathBuf> {
    self.tools.get(name).cloned()
  }
}
