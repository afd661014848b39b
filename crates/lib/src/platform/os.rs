use std::fmt;

/// Operating system families with distinct executable conventions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Os {
  Linux,
  MacOs,
  Windows,
}

impl Os {
  /// Detect the current operating system at runtime
  pub fn current() -> Option<Self> {
    match std::env::consts::OS {
      "linux" => Some(Self::Linux),
      "macos" => Some(Self::MacOs),
      "windows" => Some(Self::Windows),
      _ => None,
    }
  }

  /// Returns the lowercase string identifier for this OS
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Linux => "linux",
      Self::MacOs => "darwin",
      Self::Windows => "windows",
    }
  }

  /// Suffix the OS requires on an executable's on-disk name.
  ///
  /// Windows binaries are usually invoked as `./stitch` while the file is `stitch.exe`.
  pub fn exe_suffix(&self) -> &'static str {
    match self {
      Self::Windows => ".exe",
      Self::Linux | Self::MacOs => "",
    }
  }
}

impl fmt::Display for Os {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.as_str())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn current_matches_build_target() {
    let os = Os::current();
    if cfg!(target_os = "linux") {
      assert_eq!(os, Some(Os::Linux));
    } else if cfg!(target_os = "windows") {
      assert_eq!(os, Some(Os::Windows));
    }
  }

  #[test]
  fn only_windows_has_exe_suffix() {
    assert_eq!(Os::Windows.exe_suffix(), ".exe");
    assert_eq!(Os::Linux.exe_suffix(), "");
    assert_eq!(Os::MacOs.exe_suffix(), "");
  }
}
