pub mod os;

use std::ffi::OsString;
use std::path::{Path, PathBuf};

pub use os::Os;

/// Returns the literal on-disk path of an executable named `path` on `os`.
///
/// Process-creation and rename calls need the real filename, so `./stitch` becomes
/// `./stitch.exe` on Windows. Paths that already carry the suffix (in any case) are
/// returned unchanged.
pub fn exe_path(path: &Path, os: Os) -> PathBuf {
  let suffix = os.exe_suffix();
  if suffix.is_empty() {
    return path.to_path_buf();
  }

  let name = path.as_os_str().to_string_lossy();
  if name.to_ascii_lowercase().ends_with(suffix) {
    return path.to_path_buf();
  }

  let mut with_suffix = OsString::from(path.as_os_str());
  with_suffix.push(suffix);
  PathBuf::from(with_suffix)
}

/// `exe_path` for the OS this binary was built for.
pub fn current_exe_path(path: &Path) -> PathBuf {
  match Os::current() {
    Some(os) => exe_path(path, os),
    None => path.to_path_buf(),
  }
}

/// Short description of the host, e.g. "linux (x86_64)".
pub fn platform_description() -> String {
  let os = Os::current().map(|os| os.as_str()).unwrap_or(std::env::consts::OS);
  format!("{} ({})", os, std::env::consts::ARCH)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn windows_appends_exe() {
    assert_eq!(exe_path(Path::new("./stitch"), Os::Windows), PathBuf::from("./stitch.exe"));
  }

  #[test]
  fn windows_keeps_existing_suffix() {
    assert_eq!(exe_path(Path::new("stitch.exe"), Os::Windows), PathBuf::from("stitch.exe"));
    assert_eq!(exe_path(Path::new("STITCH.EXE"), Os::Windows), PathBuf::from("STITCH.EXE"));
  }

  #[test]
  fn unix_paths_are_untouched() {
    assert_eq!(exe_path(Path::new("./stitch"), Os::Linux), PathBuf::from("./stitch"));
    assert_eq!(exe_path(Path::new("./stitch"), Os::MacOs), PathBuf::from("./stitch"));
  }

  #[test]
  fn description_mentions_arch() {
    assert!(platform_description().contains(std::env::consts::ARCH));
  }
}
