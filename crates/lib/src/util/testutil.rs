//! Test utilities for stitch-lib.
//!
//! Cross-platform helpers that build `Cmd`s for shell snippets and prepare files
//! with controlled timestamps.

use std::fs::File;
use std::path::Path;
use std::time::{Duration, SystemTime};

use crate::cmd::Cmd;

/// A command that runs `script` through the platform shell.
#[cfg(unix)]
pub fn shell_cmd(script: &str) -> Cmd {
  ["/bin/sh", "-c", script].into_iter().collect()
}

#[cfg(windows)]
pub fn shell_cmd(script: &str) -> Cmd {
  ["cmd.exe", "/C", script].into_iter().collect()
}

/// A command that exits with `code` and does nothing else.
pub fn exit_with(code: i32) -> Cmd {
  shell_cmd(&format!("exit {}", code))
}

/// A command that prints `msg` on stdout.
#[cfg(unix)]
pub fn echo_msg(msg: &str) -> Cmd {
  ["/bin/echo", msg].into_iter().collect()
}

#[cfg(windows)]
pub fn echo_msg(msg: &str) -> Cmd {
  shell_cmd(&format!("echo {}", msg))
}

/// Write `contents` to `path` and mark it executable.
#[cfg(unix)]
pub fn write_script(path: &Path, contents: &str) {
  use std::os::unix::fs::PermissionsExt;

  std::fs::write(path, contents).unwrap();
  std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755)).unwrap();
}

/// Create (or overwrite) `path` with its modification time `secs` past a fixed base.
pub fn touch_at(path: &Path, secs: u64) {
  let file = File::create(path).unwrap();
  file.set_modified(mtime(secs)).unwrap();
}

/// Move the modification time of an existing file.
pub fn set_mtime(path: &Path, secs: u64) {
  let file = File::options().write(true).open(path).unwrap();
  file.set_modified(mtime(secs)).unwrap();
}

fn mtime(secs: u64) -> SystemTime {
  SystemTime::UNIX_EPOCH + Duration::from_secs(1_700_000_000 + secs)
}
