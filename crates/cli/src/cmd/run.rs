//! Implementation of the `stitch run` command.

use std::ffi::OsString;
use std::path::Path;

use anyhow::{Result, bail};

use stitch_lib::{Cmd, Fd, Redirect, fd_open_for_read, fd_open_for_write};

/// Run one command to completion with the requested redirections.
///
/// Returns whether the command exited with status 0. Files that cannot be opened are
/// reported as errors before anything is spawned.
pub fn cmd_run(command: Vec<OsString>, stdin: Option<&Path>, stdout: Option<&Path>, stderr: Option<&Path>) -> Result<bool> {
  let mut redirect = Redirect::new();
  redirect.stdin = open(stdin, |path| fd_open_for_read(path))?;
  redirect.stdout = open(stdout, |path| fd_open_for_write(path))?;
  redirect.stderr = open(stderr, |path| fd_open_for_write(path))?;

  let mut cmd: Cmd = command.into_iter().collect();
  Ok(cmd.run_sync_redirect_and_reset(&mut redirect))
}

fn open<F>(path: Option<&Path>, opener: F) -> Result<Option<Fd>>
where
  F: Fn(&Path) -> Option<Fd>,
{
  let Some(path) = path else {
    return Ok(None);
  };
  match opener(path) {
    Some(fd) => Ok(Some(fd)),
    None => bail!("Failed to open {}", path.display()),
  }
}
