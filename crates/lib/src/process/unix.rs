use std::fs::OpenOptions;
use std::io;
use std::os::fd::OwnedFd;
use std::os::unix::fs::OpenOptionsExt;
use std::process::Child;

use rustix::io::Errno;
use rustix::process::{Pid, WaitOptions, waitpid};

use super::Termination;

pub type Fd = OwnedFd;
pub type RawProc = Pid;

pub(super) fn from_child(child: Child) -> RawProc {
  // The Child is dropped here; we reap the pid ourselves.
  Pid::from_child(&child)
}

pub(super) fn wait_raw(pid: RawProc) -> io::Result<Termination> {
  loop {
    match waitpid(Some(pid), WaitOptions::empty()) {
      Ok(Some((_, status))) => {
        if let Some(code) = status.exit_status() {
          return Ok(Termination::Exited(code as i32));
        }
        if let Some(signal) = status.terminating_signal() {
          return Ok(Termination::Signaled(signal as i32));
        }
        // stopped or continued; keep waiting for termination
      }
      Ok(None) => {}
      Err(Errno::INTR) => {}
      Err(err) => return Err(err.into()),
    }
  }
}

pub(super) fn write_options() -> OpenOptions {
  let mut options = OpenOptions::new();
  options.write(true).create(true).truncate(true).mode(0o644);
  options
}
