//! Process spawning and waiting.
//!
//! Spawning goes through `std::process::Command`, which gives PATH lookup and
//! stream inheritance on every platform. What happens after spawn is owned by a
//! platform back end selected at build time:
//!
//! - **Unix** (`unix.rs`): the handle is the child's pid, reaped with `waitpid`.
//! - **Windows** (`windows.rs`): the handle is the process `HANDLE`, waited on with
//!   `WaitForSingleObject` and closed once the exit code is read.
//!
//! Both back ends expose the same `Fd`/`RawProc` aliases and `wait_raw`, so nothing
//! outside this module branches on the platform.

mod redirect;

#[cfg(unix)]
mod unix;
#[cfg(unix)]
use unix as sys;

#[cfg(windows)]
mod windows;
#[cfg(windows)]
use windows as sys;

use std::process::Stdio;

use tracing::{debug, error, info};

use crate::cmd::Cmd;

pub use redirect::{Redirect, fd_close, fd_open_for_read, fd_open_for_write};

/// An open stream handle that can be handed to a child process.
pub type Fd = sys::Fd;

/// Platform process identifier behind a `Proc`.
pub type RawProc = sys::RawProc;

/// How a waited-on process ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
  Exited(i32),
  Signaled(i32),
}

/// Handle to a spawned child process.
///
/// A `Proc` must be waited on exactly once; `wait` consumes it. A `Proc` returned
/// from a failed spawn is the invalid sentinel: waiting on it fails immediately.
/// Dropping a live `Proc` without waiting leaves an unreaped child on Unix.
#[derive(Debug)]
#[must_use = "a spawned process must be waited on"]
pub struct Proc {
  raw: Option<RawProc>,
  id: u32,
}

impl Proc {
  pub const fn invalid() -> Self {
    Self { raw: None, id: 0 }
  }

  pub fn is_valid(&self) -> bool {
    self.raw.is_some()
  }

  /// OS process id, if the spawn succeeded.
  pub fn id(&self) -> Option<u32> {
    self.raw.as_ref().map(|_| self.id)
  }

  /// Block until the process terminates.
  ///
  /// Returns true only for a normal exit with status 0. Platform resources tied to
  /// the handle are released.
  pub fn wait(self) -> bool {
    let Some(raw) = self.raw else {
      return false;
    };

    match sys::wait_raw(raw) {
      Ok(Termination::Exited(0)) => {
        debug!(pid = self.id, "command finished");
        true
      }
      Ok(Termination::Exited(code)) => {
        error!(pid = self.id, code, "command exited with exit code {}", code);
        false
      }
      Ok(Termination::Signaled(signal)) => {
        error!(pid = self.id, signal, "command process was terminated by signal {}", signal);
        false
      }
      Err(err) => {
        error!(pid = self.id, error = %err, "could not wait on command (pid {}): {}", self.id, err);
        false
      }
    }
  }
}

/// Wait on a single process. Same as `proc.wait()`.
pub fn proc_wait(proc: Proc) -> bool {
  proc.wait()
}

/// An ordered batch of processes, e.g. parallel compile jobs.
pub type Procs = Vec<Proc>;

/// Wait on every process in order.
///
/// A failure does not stop the loop: every handle is drained so no child is left
/// unreaped. Returns true only if all of them succeeded.
pub fn procs_wait<I>(procs: I) -> bool
where
  I: IntoIterator<Item = Proc>,
{
  let mut success = true;
  for proc in procs {
    success = proc.wait() && success;
  }
  success
}

/// `procs_wait`, leaving `procs` empty for the next batch.
pub fn procs_wait_and_reset(procs: &mut Procs) -> bool {
  procs_wait(procs.drain(..))
}

/// Spawn `cmd` with the streams in `redirect`.
///
/// The handles are moved into the child's stdio; they are closed in this process
/// when the function returns.
pub(crate) fn spawn(cmd: &Cmd, redirect: Redirect) -> Proc {
  let Some(program) = cmd.program() else {
    error!("could not run empty command");
    return Proc::invalid();
  };

  info!("CMD: {}", cmd);

  let mut command = std::process::Command::new(program);
  command.args(&cmd.args()[1..]);

  let Redirect { stdin, stdout, stderr } = redirect;
  if let Some(fd) = stdin {
    command.stdin(Stdio::from(fd));
  }
  if let Some(fd) = stdout {
    command.stdout(Stdio::from(fd));
  }
  if let Some(fd) = stderr {
    command.stderr(Stdio::from(fd));
  }

  match command.spawn() {
    Ok(child) => {
      let id = child.id();
      debug!(pid = id, "spawned child process");
      Proc {
        raw: Some(sys::from_child(child)),
        id,
      }
    }
    Err(err) => {
      error!(error = %err, "could not create child process: {}", err);
      Proc::invalid()
    }
  }
}

#[cfg(test)]
#[cfg(unix)]
mod tests {
  use super::*;
  use crate::util::testutil::{echo_msg, exit_with, shell_cmd};
  use rustix::io::Errno;
  use rustix::process::{Pid, WaitOptions, waitpid};
  use tempfile::TempDir;
  use tracing_test::traced_test;

  #[test]
  #[traced_test]
  fn empty_command_is_rejected_before_spawn() {
    let proc = Cmd::new().run_async();
    assert!(!proc.is_valid());
    assert!(proc.id().is_none());
    assert!(!proc.wait());
    assert!(logs_contain("could not run empty command"));
    assert!(!logs_contain("CMD:"));
  }

  #[test]
  fn wait_on_zero_exit_succeeds() {
    assert!(exit_with(0).run_async().wait());
  }

  #[test]
  #[traced_test]
  fn wait_on_non_zero_exit_fails() {
    assert!(!exit_with(1).run_async().wait());
    assert!(logs_contain("command exited with exit code 1"));
  }

  #[test]
  #[traced_test]
  fn wait_on_signaled_process_fails() {
    let proc = shell_cmd("kill -TERM $$").run_async();
    assert!(proc.is_valid());
    assert!(!proc.wait());
    assert!(logs_contain("terminated by signal 15"));
  }

  #[test]
  #[traced_test]
  fn missing_program_returns_invalid_handle() {
    let proc = Cmd::from_iter(["stitch-definitely-not-a-real-program"]).run_async();
    assert!(!proc.is_valid());
    assert!(logs_contain("could not create child process"));
  }

  #[test]
  #[traced_test]
  fn spawn_logs_rendered_command() {
    let cmd = echo_msg("hello world");
    let mut redirect = Redirect::new();
    let temp = TempDir::new().unwrap();
    redirect.stdout = fd_open_for_write(temp.path().join("out.txt"));

    assert!(cmd.run_sync_redirect(&redirect));
    assert!(logs_contain("CMD: /bin/echo 'hello world'"));
  }

  #[test]
  fn batch_wait_drains_every_process() {
    let temp = TempDir::new().unwrap();
    let dir = temp.path().display();

    let mut procs: Procs = vec![
      shell_cmd(&format!("sleep 0.1; touch {}/p1", dir)).run_async(),
      shell_cmd(&format!("touch {}/p2; exit 1", dir)).run_async(),
      shell_cmd(&format!("sleep 0.2; touch {}/p3", dir)).run_async(),
    ];

    let pids: Vec<u32> = procs.iter().filter_map(Proc::id).collect();
    assert_eq!(pids.len(), 3);

    assert!(!procs_wait_and_reset(&mut procs));
    assert!(procs.is_empty());

    // every process ran to completion, including the ones after the failure
    for name in ["p1", "p2", "p3"] {
      assert!(temp.path().join(name).exists(), "{} did not finish", name);
    }

    // and no child is left for the kernel to report
    for pid in pids {
      let pid = Pid::from_raw(pid as i32).unwrap();
      let result = waitpid(Some(pid), WaitOptions::NOHANG);
      assert!(matches!(result, Err(Errno::CHILD)), "pid {} was not reaped", pid.as_raw_nonzero());
    }
  }

  #[test]
  fn batch_wait_succeeds_when_all_succeed() {
    let procs = vec![exit_with(0).run_async(), exit_with(0).run_async()];
    assert!(procs_wait(procs));
  }

  #[test]
  fn batch_wait_counts_invalid_handles_as_failure() {
    let procs = vec![exit_with(0).run_async(), Proc::invalid()];
    assert!(!procs_wait(procs));
  }

  #[test]
  fn and_reset_clears_command_even_on_failure() {
    let mut cmd = exit_with(3);
    assert!(!cmd.run_sync_and_reset());
    assert!(cmd.is_empty());
  }

  #[test]
  fn run_async_and_reset_allows_reuse() {
    let mut cmd = exit_with(0);
    let first = cmd.run_async_and_reset();
    assert!(cmd.is_empty());

    cmd.append(["/bin/sh", "-c", "exit 0"]);
    let second = cmd.run_async_and_reset();

    assert!(procs_wait([first, second]));
  }
}
