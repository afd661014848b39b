use std::fs::File;
use std::io;
use std::path::Path;

use tracing::{debug, error};

use super::{Fd, sys};

/// Stream replacements for a child's stdin, stdout and stderr.
///
/// A `None` slot means the child inherits the parent's stream. The handles are owned
/// by the `Redirect`; they close when it is dropped or passed to a `*_and_reset` run.
#[derive(Debug, Default)]
pub struct Redirect {
  pub stdin: Option<Fd>,
  pub stdout: Option<Fd>,
  pub stderr: Option<Fd>,
}

impl Redirect {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with_stdin(mut self, fd: Fd) -> Self {
    self.stdin = Some(fd);
    self
  }

  pub fn with_stdout(mut self, fd: Fd) -> Self {
    self.stdout = Some(fd);
    self
  }

  pub fn with_stderr(mut self, fd: Fd) -> Self {
    self.stderr = Some(fd);
    self
  }

  /// True when every stream is inherited.
  pub fn is_empty(&self) -> bool {
    self.stdin.is_none() && self.stdout.is_none() && self.stderr.is_none()
  }

  /// Duplicate every present handle so a child can own the copies.
  pub(crate) fn try_clone(&self) -> io::Result<Redirect> {
    Ok(Redirect {
      stdin: self.stdin.as_ref().map(Fd::try_clone).transpose()?,
      stdout: self.stdout.as_ref().map(Fd::try_clone).transpose()?,
      stderr: self.stderr.as_ref().map(Fd::try_clone).transpose()?,
    })
  }

  /// Move every handle out, leaving all slots empty.
  pub fn take(&mut self) -> Redirect {
    Redirect {
      stdin: self.stdin.take(),
      stdout: self.stdout.take(),
      stderr: self.stderr.take(),
    }
  }

  /// Close every present handle.
  pub fn close(&mut self) {
    drop(self.take());
  }
}

/// Open `path` for reading, e.g. to feed a child's stdin.
///
/// Logs and returns `None` on failure.
pub fn fd_open_for_read(path: impl AsRef<Path>) -> Option<Fd> {
  let path = path.as_ref();
  match File::open(path) {
    Ok(file) => {
      debug!(path = %path.display(), "opened file for reading");
      Some(Fd::from(file))
    }
    Err(err) => {
      error!(path = %path.display(), error = %err, "could not open file {}: {}", path.display(), err);
      None
    }
  }
}

/// Open `path` for writing, creating it if needed and truncating existing content.
///
/// New files get mode 0644 on Unix. Logs and returns `None` on failure.
pub fn fd_open_for_write(path: impl AsRef<Path>) -> Option<Fd> {
  let path = path.as_ref();
  match sys::write_options().open(path) {
    Ok(file) => {
      debug!(path = %path.display(), "opened file for writing");
      Some(Fd::from(file))
    }
    Err(err) => {
      error!(path = %path.display(), error = %err, "could not open file {}: {}", path.display(), err);
      None
    }
  }
}

/// Close a handle. Equivalent to dropping it.
pub fn fd_close(fd: Fd) {
  drop(fd);
}
