//! Commands: ordered argument lists that describe one process invocation.
//!
//! A `Cmd` is plain data until one of the `run_*` methods hands it to the
//! process layer. The `*_and_reset` variants clear the argument list afterwards
//! (keeping its allocation) so one `Cmd` can be reused for a series of steps.

use std::ffi::{OsStr, OsString};
use std::fmt;

use crate::process::{self, Proc, Redirect};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cmd {
  args: Vec<OsString>,
}

impl Cmd {
  pub fn new() -> Self {
    Self::default()
  }

  /// Append one argument.
  pub fn arg<S: AsRef<OsStr>>(&mut self, arg: S) -> &mut Self {
    self.args.push(arg.as_ref().to_os_string());
    self
  }

  /// Append several arguments, in order.
  pub fn append<I, S>(&mut self, args: I) -> &mut Self
  where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
  {
    self.args.extend(args.into_iter().map(|arg| arg.as_ref().to_os_string()));
    self
  }

  /// Append every argument of `other`, e.g. to wrap an invocation in another tool.
  pub fn extend_from(&mut self, other: &Cmd) -> &mut Self {
    self.args.extend_from_slice(&other.args);
    self
  }

  pub fn args(&self) -> &[OsString] {
    &self.args
  }

  /// The program to execute (argument 0).
  pub fn program(&self) -> Option<&OsStr> {
    self.args.first().map(OsString::as_os_str)
  }

  pub fn len(&self) -> usize {
    self.args.len()
  }

  pub fn is_empty(&self) -> bool {
    self.args.is_empty()
  }

  /// Remove all arguments. The backing storage is kept for reuse.
  pub fn clear(&mut self) {
    self.args.clear();
  }

  /// Render the command as one line for logs.
  ///
  /// Arguments containing whitespace are wrapped in single quotes. The output is
  /// meant for humans; it is not escaped for any particular shell.
  pub fn render(&self) -> String {
    self.to_string()
  }

  pub fn run_async(&self) -> Proc {
    process::spawn(self, Redirect::default())
  }

  /// Spawn with the given streams. The caller keeps ownership of the handles.
  pub fn run_async_redirect(&self, redirect: &Redirect) -> Proc {
    match redirect.try_clone() {
      Ok(redirect) => process::spawn(self, redirect),
      Err(err) => {
        tracing::error!(error = %err, "could not duplicate redirect handles: {}", err);
        Proc::invalid()
      }
    }
  }

  pub fn run_async_and_reset(&mut self) -> Proc {
    let proc = self.run_async();
    self.clear();
    proc
  }

  /// Spawn with the given streams, then clear the command and close every handle
  /// `redirect` owned. Each closed slot is left as `None`.
  pub fn run_async_redirect_and_reset(&mut self, redirect: &mut Redirect) -> Proc {
    let proc = process::spawn(self, redirect.take());
    self.clear();
    proc
  }

  pub fn run_sync(&self) -> bool {
    self.run_async().wait()
  }

  pub fn run_sync_redirect(&self, redirect: &Redirect) -> bool {
    self.run_async_redirect(redirect).wait()
  }

  pub fn run_sync_and_reset(&mut self) -> bool {
    self.run_async_and_reset().wait()
  }

  pub fn run_sync_redirect_and_reset(&mut self, redirect: &mut Redirect) -> bool {
    self.run_async_redirect_and_reset(redirect).wait()
  }
}

impl fmt::Display for Cmd {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    for (i, arg) in self.args.iter().enumerate() {
      if i > 0 {
        f.write_str(" ")?;
      }
      let arg = arg.to_string_lossy();
      if arg.chars().any(char::is_whitespace) {
        write!(f, "'{}'", arg)?;
      } else {
        f.write_str(&arg)?;
      }
    }
    Ok(())
  }
}

impl<S: AsRef<OsStr>> FromIterator<S> for Cmd {
  fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
    let mut cmd = Cmd::new();
    cmd.append(iter);
    cmd
  }
}

impl<S: AsRef<OsStr>> Extend<S> for Cmd {
  fn extend<I: IntoIterator<Item = S>>(&mut self, iter: I) {
    self.append(iter);
  }
}
