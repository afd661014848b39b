use std::ffi::OsString;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::cmd::Cmd;
use crate::consts::{CRATE_NAME, DEFAULT_COMPILER, DEFAULT_EDITION, ENV_RUSTC};

/// Produces the command that rebuilds `binary` from `source`.
pub trait RebuildCompiler {
  fn command(&self, binary: &Path, source: &Path) -> Cmd;
}

impl<F> RebuildCompiler for F
where
  F: Fn(&Path, &Path) -> Cmd,
{
  fn command(&self, binary: &Path, source: &Path) -> Cmd {
    self(binary, source)
  }
}

/// `rustc [--edition E] [-L dependency=DIR].. [--extern NAME=RLIB].. -o <binary> <source>`.
///
/// A program that calls `go_rebuild_urself!` depends on this crate, so the compile has
/// to be told where to find it. `from_env` fills that in from the cargo build that
/// produced this library; `search_path` and `extern_crate` set it by hand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rustc {
  program: OsString,
  edition: Option<String>,
  search_paths: Vec<PathBuf>,
  externs: Vec<(String, PathBuf)>,
}

impl Default for Rustc {
  fn default() -> Self {
    Self::new(DEFAULT_COMPILER)
  }
}

impl Rustc {
  /// A bare compiler invocation with no edition or link flags.
  pub fn new(program: impl Into<OsString>) -> Self {
    Self {
      program: program.into(),
      edition: None,
      search_paths: Vec::new(),
      externs: Vec::new(),
    }
  }

  /// `RUSTC` (or `rustc`), the default edition, and link flags for this crate.
  pub fn from_env() -> Self {
    let program = match std::env::var_os(ENV_RUSTC) {
      Some(program) if !program.is_empty() => program,
      _ => OsString::from(DEFAULT_COMPILER),
    };
    Self::new(program).edition(DEFAULT_EDITION).link_self()
  }

  pub fn edition(mut self, edition: impl Into<String>) -> Self {
    self.edition = Some(edition.into());
    self
  }

  /// Add a `-L dependency=<dir>` search path.
  pub fn search_path(mut self, dir: impl Into<PathBuf>) -> Self {
    self.search_paths.push(dir.into());
    self
  }

  /// Add `--extern <name>=<rlib>`.
  pub fn extern_crate(mut self, name: impl Into<String>, rlib: impl Into<PathBuf>) -> Self {
    self.externs.push((name.into(), rlib.into()));
    self
  }

  /// Link against the deps directory this library was built into.
  fn link_self(self) -> Self {
    let Some(deps) = option_env!("STITCH_LIB_DEPS_DIR").map(PathBuf::from) else {
      return self;
    };

    match find_rlib(&deps, CRATE_NAME) {
      Some(rlib) => {
        debug!(rlib = %rlib.display(), "linking rebuilds against {}", CRATE_NAME);
        self.search_path(deps).extern_crate(CRATE_NAME, rlib)
      }
      None => {
        warn!(deps = %deps.display(), "could not find the {} rlib; rebuilds will not link it", CRATE_NAME);
        self
      }
    }
  }

  pub fn program(&self) -> &Path {
    Path::new(&self.program)
  }
}

impl RebuildCompiler for Rustc {
  fn command(&self, binary: &Path, source: &Path) -> Cmd {
    let mut cmd = Cmd::new();
    cmd.arg(&self.program);
    if let Some(edition) = &self.edition {
      cmd.arg("--edition").arg(edition);
    }
    for dir in &self.search_paths {
      let mut flag = OsString::from("dependency=");
      flag.push(dir);
      cmd.arg("-L").arg(flag);
    }
    for (name, rlib) in &self.externs {
      let mut flag = OsString::from(format!("{}=", name));
      flag.push(rlib);
      cmd.arg("--extern").arg(flag);
    }
    cmd.arg("-o").arg(binary).arg(source);
    cmd
  }
}

/// Newest `lib<name>-*.rlib` in `dir`.
///
/// Cargo names rlibs with a metadata hash, so several can coexist after builds with
/// different profiles or toolchains.
fn find_rlib(dir: &Path, name: &str) -> Option<PathBuf> {
  let prefix = format!("lib{}-", name);
  std::fs::read_dir(dir)
    .ok()?
    .filter_map(Result::ok)
    .filter(|entry| {
      let file_name = entry.file_name();
      let file_name = file_name.to_string_lossy();
      file_name.starts_with(&prefix) && file_name.ends_with(".rlib")
    })
    .filter_map(|entry| {
      let modified = entry.metadata().ok()?.modified().ok()?;
      Some((modified, entry.path()))
    })
    .max_by_key(|(modified, _)| *modified)
    .map(|(_, path)| path)
}
