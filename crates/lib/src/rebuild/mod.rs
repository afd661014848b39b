//! Self-rebuild bootstrap.
//!
//! A build script compiled to a binary calls `go_rebuild_urself!()` first thing in
//! `main`. If any of its sources is newer than the binary, the binary is moved aside,
//! recompiled in place and relaunched with the same arguments; this process then exits
//! with the child's status. Otherwise control returns to the caller.
//!
//! The sequence is a small state machine:
//!
//! ```text
//! Start -> Continue                      (binary is fresh)
//! Start -> Rebuilding -> Relaunching -> Exit(child status)
//! Start | Rebuilding -> Exit(false)     (stat, rename or compile failed)
//! ```
//!
//! A failed compile puts the backup back, so the script on disk is never lost.

mod compiler;

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use tracing::{error, info, warn};

use crate::cmd::Cmd;
use crate::consts::{BACKUP_SUFFIX, ENV_DELETE_OLD};
use crate::log::LogLevel;
use crate::platform;
use crate::staleness::needs_rebuild;

pub use compiler::{RebuildCompiler, Rustc};

/// Tunables for the bootstrap.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RebuildConfig {
  /// Remove `<binary>.old` after a successful compile.
  pub delete_backup: bool,
}

impl RebuildConfig {
  /// Read `STITCH_DELETE_OLD` (`1`, `true` or `yes` enables backup deletion).
  pub fn from_env() -> Self {
    let delete_backup = std::env::var(ENV_DELETE_OLD)
      .map(|value| matches!(value.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
      .unwrap_or(false);
    Self { delete_backup }
  }
}

/// What the caller should do after the bootstrap ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
  /// The binary is current; run the build logic.
  Continue,
  /// A rebuilt binary ran (or the rebuild failed); terminate with this status.
  Exit { success: bool },
}

impl Outcome {
  /// Process exit code for `Exit`, `None` for `Continue`.
  pub fn exit_code(&self) -> Option<i32> {
    match self {
      Self::Continue => None,
      Self::Exit { success: true } => Some(0),
      Self::Exit { success: false } => Some(1),
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RebuildState {
  Start,
  Rebuilding,
  Relaunching,
  Continue,
  Exit(bool),
}

#[derive(Debug, Clone)]
pub struct Bootstrap<C = Rustc> {
  binary: PathBuf,
  sources: Vec<PathBuf>,
  args: Vec<OsString>,
  compiler: C,
  config: RebuildConfig,
}

impl Bootstrap<Rustc> {
  /// Bootstrap for `binary` built from `source`, with no relaunch arguments.
  ///
  /// On Windows `binary` gets `.exe` appended unless it already has it.
  pub fn new(binary: impl AsRef<Path>, source: impl AsRef<Path>) -> Self {
    Self {
      binary: platform::current_exe_path(binary.as_ref()),
      sources: vec![source.as_ref().to_path_buf()],
      args: Vec::new(),
      compiler: Rustc::default(),
      config: RebuildConfig::default(),
    }
  }

  /// Bootstrap from a full argument vector: argument 0 names the binary, the rest is
  /// forwarded to the relaunched process.
  pub fn from_args<I>(args: I, source: impl AsRef<Path>) -> Option<Self>
  where
    I: IntoIterator,
    I::Item: Into<OsString>,
  {
    let mut args = args.into_iter().map(Into::into);
    let binary = args.next()?;
    Some(Self::new(PathBuf::from(binary), source).args(args))
  }
}

impl<C: RebuildCompiler> Bootstrap<C> {
  /// Additional files whose changes trigger a rebuild. Only the main source is passed
  /// to the compiler.
  pub fn sources<I, P>(mut self, sources: I) -> Self
  where
    I: IntoIterator<Item = P>,
    P: AsRef<Path>,
  {
    self.sources.extend(sources.into_iter().map(|p| p.as_ref().to_path_buf()));
    self
  }

  pub fn args<I, S>(mut self, args: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<OsString>,
  {
    self.args.extend(args.into_iter().map(Into::into));
    self
  }

  pub fn compiler<D: RebuildCompiler>(self, compiler: D) -> Bootstrap<D> {
    Bootstrap {
      binary: self.binary,
      sources: self.sources,
      args: self.args,
      compiler,
      config: self.config,
    }
  }

  pub fn config(mut self, config: RebuildConfig) -> Self {
    self.config = config;
    self
  }

  pub fn binary(&self) -> &Path {
    &self.binary
  }

  /// Path the running binary is moved to while its replacement is compiled.
  pub fn backup_path(&self) -> PathBuf {
    let mut backup = OsString::from(self.binary.as_os_str());
    backup.push(BACKUP_SUFFIX);
    PathBuf::from(backup)
  }

  /// Drive the bootstrap to completion without exiting the process.
  pub fn run(&self) -> Outcome {
    let mut state = RebuildState::Start;
    loop {
      state = match state {
        RebuildState::Start => self.check(),
        RebuildState::Rebuilding => self.rebuild(),
        RebuildState::Relaunching => self.relaunch(),
        RebuildState::Continue => return Outcome::Continue,
        RebuildState::Exit(success) => return Outcome::Exit { success },
      };
    }
  }

  fn check(&self) -> RebuildState {
    match needs_rebuild(&self.binary, &self.sources) {
      Ok(true) => RebuildState::Rebuilding,
      Ok(false) => RebuildState::Continue,
      Err(_) => RebuildState::Exit(false),
    }
  }

  fn rebuild(&self) -> RebuildState {
    let backup = self.backup_path();
    info!(binary = %self.binary.display(), "sources changed, rebuilding");

    if !crate::fs::rename(&self.binary, &backup) {
      return RebuildState::Exit(false);
    }

    let mut cmd = self.compiler.command(&self.binary, &self.sources[0]);
    if !cmd.run_sync_and_reset() {
      error!(binary = %self.binary.display(), "rebuild failed, restoring previous binary");
      if !crate::fs::rename(&backup, &self.binary) {
        warn!(backup = %backup.display(), "previous binary left at backup path");
      }
      return RebuildState::Exit(false);
    }

    if self.config.delete_backup {
      crate::fs::delete_file(&backup);
    }

    RebuildState::Relaunching
  }

  fn relaunch(&self) -> RebuildState {
    let mut cmd = Cmd::new();
    cmd.arg(&self.binary).append(&self.args);
    RebuildState::Exit(cmd.run_sync_and_reset())
  }
}

/// Rebuild and relaunch the running binary if `source` or any of `extra_sources`
/// changed since it was built.
///
/// Returns only when the binary is up to date. Otherwise the process exits with the
/// relaunched binary's status, or with status 1 if the rebuild failed. Prefer the
/// `go_rebuild_urself!` macro, which fills in `source` with the calling file.
///
/// Installs a stderr subscriber at `STITCH_LOG` (default `info`) unless one is
/// already set, so the rebuild is reported before `main` gets a chance to log.
pub fn go_rebuild_urself<P: AsRef<Path>>(source: impl AsRef<Path>, extra_sources: &[P]) {
  crate::log::init_subscriber(LogLevel::from_env());

  let Some(bootstrap) = Bootstrap::from_args(std::env::args_os(), source) else {
    error!("could not determine the path of the running binary");
    std::process::exit(1);
  };

  let outcome = bootstrap
    .sources(extra_sources)
    .compiler(Rustc::from_env())
    .config(RebuildConfig::from_env())
    .run();

  if let Some(code) = outcome.exit_code() {
    std::process::exit(code);
  }
}

/// Rebuild the running binary from the file this macro is invoked in.
///
/// ```no_run
/// fn main() {
///   stitch_lib::go_rebuild_urself!("src/helpers.rs");
///   // build logic
/// }
/// ```
#[macro_export]
macro_rules! go_rebuild_urself {
  () => {
    $crate::rebuild::go_rebuild_urself(file!(), &[] as &[&str])
  };
  ($($extra:expr),+ $(,)?) => {
    $crate::rebuild::go_rebuild_urself(file!(), &[$($extra),+])
  };
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::util::testutil::{set_mtime, touch_at};
  use serial_test::serial;
  use std::cell::Cell;
  use std::fs;
  use tempfile::TempDir;

  fn failing_compiler(binary: &Path, _source: &Path) -> Cmd {
    crate::util::testutil::shell_cmd(&format!("echo partial > '{}'; exit 1", binary.display()))
  }

  #[test]
  fn fresh_binary_continues_without_compiling() {
    let temp = TempDir::new().unwrap();
    let bin = temp.path().join("build");
    let src = temp.path().join("build.rs");
    touch_at(&src, 100);
    touch_at(&bin, 200);

    let called = Cell::new(false);
    let compiler = |_: &Path, _: &Path| -> Cmd {
      called.set(true);
      Cmd::new()
    };

    let outcome = Bootstrap::new(&bin, &src).compiler(compiler).run();
    assert_eq!(outcome, Outcome::Continue);
    assert!(!called.get());
  }

  #[test]
  fn missing_source_exits_with_failure() {
    let temp = TempDir::new().unwrap();
    let bin = temp.path().join("build");
    touch_at(&bin, 200);

    let outcome = Bootstrap::new(&bin, temp.path().join("gone.rs"))
      .compiler(failing_compiler)
      .run();
    assert_eq!(outcome, Outcome::Exit { success: false });
    assert!(bin.exists());
  }

  #[test]
  fn extra_source_triggers_rebuild() {
    let temp = TempDir::new().unwrap();
    let bin = temp.path().join("build");
    let src = temp.path().join("build.rs");
    let extra = temp.path().join("helpers.rs");
    touch_at(&src, 100);
    touch_at(&extra, 100);
    touch_at(&bin, 200);

    let bootstrap = Bootstrap::new(&bin, &src).sources([&extra]).compiler(failing_compiler);
    assert_eq!(bootstrap.run(), Outcome::Continue);

    set_mtime(&extra, 300);
    assert_eq!(bootstrap.run(), Outcome::Exit { success: false });
  }

  #[cfg(unix)]
  #[test]
  fn failed_compile_restores_binary() {
    let temp = TempDir::new().unwrap();
    let bin = temp.path().join("build");
    let src = temp.path().join("build.rs");
    let original = "#!/bin/sh\nexit 0\n";
    crate::util::testutil::write_script(&bin, original);
    set_mtime(&bin, 100);
    touch_at(&src, 200);

    let bootstrap = Bootstrap::new(&bin, &src).compiler(failing_compiler);
    assert_eq!(bootstrap.run(), Outcome::Exit { success: false });

    assert_eq!(fs::read_to_string(&bin).unwrap(), original);
    assert!(!bootstrap.backup_path().exists());
    // the restored file keeps its mode and still runs
    assert!(Cmd::from_iter([&bin]).run_sync());
  }

  #[cfg(unix)]
  mod relaunch {
    use super::*;
    use crate::util::testutil::write_script;

    // "compiles" by copying the source script over the binary
    fn copy_compiler(binary: &Path, source: &Path) -> Cmd {
      let mut cmd = Cmd::new();
      cmd
        .append(["/bin/sh", "-c", "cp \"$1\" \"$2\" && chmod +x \"$2\"", "sh"])
        .arg(source)
        .arg(binary);
      cmd
    }

    fn setup(temp: &TempDir, script: &str) -> (PathBuf, PathBuf) {
      let bin = temp.path().join("build");
      let src = temp.path().join("build.sh");
      write_script(&bin, "#!/bin/sh\nexit 42\n");
      write_script(&src, script);
      set_mtime(&bin, 100);
      set_mtime(&src, 200);
      (bin, src)
    }

    #[test]
    fn rebuilt_binary_receives_original_arguments() {
      let temp = TempDir::new().unwrap();
      let out = temp.path().join("args.txt");
      let script = format!("#!/bin/sh\nprintf '%s\\n' \"$@\" > '{}'\n", out.display());
      let (bin, src) = setup(&temp, &script);

      let bootstrap = Bootstrap::new(&bin, &src)
        .args(["test", "with space"])
        .compiler(copy_compiler);
      assert_eq!(bootstrap.run(), Outcome::Exit { success: true });

      assert_eq!(fs::read_to_string(&out).unwrap(), "test\nwith space\n");
      assert_eq!(fs::read_to_string(bootstrap.backup_path()).unwrap(), "#!/bin/sh\nexit 42\n");
    }

    #[test]
    fn rebuilt_binary_status_is_propagated() {
      let temp = TempDir::new().unwrap();
      let (bin, src) = setup(&temp, "#!/bin/sh\nexit 3\n");

      let outcome = Bootstrap::new(&bin, &src).compiler(copy_compiler).run();
      assert_eq!(outcome, Outcome::Exit { success: false });
      assert_eq!(outcome.exit_code(), Some(1));
    }

    #[test]
    fn backup_deleted_when_configured() {
      let temp = TempDir::new().unwrap();
      let (bin, src) = setup(&temp, "#!/bin/sh\nexit 0\n");

      let bootstrap = Bootstrap::new(&bin, &src)
        .compiler(copy_compiler)
        .config(RebuildConfig { delete_backup: true });
      assert_eq!(bootstrap.run(), Outcome::Exit { success: true });
      assert!(!bootstrap.backup_path().exists());
    }

    #[test]
    fn second_run_after_rebuild_continues() {
      let temp = TempDir::new().unwrap();
      let (bin, src) = setup(&temp, "#!/bin/sh\nexit 0\n");

      let bootstrap = Bootstrap::new(&bin, &src).compiler(copy_compiler);
      assert_eq!(bootstrap.run(), Outcome::Exit { success: true });

      // cp gave the binary a fresh mtime, newer than the source
      assert_eq!(bootstrap.run(), Outcome::Continue);
    }
  }

  #[test]
  fn from_args_splits_binary_and_forwarded_args() {
    let bootstrap = Bootstrap::from_args(["./build", "-v", "release"], "build.rs").unwrap();
    assert_eq!(bootstrap.binary(), platform::current_exe_path(Path::new("./build")));
    assert_eq!(bootstrap.args, [OsString::from("-v"), OsString::from("release")]);
  }

  #[test]
  fn from_args_requires_argument_zero() {
    assert!(Bootstrap::from_args(Vec::<OsString>::new(), "build.rs").is_none());
  }

  #[test]
  fn backup_path_appends_suffix() {
    let bootstrap = Bootstrap::new("/tmp/build", "build.rs");
    let expected = format!("{}.old", bootstrap.binary().display());
    assert_eq!(bootstrap.backup_path(), PathBuf::from(expected));
  }

  #[test]
  fn exit_codes() {
    assert_eq!(Outcome::Continue.exit_code(), None);
    assert_eq!(Outcome::Exit { success: true }.exit_code(), Some(0));
    assert_eq!(Outcome::Exit { success: false }.exit_code(), Some(1));
  }

  #[test]
  #[serial]
  fn config_from_env() {
    temp_env::with_var(ENV_DELETE_OLD, Some("1"), || {
      assert!(RebuildConfig::from_env().delete_backup);
    });
    temp_env::with_var(ENV_DELETE_OLD, Some("TRUE"), || {
      assert!(RebuildConfig::from_env().delete_backup);
    });
    temp_env::with_var(ENV_DELETE_OLD, Some("0"), || {
      assert!(!RebuildConfig::from_env().delete_backup);
    });
    temp_env::with_var(ENV_DELETE_OLD, None::<&str>, || {
      assert_eq!(RebuildConfig::from_env(), RebuildConfig::default());
    });
  }
}
