//! stitch-lib: build-script primitives
//!
//! This crate provides the pieces a self-bootstrapping build script needs:
//! - `Cmd`: an argument list that can be rendered, run synchronously or spawned
//! - `Redirect` / `Proc`: stream rerouting and process handles with explicit waits
//! - `needs_rebuild`: an mtime-based freshness check for build outputs
//! - `go_rebuild_urself!`: rebuild and relaunch the running binary when its source changed
//!
//! Everything reports through `tracing`. The bootstrap installs a stderr subscriber at
//! the level named by `STITCH_LOG` unless the program set one up first, so in the
//! example below the `CMD:` line and any failure are printed.
//!
//! ```no_run
//! use stitch_lib::Cmd;
//!
//! fn main() {
//!   stitch_lib::go_rebuild_urself!();
//!
//!   let mut cmd = Cmd::new();
//!   cmd.append(["cc", "-Wall", "-o", "build/main", "src/main.c"]);
//!   if !cmd.run_sync_and_reset() {
//!     std::process::exit(1);
//!   }
//! }
//! ```

pub mod arena;
pub mod cmd;
pub mod consts;
pub mod fs;
pub mod log;
pub mod platform;
pub mod process;
pub mod rebuild;
pub mod staleness;
pub mod util;

pub use arena::{ArenaError, Checkpoint, TempArena, TempStr};
pub use cmd::Cmd;
pub use log::{LogLevel, init_subscriber};
pub use process::{
  Fd, Proc, Procs, Redirect, Termination, fd_close, fd_open_for_read, fd_open_for_write, proc_wait, procs_wait,
  procs_wait_and_reset,
};
pub use rebuild::{Bootstrap, Outcome, RebuildCompiler, RebuildConfig, Rustc, go_rebuild_urself};
pub use staleness::{StalenessError, needs_rebuild, needs_rebuild1};
