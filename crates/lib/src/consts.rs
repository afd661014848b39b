//! Shared constants.

pub const APP_NAME: &str = "stitch";

/// Name programs use to refer to this library, e.g. `stitch_lib::go_rebuild_urself!()`.
pub const CRATE_NAME: &str = "stitch_lib";

/// Suffix appended to the running binary while its replacement is being compiled.
pub const BACKUP_SUFFIX: &str = ".old";

/// Default capacity of a `TempArena`, in bytes.
pub const TEMP_CAPACITY: usize = 8 * 1024 * 1024;

/// Compiler used by the default rebuild recipe when `RUSTC` is unset.
pub const DEFAULT_COMPILER: &str = "rustc";

/// Edition passed to the default rebuild recipe.
pub const DEFAULT_EDITION: &str = "2021";

pub const ENV_RUSTC: &str = "RUSTC";
pub const ENV_DELETE_OLD: &str = "STITCH_DELETE_OLD";
pub const ENV_LOG: &str = "STITCH_LOG";
