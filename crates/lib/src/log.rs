//! Minimum log severity.
//!
//! The library emits `tracing` events. Whoever installs the subscriber owns the
//! threshold; `LogLevel` is the value they configure it with. Build scripts that
//! install nothing get `init_subscriber(LogLevel::from_env())` from the bootstrap.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;
use tracing::level_filters::LevelFilter;

/// Messages below the configured level are suppressed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LogLevel {
  #[default]
  Info,
  Warning,
  Error,
  /// Suppress everything.
  NoLogs,
}

impl LogLevel {
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Info => "info",
      Self::Warning => "warning",
      Self::Error => "error",
      Self::NoLogs => "none",
    }
  }

  /// Read the level from `STITCH_LOG`, falling back to `Info` when unset or invalid.
  pub fn from_env() -> Self {
    std::env::var(crate::consts::ENV_LOG)
      .ok()
      .and_then(|value| value.parse().ok())
      .unwrap_or_default()
  }
}

/// Install a stderr `fmt` subscriber filtered at `level`.
///
/// Returns false, leaving the existing one in place, if a global subscriber is
/// already set.
pub fn init_subscriber(level: LogLevel) -> bool {
  tracing_subscriber::fmt()
    .with_max_level(LevelFilter::from(level))
    .with_writer(std::io::stderr)
    .with_target(false)
    .without_time()
    .try_init()
    .is_ok()
}

impl fmt::Display for LogLevel {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.as_str())
  }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown log level `{0}` (expected info, warning, error or none)")]
pub struct ParseLogLevelError(String);

impl FromStr for LogLevel {
  type Err = ParseLogLevelError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.trim().to_ascii_lowercase().as_str() {
      "info" => Ok(Self::Info),
      "warning" | "warn" => Ok(Self::Warning),
      "error" => Ok(Self::Error),
      "none" | "no-logs" | "off" => Ok(Self::NoLogs),
      _ => Err(ParseLogLevelError(s.to_string())),
    }
  }
}

impl From<LogLevel> for LevelFilter {
  fn from(level: LogLevel) -> Self {
    match level {
      LogLevel::Info => LevelFilter::INFO,
      LogLevel::Warning => LevelFilter::WARN,
      LogLevel::Error => LevelFilter::ERROR,
      LogLevel::NoLogs => LevelFilter::OFF,
    }
  }
}
