//! Implementation of the `stitch check` command.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;

use stitch_lib::needs_rebuild;

use crate::output::{OutputFormat, print_json};

#[derive(Debug, Serialize)]
struct CheckReport<'a> {
  output: &'a Path,
  inputs: &'a [PathBuf],
  rebuild: bool,
}

/// Print whether `target` must be rebuilt from `inputs`.
///
/// A freshness answer (either way) is a success; failing to stat a file is an error.
pub fn cmd_check(target: &Path, inputs: &[PathBuf], format: OutputFormat) -> Result<bool> {
  let rebuild = needs_rebuild(target, inputs)
    .with_context(|| format!("Failed to check freshness of {}", target.display()))?;

  if format.is_json() {
    print_json(&CheckReport {
      output: target,
      inputs,
      rebuild,
    })?;
  } else if rebuild {
    println!("rebuild");
  } else {
    println!("up-to-date");
  }

  Ok(true)
}
