//! Modification-time freshness checks for build outputs.

use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use thiserror::Error;
use tracing::{debug, error};

#[derive(Debug, Error)]
pub enum StalenessError {
  #[error("could not stat output {path}: {source}")]
  Output {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("could not stat input {path}: {source}")]
  Input {
    path: PathBuf,
    #[source]
    source: io::Error,
  },
}

/// Decide whether `output` must be rebuilt from `inputs`.
///
/// Returns `Ok(true)` when the output is missing or any input was modified strictly
/// after it, `Ok(false)` when it is up to date. Every input must exist: a missing or
/// unreadable input is an error even when the output is missing as well. Errors are
/// logged once before being returned.
pub fn needs_rebuild<P, I>(output: impl AsRef<Path>, inputs: I) -> Result<bool, StalenessError>
where
  I: IntoIterator<Item = P>,
  P: AsRef<Path>,
{
  let output = output.as_ref();

  let output_time = match mtime(output) {
    Ok(time) => Some(time),
    Err(err) if err.kind() == io::ErrorKind::NotFound => None,
    Err(source) => {
      error!(path = %output.display(), error = %source, "could not stat {}: {}", output.display(), source);
      return Err(StalenessError::Output {
        path: output.to_path_buf(),
        source,
      });
    }
  };

  let mut stale = output_time.is_none();
  for input in inputs {
    let input = input.as_ref();
    let input_time = mtime(input).map_err(|source| {
      error!(path = %input.display(), error = %source, "could not stat {}: {}", input.display(), source);
      StalenessError::Input {
        path: input.to_path_buf(),
        source,
      }
    })?;

    if output_time.is_some_and(|output_time| input_time > output_time) {
      debug!(output = %output.display(), input = %input.display(), "input is newer than output");
      stale = true;
    }
  }

  Ok(stale)
}

/// `needs_rebuild` for exactly one input.
pub fn needs_rebuild1(output: impl AsRef<Path>, input: impl AsRef<Path>) -> Result<bool, StalenessError> {
  needs_rebuild(output, [input])
}

fn mtime(path: &Path) -> io::Result<SystemTime> {
  std::fs::metadata(path)?.modified()
}
