//! Filesystem helpers for build scripts.
//!
//! These follow the same convention as the process layer: failures are logged once
//! at the point they happen and reported as `false` / `None`, so a build script can
//! chain steps without threading error types through every call.

use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, error, info};

/// Rename `old` to `new`, replacing `new` if it exists.
pub fn rename(old: impl AsRef<Path>, new: impl AsRef<Path>) -> bool {
  let (old, new) = (old.as_ref(), new.as_ref());
  info!("renaming {} -> {}", old.display(), new.display());

  match std::fs::rename(old, new) {
    Ok(()) => true,
    Err(err) => {
      error!(
        error = %err,
        "could not rename {} to {}: {}",
        old.display(),
        new.display(),
        err
      );
      false
    }
  }
}

/// Check whether `path` exists.
///
/// `Ok(false)` means the path is definitely absent. An `Err` means existence could not
/// be determined (e.g. permission denied on a parent directory).
pub fn file_exists(path: impl AsRef<Path>) -> io::Result<bool> {
  let path = path.as_ref();
  match std::fs::symlink_metadata(path) {
    Ok(_) => Ok(true),
    Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(false),
    Err(err) => {
      error!(path = %path.display(), error = %err, "could not check if file {} exists: {}", path.display(), err);
      Err(err)
    }
  }
}

/// Create a single directory. An existing directory counts as success.
pub fn mkdir_if_not_exists(path: impl AsRef<Path>) -> bool {
  let path = path.as_ref();
  match std::fs::create_dir(path) {
    Ok(()) => {
      info!("created directory `{}`", path.display());
      true
    }
    Err(err) if err.kind() == io::ErrorKind::AlreadyExists && path.is_dir() => {
      debug!("directory `{}` already exists", path.display());
      true
    }
    Err(err) => {
      error!(error = %err, "could not create directory `{}`: {}", path.display(), err);
      false
    }
  }
}

/// Delete a file or an empty directory.
pub fn delete_file(path: impl AsRef<Path>) -> bool {
  let path = path.as_ref();
  info!("deleting {}", path.display());

  let metadata = match std::fs::symlink_metadata(path) {
    Ok(metadata) => metadata,
    Err(err) => {
      error!(error = %err, "could not delete {}: {}", path.display(), err);
      return false;
    }
  };

  let result = if metadata.is_dir() {
    std::fs::remove_dir(path)
  } else {
    std::fs::remove_file(path)
  };

  match result {
    Ok(()) => true,
    Err(err) => {
      error!(error = %err, "could not delete {}: {}", path.display(), err);
      false
    }
  }
}

/// Kind of filesystem entry, as reported by `get_file_type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileType {
  Regular,
  Directory,
  Symlink,
  Other,
}

/// Classify `path` without following a final symlink.
pub fn get_file_type(path: impl AsRef<Path>) -> Option<FileType> {
  let path = path.as_ref();
  match std::fs::symlink_metadata(path) {
    Ok(metadata) => {
      let file_type = metadata.file_type();
      Some(if file_type.is_symlink() {
        FileType::Symlink
      } else if file_type.is_dir() {
        FileType::Directory
      } else if file_type.is_file() {
        FileType::Regular
      } else {
        FileType::Other
      })
    }
    Err(err) => {
      error!(error = %err, "could not get file type of {}: {}", path.display(), err);
      None
    }
  }
}

/// Create or truncate `path` and write `data` to it.
pub fn write_entire_file(path: impl AsRef<Path>, data: impl AsRef<[u8]>) -> bool {
  let path = path.as_ref();
  match std::fs::write(path, data) {
    Ok(()) => true,
    Err(err) => {
      error!(error = %err, "could not write file {}: {}", path.display(), err);
      false
    }
  }
}

/// Append the contents of `path` to `buf`.
///
/// On failure `buf` keeps whatever it held before the call.
pub fn read_entire_file(path: impl AsRef<Path>, buf: &mut Vec<u8>) -> bool {
  let path = path.as_ref();
  let start = buf.len();
  let result = std::fs::File::open(path).and_then(|mut file| io::Read::read_to_end(&mut file, buf));

  match result {
    Ok(_) => true,
    Err(err) => {
      buf.truncate(start);
      error!(error = %err, "could not read file {}: {}", path.display(), err);
      false
    }
  }
}

/// Last component of a `/`-separated path (or `\`-separated on Windows).
///
/// Works on the raw string, so `"dir/"` yields `""` like the basename of a directory
/// prefix would.
pub fn path_name(path: &str) -> &str {
  let separator = |c: char| c == '/' || (cfg!(windows) && c == '\\');
  match path.rfind(separator) {
    Some(i) => &path[i + 1..],
    None => path,
  }
}

pub fn get_current_dir() -> Option<PathBuf> {
  match std::env::current_dir() {
    Ok(dir) => Some(dir),
    Err(err) => {
      error!(error = %err, "could not get current directory: {}", err);
      None
    }
  }
}

pub fn set_current_dir(path: impl AsRef<Path>) -> bool {
  let path = path.as_ref();
  match std::env::set_current_dir(path) {
    Ok(()) => true,
    Err(err) => {
      error!(error = %err, "could not set current directory to {}: {}", path.display(), err);
      false
    }
  }
}
