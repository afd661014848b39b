//! Ephemeral bump arena for short-lived strings.
//!
//! Strings are never freed individually. A caller saves a `Checkpoint` at the
//! start of a phase and rewinds to it when the phase ends, or resets the whole
//! arena. Handles (`TempStr`) are plain offsets, so a handle that points past the
//! current fill level after a rewind simply stops resolving.

use std::fmt::{self, Write};

use thiserror::Error;

use crate::consts::TEMP_CAPACITY;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ArenaError {
  #[error("temporary arena exhausted: requested {requested} bytes, {available} available")]
  Exhausted { requested: usize, available: usize },

  #[error("formatting into the temporary arena failed")]
  Format,
}

/// Handle to a string stored in a `TempArena`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TempStr {
  start: usize,
  len: usize,
}

impl TempStr {
  pub fn len(&self) -> usize {
    self.len
  }

  pub fn is_empty(&self) -> bool {
    self.len == 0
  }
}

/// Saved fill level of a `TempArena`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Checkpoint(usize);

#[derive(Debug)]
pub struct TempArena {
  buf: Vec<u8>,
  capacity: usize,
}

impl Default for TempArena {
  fn default() -> Self {
    Self::new()
  }
}

impl TempArena {
  pub fn new() -> Self {
    Self::with_capacity(TEMP_CAPACITY)
  }

  /// Create an arena that refuses to grow past `capacity` bytes.
  ///
  /// Storage is reserved lazily, so a large capacity costs nothing until used.
  pub fn with_capacity(capacity: usize) -> Self {
    Self {
      buf: Vec::new(),
      capacity,
    }
  }

  pub fn len(&self) -> usize {
    self.buf.len()
  }

  pub fn is_empty(&self) -> bool {
    self.buf.is_empty()
  }

  pub fn capacity(&self) -> usize {
    self.capacity
  }

  fn available(&self) -> usize {
    self.capacity - self.buf.len()
  }

  /// Reserve `size` zeroed bytes and hand them out for scratch use.
  pub fn alloc(&mut self, size: usize) -> Result<&mut [u8], ArenaError> {
    if size > self.available() {
      return Err(ArenaError::Exhausted {
        requested: size,
        available: self.available(),
      });
    }
    let start = self.buf.len();
    self.buf.resize(start + size, 0);
    Ok(&mut self.buf[start..])
  }

  /// Copy `s` into the arena.
  pub fn strdup(&mut self, s: &str) -> Result<TempStr, ArenaError> {
    let start = self.buf.len();
    self.alloc(s.len())?.copy_from_slice(s.as_bytes());
    Ok(TempStr { start, len: s.len() })
  }

  /// Format directly into the arena: `arena.sprintf(format_args!("{}.old", path))`.
  ///
  /// On failure the arena is left exactly as it was.
  pub fn sprintf(&mut self, args: fmt::Arguments<'_>) -> Result<TempStr, ArenaError> {
    let start = self.buf.len();
    let mut writer = ArenaWriter {
      arena: self,
      overflow: None,
    };
    let result = writer.write_fmt(args);
    let overflow = writer.overflow;

    if let Some(err) = overflow {
      self.buf.truncate(start);
      return Err(err);
    }
    if result.is_err() {
      self.buf.truncate(start);
      return Err(ArenaError::Format);
    }

    Ok(TempStr {
      start,
      len: self.buf.len() - start,
    })
  }

  /// Resolve a handle. Returns `None` once the arena was rewound past it.
  pub fn get(&self, s: TempStr) -> Option<&str> {
    let bytes = self.buf.get(s.start..s.start + s.len)?;
    std::str::from_utf8(bytes).ok()
  }

  pub fn save(&self) -> Checkpoint {
    Checkpoint(self.buf.len())
  }

  /// Drop everything allocated after `checkpoint`.
  pub fn rewind(&mut self, checkpoint: Checkpoint) {
    self.buf.truncate(checkpoint.0);
  }

  pub fn reset(&mut self) {
    self.buf.clear();
  }
}

struct ArenaWriter<'a> {
  arena: &'a mut TempArena,
  overflow: Option<ArenaError>,
}

impl Write for ArenaWriter<'_> {
  fn write_str(&mut self, s: &str) -> fmt::Result {
    if s.len() > self.arena.available() {
      self.overflow = Some(ArenaError::Exhausted {
        requested: s.len(),
        available: self.arena.available(),
      });
      return Err(fmt::Error);
    }
    self.arena.buf.extend_from_slice(s.as_bytes());
    Ok(())
  }
}
