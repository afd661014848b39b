use std::fs::OpenOptions;
use std::io;
use std::os::windows::io::{AsRawHandle, OwnedHandle};
use std::process::Child;

use windows_sys::Win32::Foundation::WAIT_FAILED;
use windows_sys::Win32::System::Threading::{GetExitCodeProcess, INFINITE, WaitForSingleObject};

use super::Termination;

pub type Fd = OwnedHandle;
pub type RawProc = OwnedHandle;

pub(super) fn from_child(child: Child) -> RawProc {
  OwnedHandle::from(child)
}

/// Waits for the process, then closes its handle.
pub(super) fn wait_raw(handle: RawProc) -> io::Result<Termination> {
  let raw = handle.as_raw_handle();

  // SAFETY: `raw` is a live process handle owned by `handle` for this whole call.
  let result = unsafe { WaitForSingleObject(raw, INFINITE) };
  if result == WAIT_FAILED {
    return Err(io::Error::last_os_error());
  }

  let mut code: u32 = 0;
  // SAFETY: same handle; `code` is a valid out pointer.
  let ok = unsafe { GetExitCodeProcess(raw, &mut code) };
  if ok == 0 {
    return Err(io::Error::last_os_error());
  }

  Ok(Termination::Exited(code as i32))
}

pub(super) fn write_options() -> OpenOptions {
  let mut options = OpenOptions::new();
  options.write(true).create(true).truncate(true);
  options
}
