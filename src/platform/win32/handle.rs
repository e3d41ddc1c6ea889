// ── Kernel object handles ─────────────────────────────────────────────────────

use std::cell::Cell;
use std::marker::PhantomData;

use windows::Win32::Foundation::{
    CloseHandle, DuplicateHandle, GetHandleInformation, SetHandleInformation,
    DUPLICATE_HANDLE_OPTIONS, HANDLE, HANDLE_FLAGS,
};
use windows::Win32::System::Threading::GetCurrentProcess;

use super::{check, handle_from_raw, raw_handle};
use crate::error::{Result, WinError};
use crate::types::handle::{is_sentinel, DuplicateOptions, HandleFlags};

/// Close `h`.  The handle must not be used afterwards.
pub fn close_handle(h: HANDLE) -> Result<()> {
    // SAFETY: CloseHandle validates the value and fails cleanly on a stale
    // or bogus handle; callers give up the handle by calling this.
    check(unsafe { CloseHandle(h) }, "CloseHandle")
}

/// An owned kernel object handle, closed on drop.  `Send`, not `Sync`.
#[derive(Debug)]
pub struct OwnedHandle {
    raw: isize,
    _not_sync: PhantomData<Cell<()>>,
}

impl OwnedHandle {
    /// Take ownership of `h`.  Fails for NULL and `INVALID_HANDLE_VALUE`.
    pub fn new(h: HANDLE) -> Result<Self> {
        let raw = raw_handle(h);
        if is_sentinel(raw) {
            return Err(WinError::InvalidValue {
                function: "OwnedHandle::new",
                value: raw as u32,
            });
        }
        Ok(Self::from_raw(raw))
    }

    fn from_raw(raw: isize) -> Self {
        Self { raw, _not_sync: PhantomData }
    }

    pub fn as_handle(&self) -> HANDLE {
        handle_from_raw(self.raw)
    }

    /// Give up ownership without closing.
    pub fn into_raw(self) -> HANDLE {
        let h = self.as_handle();
        std::mem::forget(self);
        h
    }

    /// Close now and report the result.
    pub fn close(self) -> Result<()> {
        close_handle(self.into_raw())
    }

    /// Duplicate within the current process with the same access.
    pub fn try_clone(&self) -> Result<Self> {
        // SAFETY: GetCurrentProcess returns a pseudo-handle that needs no
        // closing.
        let me = unsafe { GetCurrentProcess() };
        duplicate_handle(me, self.as_handle(), me, 0, false, DuplicateOptions::SAME_ACCESS)
    }

    pub fn information(&self) -> Result<HandleFlags> {
        get_handle_information(self.as_handle())
    }

    pub fn set_information(&self, mask: HandleFlags, flags: HandleFlags) -> Result<()> {
        set_handle_information(self.as_handle(), mask, flags)
    }
}

impl Drop for OwnedHandle {
    fn drop(&mut self) {
        // SAFETY: `raw` came from a successful create or duplicate call and
        // is closed exactly once, here or via `close`.
        let _ = unsafe { CloseHandle(handle_from_raw(self.raw)) };
    }
}

impl From<std::os::windows::io::OwnedHandle> for OwnedHandle {
    fn from(h: std::os::windows::io::OwnedHandle) -> Self {
        use std::os::windows::io::IntoRawHandle;
        Self::from_raw(h.into_raw_handle() as isize)
    }
}

impl From<OwnedHandle> for std::os::windows::io::OwnedHandle {
    fn from(h: OwnedHandle) -> Self {
        use std::os::windows::io::FromRawHandle;
        let raw = h.into_raw();
        // SAFETY: `raw` is an open handle whose ownership was just released
        // by `into_raw`, so it is transferred exactly once.
        unsafe { std::os::windows::io::OwnedHandle::from_raw_handle(raw.0 as _) }
    }
}

/// Duplicate `source` (a handle in `source_process`) into `target_process`.
/// With `DuplicateOptions::SAME_ACCESS`, `access` is ignored.
pub fn duplicate_handle(
    source_process: HANDLE,
    source: HANDLE,
    target_process: HANDLE,
    access: u32,
    inherit: bool,
    options: DuplicateOptions,
) -> Result<OwnedHandle> {
    let mut target = HANDLE::default();
    // SAFETY: `target` is a valid out-pointer; the process and source handles
    // are validated by the call.
    let ok = unsafe {
        DuplicateHandle(
            source_process,
            source,
            target_process,
            &mut target,
            access,
            inherit,
            DUPLICATE_HANDLE_OPTIONS(options.bits()),
        )
    };
    check(ok, "DuplicateHandle")?;
    Ok(OwnedHandle::from_raw(raw_handle(target)))
}

pub fn get_handle_information(h: HANDLE) -> Result<HandleFlags> {
    let mut flags = 0u32;
    // SAFETY: `flags` is a valid out-pointer.
    check(unsafe { GetHandleInformation(h, &mut flags) }, "GetHandleInformation")?;
    Ok(HandleFlags::from_bits_retain(flags))
}

/// Set the bits of `flags` selected by `mask`.
pub fn set_handle_information(h: HANDLE, mask: HandleFlags, flags: HandleFlags) -> Result<()> {
    // SAFETY: no pointers.
    check(
        unsafe { SetHandleInformation(h, mask.bits(), HANDLE_FLAGS(flags.bits())) },
        "SetHandleInformation",
    )
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(all(test, windows))]
mod tests {
    use windows::Win32::Foundation::ERROR_INVALID_HANDLE;

    use super::*;

    fn temp_file_handle() -> (tempfile::NamedTempFile, OwnedHandle) {
        let file = tempfile::NamedTempFile::new().expect("temp file");
        let std_handle: std::os::windows::io::OwnedHandle =
            file.reopen().expect("reopen").into();
        (file, OwnedHandle::from(std_handle))
    }

    #[test]
    fn close_file_handle() {
        let (_file, h) = temp_file_handle();
        h.close().expect("CloseHandle");
    }

    #[test]
    fn closing_a_bogus_handle_fails() {
        let err = close_handle(handle_from_raw(0x0BAD_0000)).unwrap_err();
        assert_eq!(err.function(), Some("CloseHandle"));
        assert_eq!(err.code(), Some(ERROR_INVALID_HANDLE.0));
    }

    #[test]
    fn sentinels_are_not_owned() {
        assert!(OwnedHandle::new(handle_from_raw(0)).is_err());
        assert!(OwnedHandle::new(handle_from_raw(-1)).is_err());
    }

    #[test]
    fn clone_is_a_distinct_handle() {
        let (_file, h) = temp_file_handle();
        let dup = h.try_clone().expect("DuplicateHandle");
        assert_ne!(raw_handle(dup.as_handle()), raw_handle(h.as_handle()));
    }

    #[test]
    fn inherit_flag_round_trip() {
        let (_file, h) = temp_file_handle();
        h.set_information(HandleFlags::INHERIT, HandleFlags::INHERIT).expect("set");
        assert!(h.information().expect("get").contains(HandleFlags::INHERIT));
        h.set_information(HandleFlags::INHERIT, HandleFlags::empty()).expect("clear");
        assert!(!h.information().expect("get").contains(HandleFlags::INHERIT));
    }

    #[test]
    fn converts_back_to_std() {
        let (_file, h) = temp_file_handle();
        let std_handle: std::os::windows::io::OwnedHandle = h.into();
        drop(std_handle);
    }
}
