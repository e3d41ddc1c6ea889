// ── Win32 platform implementation ─────────────────────────────────────────────
//
// This is one of exactly two modules in the crate where `unsafe` code is
// permitted (the other is `types::input`).  Every `unsafe` block MUST carry a
// `// SAFETY:` comment that states:
//   • which invariant makes the operation sound, and
//   • what the caller is responsible for maintaining.
//
// Each sub-module wraps one native subsystem and calls the `windows` crate
// bindings directly.  Wrappers forward their arguments unchanged and turn the
// entry point's failure into a `WinError` carrying the last-error code,
// captured before anything else (including logging) can overwrite it.  The
// crate's own `repr(C)` structures cross the boundary through `abi`.

#![allow(unsafe_code)]

use windows::Win32::Foundation::{GetLastError, SetLastError, BOOL, WIN32_ERROR};

pub use windows::Win32::Foundation::{HANDLE, HWND};

use crate::error::{Result, WinError};

// ── Sub-modules ───────────────────────────────────────────────────────────────

mod abi;

pub mod atom;
pub mod clipboard;
pub mod console;
pub mod diagnostics;
pub mod directory;
pub mod handle;
pub mod path;

// ── Shared helpers ────────────────────────────────────────────────────────────

/// Capture `GetLastError()` into a `WinError::Win32` for `function`.
///
/// Must run immediately after the failing call, on the same thread.
pub(crate) fn last_error(function: &'static str) -> WinError {
    // SAFETY: GetLastError reads thread-local state set by the last Win32 call.
    // It is always safe to call and never fails.
    let code = unsafe { GetLastError() }.0;
    log::debug!("{function} failed: error {code}");
    WinError::Win32 { function, code }
}

/// Reset the side channel so a later zero return can be told apart from a
/// failure.
pub(crate) fn clear_last_error() {
    // SAFETY: SetLastError writes thread-local state only.
    unsafe { SetLastError(WIN32_ERROR(0)) };
}

/// `Ok` when the side channel reads zero, the captured error otherwise.
pub(crate) fn side_channel(function: &'static str) -> Result<()> {
    // SAFETY: see `last_error`.
    let code = unsafe { GetLastError() }.0;
    if code == 0 {
        Ok(())
    } else {
        log::debug!("{function} failed: error {code}");
        Err(WinError::Win32 { function, code })
    }
}

/// Name the function behind a failed binding call.
pub(crate) fn check<T>(result: windows::core::Result<T>, function: &'static str) -> Result<T> {
    result.map_err(|e| {
        let err = WinError::from_windows(function, &e);
        log::debug!("{err}");
        err
    })
}

/// For entry points whose failure sentinel doubles as a legitimate "nothing"
/// result: a failure with a clear last error is `None`.  The caller clears the
/// side channel before the call.
pub(crate) fn optional<T>(
    result: windows::core::Result<T>,
    function: &'static str,
) -> Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(e) if e.code().0 == 0 => Ok(None),
        Err(e) => check(Err(e), function),
    }
}

/// FALSE → error, for the bindings that hand back a raw `BOOL`.
pub(crate) fn check_bool(ok: BOOL, function: &'static str) -> Result<()> {
    if ok.as_bool() {
        Ok(())
    } else {
        Err(last_error(function))
    }
}

/// Raw pointer-sized value of a handle.
pub(crate) fn raw_handle(h: HANDLE) -> isize {
    h.0 as isize
}

/// Rebuild a handle from its raw value.
pub(crate) fn handle_from_raw(raw: isize) -> HANDLE {
    HANDLE(raw as _)
}

/// `None` for a NULL window.
pub(crate) fn non_null_hwnd(hwnd: HWND) -> Option<HWND> {
    if hwnd.0 as isize == 0 {
        None
    } else {
        Some(hwnd)
    }
}

/// A window argument that may be omitted (NULL).
pub(crate) fn hwnd_or_null(hwnd: Option<HWND>) -> HWND {
    hwnd.unwrap_or_default()
}

/// A count the native side reports as `u32`, as a slice length.
pub(crate) fn len_u32(function: &'static str, len: usize) -> Result<u32> {
    u32::try_from(len).map_err(|_| WinError::InvalidValue {
        function,
        value: u32::MAX,
    })
}

// ── Tests ─────────────────────────────────────────────────────────────────────
