// ── Error reporting ───────────────────────────────────────────────────────────
//
// The last-error side channel, system message text, process and thread error
// modes, audible and visual alerts, stack capture and NT status conversion.

use std::ffi::c_void;

use windows::core::{PCWSTR, PWSTR};
use windows::Win32::Foundation::{
    GetLastError, RtlNtStatusToDosError, SetLastError, HANDLE, HWND, NTSTATUS, WIN32_ERROR,
};
use windows::Win32::System::Diagnostics::Debug::{
    Beep, FatalAppExitW, FormatMessageW, GetErrorMode, GetThreadErrorMode, MessageBeep,
    RtlCaptureStackBackTrace, SetErrorMode, SetThreadErrorMode, FORMAT_MESSAGE_OPTIONS,
    THREAD_ERROR_MODE,
};
use windows::Win32::UI::WindowsAndMessaging::{FlashWindow, FlashWindowEx, MESSAGEBOX_STYLE};

use super::abi::NativeLayout;
use super::check;
use crate::error::{Result, WinError};
use crate::types::diagnostics::{ErrorMode, FlashWindowInfo, FormatMessageFlags, MessageBeepType};
use crate::wide::{from_wide, to_wide, trim_message};

/// Buffer for system message text, in UTF-16 units.
const MESSAGE_LEN: usize = 1024;

// ── Side channel ──────────────────────────────────────────────────────────────

/// The calling thread's last-error code.
pub fn get_last_error() -> u32 {
    // SAFETY: reads thread-local state only.
    unsafe { GetLastError() }.0
}

pub fn set_last_error(code: u32) {
    // SAFETY: writes thread-local state only.
    unsafe { SetLastError(WIN32_ERROR(code)) };
}

/// Capture the current last-error code as an error attributed to `function`.
pub fn last_error(function: &'static str) -> WinError {
    super::last_error(function)
}

// ── Messages ──────────────────────────────────────────────────────────────────

/// Where [`format_message`] looks up the message definition.
#[derive(Debug, Clone, Copy)]
pub enum MessageSource<'a> {
    /// The system message table.
    System,
    /// A message table resource in a loaded module.
    Module(HANDLE),
    /// A literal format string.
    String(&'a str),
}

/// Format message `id` from `source` in language `language` (0 = default
/// search order) into a buffer of `buffer_len` units.
///
/// Inserts are never expanded: argument lists cannot be passed, so
/// `IGNORE_INSERTS` is always added and `ALLOCATE_BUFFER`/`ARGUMENT_ARRAY`
/// are removed from `flags`.  The `FROM_*` bit is derived from `source`.
pub fn format_message(
    flags: FormatMessageFlags,
    source: MessageSource<'_>,
    id: u32,
    language: u32,
    buffer_len: usize,
) -> Result<String> {
    const F: &str = "FormatMessageW";
    let mut flags = flags
        - FormatMessageFlags::ALLOCATE_BUFFER
        - FormatMessageFlags::ARGUMENT_ARRAY
        - FormatMessageFlags::FROM_SYSTEM
        - FormatMessageFlags::FROM_HMODULE
        - FormatMessageFlags::FROM_STRING
        | FormatMessageFlags::IGNORE_INSERTS;

    let text;
    let source_ptr: *const c_void = match source {
        MessageSource::System => {
            flags |= FormatMessageFlags::FROM_SYSTEM;
            std::ptr::null()
        }
        MessageSource::Module(module) => {
            flags |= FormatMessageFlags::FROM_HMODULE;
            module.0 as *const c_void
        }
        MessageSource::String(s) => {
            flags |= FormatMessageFlags::FROM_STRING;
            text = to_wide(F, s)?;
            text.as_ptr() as *const c_void
        }
    };

    let mut buf = vec![0u16; buffer_len.max(1)];
    let cap = super::len_u32(F, buf.len())?;
    // SAFETY: `buf` is writable for `cap` units; `source_ptr` is NULL, a
    // module handle, or a NUL-terminated string that outlives the call;
    // IGNORE_INSERTS is set, so the NULL argument list is never read.
    let n = unsafe {
        FormatMessageW(
            FORMAT_MESSAGE_OPTIONS(flags.bits()),
            Some(source_ptr),
            id,
            language,
            PWSTR(buf.as_mut_ptr()),
            cap,
            None,
        )
    };
    if n == 0 {
        return Err(super::last_error(F));
    }
    Ok(from_wide(&buf[..n as usize]))
}

/// System text for Win32 error `code`, without the trailing line break.
/// `None` when the system has no message for it.
pub fn error_message(code: u32) -> Option<String> {
    let flags = FormatMessageFlags::FROM_SYSTEM | FormatMessageFlags::IGNORE_INSERTS;
    format_message(flags, MessageSource::System, code, 0, MESSAGE_LEN)
        .ok()
        .map(|s| trim_message(&s))
}

/// [`error_message`] for the calling thread's current last-error code.
pub fn last_error_message() -> Option<String> {
    error_message(get_last_error())
}

// ── Error modes ───────────────────────────────────────────────────────────────

pub fn get_error_mode() -> ErrorMode {
    // SAFETY: no arguments.
    ErrorMode::from_bits_retain(unsafe { GetErrorMode() })
}

/// Replace the process error mode.  Returns the previous mode.
pub fn set_error_mode(mode: ErrorMode) -> ErrorMode {
    // SAFETY: no pointers.
    ErrorMode::from_bits_retain(unsafe { SetErrorMode(THREAD_ERROR_MODE(mode.bits())) }.0)
}

pub fn get_thread_error_mode() -> ErrorMode {
    // SAFETY: no arguments.
    ErrorMode::from_bits_retain(unsafe { GetThreadErrorMode() })
}

/// Replace the calling thread's error mode.  Returns the previous mode.
pub fn set_thread_error_mode(mode: ErrorMode) -> Result<ErrorMode> {
    let mut old = THREAD_ERROR_MODE(0);
    let out: *mut THREAD_ERROR_MODE = &mut old;
    // SAFETY: `out` is a valid out-pointer.
    let set = unsafe { SetThreadErrorMode(THREAD_ERROR_MODE(mode.bits()), Some(out)) };
    check(set, "SetThreadErrorMode")?;
    Ok(ErrorMode::from_bits_retain(old.0))
}

// ── Alerts ────────────────────────────────────────────────────────────────────

/// Play a tone of `frequency` Hz (37–32767) for `duration_ms`.  Blocks.
pub fn beep(frequency: u32, duration_ms: u32) -> Result<()> {
    // SAFETY: no pointers.
    check(unsafe { Beep(frequency, duration_ms) }, "Beep")
}

/// Queue a system sound.
pub fn message_beep(kind: MessageBeepType) -> Result<()> {
    // SAFETY: no pointers.
    check(unsafe { MessageBeep(MESSAGEBOX_STYLE(kind as u32)) }, "MessageBeep")
}

/// Flash `hwnd` once.  Returns whether the window was active before.
pub fn flash_window(hwnd: HWND, invert: bool) -> bool {
    // SAFETY: the window handle is only used to post a repaint.
    unsafe { FlashWindow(hwnd, invert) }.as_bool()
}

/// Flash according to `info`.  Returns whether the window was active before.
pub fn flash_window_ex(info: &FlashWindowInfo) -> bool {
    // SAFETY: `info` is read-only input with `cb_size` set.
    unsafe { FlashWindowEx(info.as_native()) }.as_bool()
}

/// Show `message` and terminate the process.  Interior NULs are replaced
/// with spaces so the message is never cut short.
pub fn fatal_app_exit(message: &str) -> ! {
    let wide: Vec<u16> = message
        .encode_utf16()
        .map(|u| if u == 0 { u16::from(b' ') } else { u })
        .chain(std::iter::once(0))
        .collect();
    log::error!("fatal application exit: {message}");
    // SAFETY: `wide` is NUL-terminated and outlives the call.
    unsafe { FatalAppExitW(0, PCWSTR(wide.as_ptr())) };
    // FatalAppExitW terminates the process; this is never reached.
    std::process::abort()
}

// ── Stack and status ──────────────────────────────────────────────────────────

/// Return addresses of up to `max` frames above the caller, after skipping
/// `skip` frames, plus the hash the system computes over them.
pub fn capture_stack_back_trace(skip: u32, max: usize) -> (Vec<usize>, u32) {
    let mut frames: Vec<*mut c_void> = vec![std::ptr::null_mut(); max];
    let mut hash = 0u32;
    // SAFETY: the binding passes `frames` with its length; `hash` is a valid
    // out-pointer.  The call only walks the current thread's stack.
    let n = unsafe { RtlCaptureStackBackTrace(skip, &mut frames, Some(&mut hash as *mut u32)) };
    frames.truncate(n as usize);
    (frames.into_iter().map(|p| p as usize).collect(), hash)
}

/// Win32 error code equivalent to NTSTATUS `status`.
/// `ERROR_MR_MID_NOT_FOUND` (317) when no mapping exists.
pub fn nt_status_to_dos_error(status: i32) -> u32 {
    // SAFETY: pure table lookup.
    unsafe { RtlNtStatusToDosError(NTSTATUS(status)) }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
