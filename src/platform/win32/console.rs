// ── Console ───────────────────────────────────────────────────────────────────
//
// Responsibilities in this file (unsafe confined here):
//   • Console lifecycle, standard handles and screen buffers.
//   • Aliases, code pages, modes, cursor, fonts, history, selection, titles.
//   • Input queue access and character-cell output.
//   • Control events and handlers.
//
// Reads are truncated to the count the native call reports.  Out-structures
// with a size field are created through their `Default` impl so the field is
// always set.

use std::cell::Cell;
use std::marker::PhantomData;

use windows::core::PCWSTR;
use windows::Win32::Foundation::{CloseHandle, BOOL, ERROR_INSUFFICIENT_BUFFER, HANDLE, HWND};
use windows::Win32::System::Console::{
    AddConsoleAliasW, AllocConsole, AttachConsole, CreateConsoleScreenBuffer,
    FillConsoleOutputAttribute, FillConsoleOutputCharacterW, FlushConsoleInputBuffer, FreeConsole,
    GenerateConsoleCtrlEvent, GetConsoleAliasExesLengthW, GetConsoleAliasExesW, GetConsoleAliasW,
    GetConsoleAliasesLengthW, GetConsoleAliasesW, GetConsoleCP, GetConsoleCursorInfo,
    GetConsoleDisplayMode, GetConsoleFontSize, GetConsoleHistoryInfo, GetConsoleMode,
    GetConsoleOriginalTitleW, GetConsoleOutputCP, GetConsoleProcessList,
    GetConsoleScreenBufferInfo, GetConsoleScreenBufferInfoEx, GetConsoleSelectionInfo,
    GetConsoleTitleW, GetConsoleWindow, GetCurrentConsoleFont, GetCurrentConsoleFontEx,
    GetLargestConsoleWindowSize, GetNumberOfConsoleInputEvents, GetNumberOfConsoleMouseButtons,
    GetStdHandle, PeekConsoleInputW, ReadConsoleInputW, ReadConsoleOutputAttribute,
    ReadConsoleOutputCharacterW, ReadConsoleOutputW, ReadConsoleW, ScrollConsoleScreenBufferW,
    SetConsoleActiveScreenBuffer, SetConsoleCP, SetConsoleCtrlHandler, SetConsoleCursorInfo,
    SetConsoleCursorPosition, SetConsoleDisplayMode, SetConsoleHistoryInfo, SetConsoleMode,
    SetConsoleOutputCP, SetConsoleScreenBufferInfoEx, SetConsoleScreenBufferSize,
    SetConsoleTextAttribute, SetConsoleTitleW, SetConsoleWindowInfo, SetCurrentConsoleFontEx,
    SetStdHandle, WriteConsoleInputW, WriteConsoleOutputAttribute, WriteConsoleOutputCharacterW,
    WriteConsoleOutputW, WriteConsoleW, CONSOLE_CHARACTER_ATTRIBUTES, CONSOLE_MODE, INPUT_RECORD,
    STD_HANDLE,
};

use super::abi::{native_slice, native_slice_mut, security_ptr, NativeLayout};
use super::diagnostics::get_last_error;
use super::handle::{close_handle, OwnedHandle};
use super::{
    check, clear_last_error, handle_from_raw, last_error, len_u32, non_null_hwnd, optional,
    raw_handle,
};
use crate::error::{Result, WinError};
use crate::types::console::{
    CharInfo, CharacterAttributes, ConsoleAccess, ConsoleBufferFlags, ConsoleCursorInfo,
    ConsoleDisplayMode, ConsoleFontInfo, ConsoleFontInfoEx, ConsoleHistoryInfo, ConsoleMode,
    ConsoleScreenBufferInfo, ConsoleScreenBufferInfoEx, ConsoleSelectionInfo, ConsoleShareMode,
    Coord, CtrlEvent, DisplayModeRequest, ReadConsoleControl, SmallRect, StandardDevice,
};
use crate::types::input::InputRecord;
use crate::types::io::SecurityAttributes;
use crate::wide::{
    from_wide, grow_until_fits, split_nul_block, to_wide, to_wide_opt, MAX_GROWN_LEN,
};

/// A console control handler.  Returning TRUE stops the remaining handlers
/// from running.
pub type HandlerRoutine = unsafe extern "system" fn(ctrl_type: u32) -> BOOL;

/// Initial title buffer, in UTF-16 units.
const TITLE_INITIAL_LEN: usize = 1024;

/// Initial alias target buffer, in UTF-16 units.
const ALIAS_INITIAL_LEN: usize = 512;

/// Initial process-id buffer, in entries.
const PROCESS_LIST_INITIAL_LEN: usize = 16;

// ── Handle ────────────────────────────────────────────────────────────────────

/// A console input or screen-buffer handle.
///
/// Handles from [`get_std_handle`] are borrowed from the process and never
/// closed; handles from [`create_console_screen_buffer`] are owned and closed
/// on drop.
#[derive(Debug)]
pub struct ConsoleHandle {
    raw: isize,
    owned: bool,
    _not_sync: PhantomData<Cell<()>>,
}

impl ConsoleHandle {
    /// Wrap a handle this value does not own.
    pub fn borrowed(h: HANDLE) -> Self {
        Self { raw: raw_handle(h), owned: false, _not_sync: PhantomData }
    }

    fn owned(h: HANDLE) -> Self {
        Self { raw: raw_handle(h), owned: true, _not_sync: PhantomData }
    }

    pub fn as_handle(&self) -> HANDLE {
        handle_from_raw(self.raw)
    }

    pub fn is_owned(&self) -> bool {
        self.owned
    }

    /// Close an owned handle and report the result.  Borrowed handles are
    /// simply released.
    pub fn close(self) -> Result<()> {
        let (raw, owned) = (self.raw, self.owned);
        std::mem::forget(self);
        if owned {
            close_handle(handle_from_raw(raw))
        } else {
            Ok(())
        }
    }
}

impl From<OwnedHandle> for ConsoleHandle {
    fn from(h: OwnedHandle) -> Self {
        Self::owned(h.into_raw())
    }
}

impl Drop for ConsoleHandle {
    fn drop(&mut self) {
        if self.owned {
            // SAFETY: an owned handle came from a successful create call and
            // is closed exactly once, here or in `close`.
            let _ = unsafe { CloseHandle(handle_from_raw(self.raw)) };
        }
    }
}

// ── Lifecycle ─────────────────────────────────────────────────────────────────

pub fn alloc_console() -> Result<()> {
    // SAFETY: no arguments.
    check(unsafe { AllocConsole() }, "AllocConsole")
}

pub fn free_console() -> Result<()> {
    // SAFETY: no arguments.
    check(unsafe { FreeConsole() }, "FreeConsole")
}

/// Attach to the console of `pid`, or of the parent with
/// [`ATTACH_PARENT_PROCESS`](crate::types::console::ATTACH_PARENT_PROCESS).
pub fn attach_console(pid: u32) -> Result<()> {
    // SAFETY: no pointers.
    check(unsafe { AttachConsole(pid) }, "AttachConsole")
}

/// The console window, or `None` when the process has no console.
pub fn get_console_window() -> Option<HWND> {
    // SAFETY: no arguments.
    non_null_hwnd(unsafe { GetConsoleWindow() })
}

/// A borrowed standard handle.  A process without that device has a NULL
/// standard handle, which is reported as [`WinError::InvalidValue`].
pub fn get_std_handle(device: StandardDevice) -> Result<ConsoleHandle> {
    const F: &str = "GetStdHandle";
    clear_last_error();
    // SAFETY: no pointers.
    let h = optional(unsafe { GetStdHandle(STD_HANDLE(device.as_u32())) }, F)?;
    h.map(ConsoleHandle::borrowed)
        .ok_or(WinError::InvalidValue { function: F, value: 0 })
}

pub fn set_std_handle(device: StandardDevice, h: HANDLE) -> Result<()> {
    // SAFETY: the handle value is only stored in the process parameters.
    check(unsafe { SetStdHandle(STD_HANDLE(device.as_u32()), h) }, "SetStdHandle")
}

/// Create a new text-mode screen buffer.  The returned handle is owned.
pub fn create_console_screen_buffer(
    access: ConsoleAccess,
    share: ConsoleShareMode,
    security: Option<&SecurityAttributes>,
    flags: ConsoleBufferFlags,
) -> Result<ConsoleHandle> {
    // SAFETY: the security pointer is `None` or borrows a live structure; the
    // reserved buffer-data argument must be NULL for text-mode buffers.
    let h = unsafe {
        CreateConsoleScreenBuffer(
            access.bits(),
            share.bits(),
            security_ptr(security),
            flags.bits(),
            None,
        )
    };
    check(h, "CreateConsoleScreenBuffer").map(ConsoleHandle::owned)
}

pub fn set_console_active_screen_buffer(console: &ConsoleHandle) -> Result<()> {
    // SAFETY: the handle is valid for the lifetime of `console`.
    check(
        unsafe { SetConsoleActiveScreenBuffer(console.as_handle()) },
        "SetConsoleActiveScreenBuffer",
    )
}

// ── Aliases ───────────────────────────────────────────────────────────────────
//
// The alias buffers are measured in bytes natively, but the bindings pass the
// slice length.  Buffers are therefore allocated with one UTF-16 unit per
// byte, which leaves the native side a view of the first half.

/// Define `source` → `target` for `exe`.  `None` as target deletes the alias.
pub fn add_console_alias(source: &str, target: Option<&str>, exe: &str) -> Result<()> {
    const F: &str = "AddConsoleAliasW";
    let source = to_wide(F, source)?;
    let target = to_wide_opt(F, target)?;
    let exe = to_wide(F, exe)?;
    let target_ptr = target.as_ref().map_or(PCWSTR::null(), |t| PCWSTR(t.as_ptr()));
    // SAFETY: all strings are NUL-terminated and outlive the call; a NULL
    // target is the documented way to delete an alias.
    let ok = unsafe {
        AddConsoleAliasW(PCWSTR(source.as_ptr()), target_ptr, PCWSTR(exe.as_ptr()))
    };
    check(ok, F)
}

/// Text `source` expands to for `exe`.
pub fn get_console_alias(source: &str, exe: &str) -> Result<String> {
    const F: &str = "GetConsoleAliasW";
    let source = to_wide(F, source)?;
    let exe = to_wide(F, exe)?;
    let mut buf = vec![0u16; ALIAS_INITIAL_LEN * 2];
    loop {
        len_u32(F, buf.len())?;
        // SAFETY: `buf` is writable for its whole length, more than the byte
        // count the binding passes; the strings are NUL-terminated and
        // outlive the call.
        let n = unsafe {
            GetConsoleAliasW(PCWSTR(source.as_ptr()), &mut buf, PCWSTR(exe.as_ptr()))
        };
        if n != 0 {
            return Ok(from_wide(&buf));
        }
        let err = last_error(F);
        if err.code() != Some(ERROR_INSUFFICIENT_BUFFER.0) || buf.len() >= MAX_GROWN_LEN * 2 {
            return Err(err);
        }
        log::trace!("GetConsoleAliasW: growing buffer to {}", buf.len() * 2);
        buf.resize(buf.len() * 2, 0);
    }
}

/// Bytes needed for [`get_console_aliases`] for `exe`.
pub fn get_console_aliases_length(exe: &str) -> Result<u32> {
    let exe = to_wide("GetConsoleAliasesLengthW", exe)?;
    // SAFETY: `exe` is NUL-terminated and outlives the call.
    Ok(unsafe { GetConsoleAliasesLengthW(PCWSTR(exe.as_ptr())) })
}

/// All `(source, target)` aliases defined for `exe`.
pub fn get_console_aliases(exe: &str) -> Result<Vec<(String, String)>> {
    const F: &str = "GetConsoleAliasesW";
    let bytes = get_console_aliases_length(exe)?;
    if bytes == 0 {
        return Ok(Vec::new());
    }
    let exe = to_wide(F, exe)?;
    let mut buf = vec![0u16; bytes as usize];
    // SAFETY: `buf` holds `bytes` units, twice the byte count the binding
    // passes; `exe` is NUL-terminated and outlives the call.
    let n = unsafe { GetConsoleAliasesW(&mut buf, PCWSTR(exe.as_ptr())) };
    if n == 0 {
        return Err(last_error(F));
    }
    Ok(parse_alias_block(&buf))
}

/// Split a `source=target\0…` block into pairs.
fn parse_alias_block(buf: &[u16]) -> Vec<(String, String)> {
    split_nul_block(buf)
        .into_iter()
        .map(|entry| match entry.split_once('=') {
            Some((source, target)) => (source.to_owned(), target.to_owned()),
            None => (entry, String::new()),
        })
        .collect()
}

/// Bytes needed for [`get_console_alias_exes`].
pub fn get_console_alias_exes_length() -> u32 {
    // SAFETY: no arguments.
    unsafe { GetConsoleAliasExesLengthW() }
}

/// Names of every executable with aliases defined.
pub fn get_console_alias_exes() -> Result<Vec<String>> {
    let bytes = get_console_alias_exes_length();
    if bytes == 0 {
        return Ok(Vec::new());
    }
    let mut buf = vec![0u16; bytes as usize];
    // SAFETY: `buf` holds `bytes` units, twice the byte count the binding
    // passes.
    let n = unsafe { GetConsoleAliasExesW(&mut buf) };
    if n == 0 {
        return Err(last_error("GetConsoleAliasExesW"));
    }
    Ok(split_nul_block(&buf))
}

// ── Code pages ────────────────────────────────────────────────────────────────

/// Zero → error.  Must be called straight after the getter.
fn code_page(function: &'static str, cp: u32) -> Result<u32> {
    if cp == 0 {
        return Err(last_error(function));
    }
    Ok(cp)
}

pub fn get_console_cp() -> Result<u32> {
    // SAFETY: no arguments.
    code_page("GetConsoleCP", unsafe { GetConsoleCP() })
}

pub fn set_console_cp(code_page: u32) -> Result<()> {
    // SAFETY: no pointers.
    check(unsafe { SetConsoleCP(code_page) }, "SetConsoleCP")
}

pub fn get_console_output_cp() -> Result<u32> {
    // SAFETY: no arguments.
    code_page("GetConsoleOutputCP", unsafe { GetConsoleOutputCP() })
}

pub fn set_console_output_cp(code_page: u32) -> Result<()> {
    // SAFETY: no pointers.
    check(unsafe { SetConsoleOutputCP(code_page) }, "SetConsoleOutputCP")
}

// ── Modes ─────────────────────────────────────────────────────────────────────

pub fn get_console_mode(console: &ConsoleHandle) -> Result<ConsoleMode> {
    let mut mode = CONSOLE_MODE(0);
    // SAFETY: `mode` is a valid out-pointer; the handle is live.
    check(unsafe { GetConsoleMode(console.as_handle(), &mut mode) }, "GetConsoleMode")?;
    Ok(ConsoleMode::from_bits_retain(mode.0))
}

pub fn set_console_mode(console: &ConsoleHandle, mode: ConsoleMode) -> Result<()> {
    // SAFETY: the handle is live; no pointers.
    check(
        unsafe { SetConsoleMode(console.as_handle(), CONSOLE_MODE(mode.bits())) },
        "SetConsoleMode",
    )
}

pub fn get_console_display_mode() -> Result<ConsoleDisplayMode> {
    let mut flags = 0u32;
    // SAFETY: `flags` is a valid out-pointer.
    check(unsafe { GetConsoleDisplayMode(&mut flags) }, "GetConsoleDisplayMode")?;
    ConsoleDisplayMode::try_from(flags)
        .map_err(|value| WinError::InvalidValue { function: "GetConsoleDisplayMode", value })
}

/// Switch between windowed and full-screen.  Returns the new buffer size.
pub fn set_console_display_mode(
    console: &ConsoleHandle,
    mode: DisplayModeRequest,
) -> Result<Coord> {
    let mut size = Coord::default();
    let out: *mut _ = size.as_native_mut();
    // SAFETY: `out` is a valid out-pointer of the native layout; the handle
    // is live.
    let ok = unsafe { SetConsoleDisplayMode(console.as_handle(), mode as u32, Some(out)) };
    check(ok, "SetConsoleDisplayMode")?;
    Ok(size)
}

// ── Cursor ────────────────────────────────────────────────────────────────────

pub fn get_console_cursor_info(console: &ConsoleHandle) -> Result<ConsoleCursorInfo> {
    let mut info = ConsoleCursorInfo::default();
    // SAFETY: `info` is a valid out-pointer of the native layout.
    let ok = unsafe { GetConsoleCursorInfo(console.as_handle(), info.as_native_mut()) };
    check(ok, "GetConsoleCursorInfo")?;
    Ok(info)
}

pub fn set_console_cursor_info(console: &ConsoleHandle, info: &ConsoleCursorInfo) -> Result<()> {
    // SAFETY: `info` is read-only input of the native layout.
    check(
        unsafe { SetConsoleCursorInfo(console.as_handle(), info.as_native()) },
        "SetConsoleCursorInfo",
    )
}

pub fn set_console_cursor_position(console: &ConsoleHandle, position: Coord) -> Result<()> {
    // SAFETY: COORD is passed by value.
    check(
        unsafe { SetConsoleCursorPosition(console.as_handle(), position.to_native()) },
        "SetConsoleCursorPosition",
    )
}

// ── Screen buffer and window ──────────────────────────────────────────────────

pub fn get_console_screen_buffer_info(
    console: &ConsoleHandle,
) -> Result<ConsoleScreenBufferInfo> {
    let mut info = ConsoleScreenBufferInfo::default();
    // SAFETY: `info` is a valid out-pointer of the native layout.
    let ok = unsafe { GetConsoleScreenBufferInfo(console.as_handle(), info.as_native_mut()) };
    check(ok, "GetConsoleScreenBufferInfo")?;
    Ok(info)
}

pub fn get_console_screen_buffer_info_ex(
    console: &ConsoleHandle,
) -> Result<ConsoleScreenBufferInfoEx> {
    let mut info = ConsoleScreenBufferInfoEx::default();
    // SAFETY: `info` is a valid out-pointer with `cb_size` set.
    let ok = unsafe { GetConsoleScreenBufferInfoEx(console.as_handle(), info.as_native_mut()) };
    check(ok, "GetConsoleScreenBufferInfoEx")?;
    Ok(info)
}

pub fn set_console_screen_buffer_info_ex(
    console: &ConsoleHandle,
    info: &ConsoleScreenBufferInfoEx,
) -> Result<()> {
    // SAFETY: `info` is read-only input of the native layout.
    check(
        unsafe { SetConsoleScreenBufferInfoEx(console.as_handle(), info.as_native()) },
        "SetConsoleScreenBufferInfoEx",
    )
}

pub fn set_console_screen_buffer_size(console: &ConsoleHandle, size: Coord) -> Result<()> {
    // SAFETY: COORD is passed by value.
    check(
        unsafe { SetConsoleScreenBufferSize(console.as_handle(), size.to_native()) },
        "SetConsoleScreenBufferSize",
    )
}

/// Move or resize the window.  With `absolute` false, `window` holds deltas
/// relative to the current window.
pub fn set_console_window_info(
    console: &ConsoleHandle,
    absolute: bool,
    window: &SmallRect,
) -> Result<()> {
    // SAFETY: `window` is read-only input of the native layout.
    check(
        unsafe { SetConsoleWindowInfo(console.as_handle(), absolute, window.as_native()) },
        "SetConsoleWindowInfo",
    )
}

/// Largest window the current font and display allow.
pub fn get_largest_console_window_size(console: &ConsoleHandle) -> Result<Coord> {
    // SAFETY: COORD is returned by value.
    let size = Coord::from_native(unsafe { GetLargestConsoleWindowSize(console.as_handle()) });
    if size == Coord::default() {
        return Err(last_error("GetLargestConsoleWindowSize"));
    }
    Ok(size)
}

pub fn set_console_text_attribute(
    console: &ConsoleHandle,
    attributes: CharacterAttributes,
) -> Result<()> {
    let attributes = CONSOLE_CHARACTER_ATTRIBUTES(attributes.bits());
    // SAFETY: no pointers.
    check(
        unsafe { SetConsoleTextAttribute(console.as_handle(), attributes) },
        "SetConsoleTextAttribute",
    )
}

/// Move the cells in `scroll` so its top-left lands on `destination`,
/// filling the vacated area with `fill`.  Only cells inside `clip` change.
pub fn scroll_console_screen_buffer(
    console: &ConsoleHandle,
    scroll: &SmallRect,
    clip: Option<&SmallRect>,
    destination: Coord,
    fill: &CharInfo,
) -> Result<()> {
    let clip = clip.map(|c| c.as_native() as *const _);
    // SAFETY: `scroll` and `fill` are live references; `clip` is `None` or
    // borrows one.
    let ok = unsafe {
        ScrollConsoleScreenBufferW(
            console.as_handle(),
            scroll.as_native(),
            clip,
            destination.to_native(),
            fill.as_native(),
        )
    };
    check(ok, "ScrollConsoleScreenBufferW")
}

// ── Fonts ─────────────────────────────────────────────────────────────────────

pub fn get_current_console_font(
    console: &ConsoleHandle,
    maximum_window: bool,
) -> Result<ConsoleFontInfo> {
    let mut info = ConsoleFontInfo::default();
    // SAFETY: `info` is a valid out-pointer of the native layout.
    let ok = unsafe {
        GetCurrentConsoleFont(console.as_handle(), maximum_window, info.as_native_mut())
    };
    check(ok, "GetCurrentConsoleFont")?;
    Ok(info)
}

pub fn get_current_console_font_ex(
    console: &ConsoleHandle,
    maximum_window: bool,
) -> Result<ConsoleFontInfoEx> {
    let mut info = ConsoleFontInfoEx::default();
    // SAFETY: `info` is a valid out-pointer with `cb_size` set.
    let ok = unsafe {
        GetCurrentConsoleFontEx(console.as_handle(), maximum_window, info.as_native_mut())
    };
    check(ok, "GetCurrentConsoleFontEx")?;
    Ok(info)
}

pub fn set_current_console_font_ex(
    console: &ConsoleHandle,
    maximum_window: bool,
    info: &ConsoleFontInfoEx,
) -> Result<()> {
    // SAFETY: `info` is read-only input with `cb_size` set.
    let ok = unsafe {
        SetCurrentConsoleFontEx(console.as_handle(), maximum_window, info.as_native())
    };
    check(ok, "SetCurrentConsoleFontEx")
}

/// Cell size of font `font` (an index from [`ConsoleFontInfo::font`]).
pub fn get_console_font_size(console: &ConsoleHandle, font: u32) -> Result<Coord> {
    // SAFETY: COORD is returned by value.
    let size = Coord::from_native(unsafe { GetConsoleFontSize(console.as_handle(), font) });
    if size == Coord::default() {
        return Err(last_error("GetConsoleFontSize"));
    }
    Ok(size)
}

// ── History and selection ─────────────────────────────────────────────────────

pub fn get_console_history_info() -> Result<ConsoleHistoryInfo> {
    let mut info = ConsoleHistoryInfo::default();
    // SAFETY: `info` is a valid out-pointer with `cb_size` set.
    check(unsafe { GetConsoleHistoryInfo(info.as_native_mut()) }, "GetConsoleHistoryInfo")?;
    Ok(info)
}

pub fn set_console_history_info(info: &ConsoleHistoryInfo) -> Result<()> {
    // SAFETY: `info` is read-only input with `cb_size` set.
    check(unsafe { SetConsoleHistoryInfo(info.as_native()) }, "SetConsoleHistoryInfo")
}

pub fn get_console_selection_info() -> Result<ConsoleSelectionInfo> {
    let mut info = ConsoleSelectionInfo::default();
    // SAFETY: `info` is a valid out-pointer of the native layout.
    check(
        unsafe { GetConsoleSelectionInfo(info.as_native_mut()) },
        "GetConsoleSelectionInfo",
    )?;
    Ok(info)
}

// ── Titles ────────────────────────────────────────────────────────────────────

fn title_with(function: &'static str, call: impl Fn(&mut [u16]) -> u32) -> Result<String> {
    let units = grow_until_fits(TITLE_INITIAL_LEN, |buf| {
        len_u32(function, buf.len())?;
        clear_last_error();
        let n = call(buf);
        if n != 0 {
            return Ok(n as usize);
        }
        // Zero with a clear side channel means the buffer was too small
        // (or the title is empty); ask for a larger one.
        match get_last_error() {
            0 => Ok(buf.len()),
            code => {
                log::debug!("{function} failed: error {code}");
                Err(WinError::Win32 { function, code })
            }
        }
    })?;
    Ok(from_wide(&units))
}

pub fn get_console_title() -> Result<String> {
    // SAFETY: the slice is writable for its whole length, the size passed.
    title_with("GetConsoleTitleW", |buf| unsafe { GetConsoleTitleW(buf) })
}

pub fn get_console_original_title() -> Result<String> {
    // SAFETY: the slice is writable for its whole length, the size passed.
    title_with("GetConsoleOriginalTitleW", |buf| unsafe { GetConsoleOriginalTitleW(buf) })
}

pub fn set_console_title(title: &str) -> Result<()> {
    let wide = to_wide("SetConsoleTitleW", title)?;
    // SAFETY: `wide` is NUL-terminated and outlives the call.
    check(unsafe { SetConsoleTitleW(PCWSTR(wide.as_ptr())) }, "SetConsoleTitleW")
}

// ── Processes ─────────────────────────────────────────────────────────────────

/// Ids of every process attached to the current console.
pub fn get_console_process_list() -> Result<Vec<u32>> {
    let mut ids = vec![0u32; PROCESS_LIST_INITIAL_LEN];
    loop {
        len_u32("GetConsoleProcessList", ids.len())?;
        // SAFETY: `ids` is writable for its whole length, the count passed.
        let n = unsafe { GetConsoleProcessList(&mut ids) } as usize;
        if n == 0 {
            return Err(last_error("GetConsoleProcessList"));
        }
        if n <= ids.len() {
            ids.truncate(n);
            return Ok(ids);
        }
        // The return value is the required count when the buffer is short.
        log::trace!("GetConsoleProcessList: growing buffer {} -> {}", ids.len(), n);
        ids.resize(n, 0);
    }
}

// ── Input ─────────────────────────────────────────────────────────────────────

pub fn get_number_of_console_input_events(console: &ConsoleHandle) -> Result<u32> {
    let mut n = 0u32;
    // SAFETY: `n` is a valid out-pointer.
    let ok = unsafe { GetNumberOfConsoleInputEvents(console.as_handle(), &mut n) };
    check(ok, "GetNumberOfConsoleInputEvents")?;
    Ok(n)
}

pub fn get_number_of_console_mouse_buttons() -> Result<u32> {
    let mut n = 0u32;
    // SAFETY: `n` is a valid out-pointer.
    check(
        unsafe { GetNumberOfConsoleMouseButtons(&mut n) },
        "GetNumberOfConsoleMouseButtons",
    )?;
    Ok(n)
}

fn input_with(
    function: &'static str,
    max: usize,
    call: impl FnOnce(&mut [INPUT_RECORD], &mut u32) -> windows::core::Result<()>,
) -> Result<Vec<InputRecord>> {
    len_u32(function, max)?;
    let mut records = vec![InputRecord::default(); max];
    let mut read = 0u32;
    check(call(native_slice_mut(&mut records), &mut read), function)?;
    records.truncate(read as usize);
    Ok(records)
}

/// Up to `max` records from the input queue, leaving them queued.
pub fn peek_console_input(console: &ConsoleHandle, max: usize) -> Result<Vec<InputRecord>> {
    input_with("PeekConsoleInputW", max, |records, read| {
        // SAFETY: `records` is writable for its whole length, the count
        // passed; `read` is a valid out-pointer.
        unsafe { PeekConsoleInputW(console.as_handle(), records, read) }
    })
}

/// Up to `max` records from the input queue, removing them.  Blocks until at
/// least one record is available.
pub fn read_console_input(console: &ConsoleHandle, max: usize) -> Result<Vec<InputRecord>> {
    input_with("ReadConsoleInputW", max, |records, read| {
        // SAFETY: as in `peek_console_input`.
        unsafe { ReadConsoleInputW(console.as_handle(), records, read) }
    })
}

/// Append `records` to the input queue.  Returns the number written.
pub fn write_console_input(console: &ConsoleHandle, records: &[InputRecord]) -> Result<u32> {
    len_u32("WriteConsoleInputW", records.len())?;
    let mut written = 0u32;
    // SAFETY: `records` is readable for its whole length, the count passed;
    // `written` is a valid out-pointer.
    let ok = unsafe {
        WriteConsoleInputW(console.as_handle(), native_slice(records), &mut written)
    };
    check(ok, "WriteConsoleInputW")?;
    Ok(written)
}

pub fn flush_console_input_buffer(console: &ConsoleHandle) -> Result<()> {
    // SAFETY: no pointers.
    check(
        unsafe { FlushConsoleInputBuffer(console.as_handle()) },
        "FlushConsoleInputBuffer",
    )
}

/// Read up to `max` characters of line input.
pub fn read_console(
    console: &ConsoleHandle,
    max: usize,
    control: Option<&ReadConsoleControl>,
) -> Result<String> {
    let mut buf = vec![0u16; max];
    let cap = len_u32("ReadConsoleW", max)?;
    let mut read = 0u32;
    let control = control.map(|c| c.as_native() as *const _);
    // SAFETY: `buf` is writable for `cap` units; `read` is a valid
    // out-pointer; `control` is `None` or a live structure with `length` set.
    let ok = unsafe {
        ReadConsoleW(console.as_handle(), buf.as_mut_ptr().cast(), cap, &mut read, control)
    };
    check(ok, "ReadConsoleW")?;
    buf.truncate(read as usize);
    Ok(String::from_utf16_lossy(&buf))
}

// ── Output ────────────────────────────────────────────────────────────────────

/// Write `text` at the cursor.  Returns the number of UTF-16 units written.
pub fn write_console(console: &ConsoleHandle, text: &str) -> Result<u32> {
    let units: Vec<u16> = text.encode_utf16().collect();
    len_u32("WriteConsoleW", units.len())?;
    let mut written = 0u32;
    let out: *mut u32 = &mut written;
    // SAFETY: `units` is readable for its whole length; `out` is a valid
    // out-pointer; the reserved argument must be NULL.
    let ok = unsafe { WriteConsoleW(console.as_handle(), &units, Some(out), None) };
    check(ok, "WriteConsoleW")?;
    Ok(written)
}

/// Set the attributes of `len` cells starting at `at`.  Returns the count set.
pub fn fill_console_output_attribute(
    console: &ConsoleHandle,
    attributes: CharacterAttributes,
    len: u32,
    at: Coord,
) -> Result<u32> {
    let mut written = 0u32;
    // SAFETY: `written` is a valid out-pointer.
    let ok = unsafe {
        FillConsoleOutputAttribute(
            console.as_handle(),
            attributes.bits(),
            len,
            at.to_native(),
            &mut written,
        )
    };
    check(ok, "FillConsoleOutputAttribute")?;
    Ok(written)
}

/// Write `ch` into `len` cells starting at `at`.  Returns the count written.
pub fn fill_console_output_character(
    console: &ConsoleHandle,
    ch: char,
    len: u32,
    at: Coord,
) -> Result<u32> {
    let unit = u16::try_from(u32::from(ch)).map_err(|_| WinError::InvalidValue {
        function: "FillConsoleOutputCharacterW",
        value: u32::from(ch),
    })?;
    let mut written = 0u32;
    // SAFETY: `written` is a valid out-pointer.
    let ok = unsafe {
        FillConsoleOutputCharacterW(console.as_handle(), unit, len, at.to_native(), &mut written)
    };
    check(ok, "FillConsoleOutputCharacterW")?;
    Ok(written)
}

/// Read a `size` block of cells from `region` into a fresh buffer, placing
/// the region at `at` within it.  Returns the cells and the region actually
/// read.
pub fn read_console_output(
    console: &ConsoleHandle,
    size: Coord,
    at: Coord,
    region: SmallRect,
) -> Result<(Vec<CharInfo>, SmallRect)> {
    let mut cells = vec![CharInfo::default(); size.area()];
    let mut region = region;
    // SAFETY: `cells` holds `size.x * size.y` cells, the buffer size passed;
    // `region` is a valid in/out pointer of the native layout.
    let ok = unsafe {
        ReadConsoleOutputW(
            console.as_handle(),
            native_slice_mut(&mut cells).as_mut_ptr(),
            size.to_native(),
            at.to_native(),
            region.as_native_mut(),
        )
    };
    check(ok, "ReadConsoleOutputW")?;
    Ok((cells, region))
}

/// Write `cells`, laid out as a `size` block, to `region`, starting from
/// `at` within the block.  Returns the region actually written.
pub fn write_console_output(
    console: &ConsoleHandle,
    cells: &[CharInfo],
    size: Coord,
    at: Coord,
    region: SmallRect,
) -> Result<SmallRect> {
    if cells.len() < size.area() {
        return Err(WinError::InvalidValue {
            function: "WriteConsoleOutputW",
            value: u32::try_from(cells.len()).unwrap_or(u32::MAX),
        });
    }
    let mut region = region;
    // SAFETY: `cells` holds at least `size.x * size.y` cells (checked
    // above); `region` is a valid in/out pointer of the native layout.
    let ok = unsafe {
        WriteConsoleOutputW(
            console.as_handle(),
            native_slice(cells).as_ptr(),
            size.to_native(),
            at.to_native(),
            region.as_native_mut(),
        )
    };
    check(ok, "WriteConsoleOutputW")?;
    Ok(region)
}

/// Attributes of `len` consecutive cells starting at `at`.
pub fn read_console_output_attribute(
    console: &ConsoleHandle,
    len: u32,
    at: Coord,
) -> Result<Vec<CharacterAttributes>> {
    let mut raw = vec![0u16; len as usize];
    let mut read = 0u32;
    // SAFETY: `raw` is writable for its whole length, the count passed;
    // `read` is a valid out-pointer.
    let ok = unsafe {
        ReadConsoleOutputAttribute(console.as_handle(), &mut raw, at.to_native(), &mut read)
    };
    check(ok, "ReadConsoleOutputAttribute")?;
    raw.truncate(read as usize);
    Ok(raw.into_iter().map(CharacterAttributes::from_bits_retain).collect())
}

/// Set consecutive cell attributes starting at `at`.  Returns the count set.
pub fn write_console_output_attribute(
    console: &ConsoleHandle,
    attributes: &[CharacterAttributes],
    at: Coord,
) -> Result<u32> {
    len_u32("WriteConsoleOutputAttribute", attributes.len())?;
    let raw: Vec<u16> = attributes.iter().map(CharacterAttributes::bits).collect();
    let mut written = 0u32;
    // SAFETY: `raw` is readable for its whole length, the count passed.
    let ok = unsafe {
        WriteConsoleOutputAttribute(console.as_handle(), &raw, at.to_native(), &mut written)
    };
    check(ok, "WriteConsoleOutputAttribute")?;
    Ok(written)
}

/// Characters of `len` consecutive cells starting at `at`.
pub fn read_console_output_character(
    console: &ConsoleHandle,
    len: u32,
    at: Coord,
) -> Result<String> {
    let mut buf = vec![0u16; len as usize];
    let mut read = 0u32;
    // SAFETY: `buf` is writable for its whole length; `read` is a valid
    // out-pointer.
    let ok = unsafe {
        ReadConsoleOutputCharacterW(console.as_handle(), &mut buf, at.to_native(), &mut read)
    };
    check(ok, "ReadConsoleOutputCharacterW")?;
    buf.truncate(read as usize);
    Ok(String::from_utf16_lossy(&buf))
}

/// Write `text` into consecutive cells starting at `at`.  Returns the count
/// written.
pub fn write_console_output_character(
    console: &ConsoleHandle,
    text: &str,
    at: Coord,
) -> Result<u32> {
    let units: Vec<u16> = text.encode_utf16().collect();
    len_u32("WriteConsoleOutputCharacterW", units.len())?;
    let mut written = 0u32;
    // SAFETY: `units` is readable for its whole length; no terminator is
    // needed since the length is explicit.
    let ok = unsafe {
        WriteConsoleOutputCharacterW(console.as_handle(), &units, at.to_native(), &mut written)
    };
    check(ok, "WriteConsoleOutputCharacterW")?;
    Ok(written)
}

// ── Control ───────────────────────────────────────────────────────────────────

/// Send `event` to the console process group `group` (0 = every process on
/// this console).
pub fn generate_console_ctrl_event(event: CtrlEvent, group: u32) -> Result<()> {
    // SAFETY: no pointers.
    check(
        unsafe { GenerateConsoleCtrlEvent(event as u32, group) },
        "GenerateConsoleCtrlEvent",
    )
}

/// Add or remove a control handler.  With `None`, `add` toggles whether the
/// process ignores Ctrl+C.
pub fn set_console_ctrl_handler(handler: Option<HandlerRoutine>, add: bool) -> Result<()> {
    // SAFETY: the handler is a `'static` function pointer, so it stays valid
    // for as long as it remains registered.
    check(unsafe { SetConsoleCtrlHandler(handler, add) }, "SetConsoleCtrlHandler")
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(all(test, windows))]
mod tests {
    use super::*;
    use crate::types::console::CtrlType;

    fn init_logging() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    /// Test runners frequently have no console; those tests return early.
    fn has_console() -> bool {
        get_console_window().is_some()
    }

    fn u16s(s: &str) -> Vec<u16> {
        s.encode_utf16().collect()
    }

    #[test]
    fn alias_block_is_split_on_equals() {
        let mut buf = u16s("ls=dir $*");
        buf.push(0);
        buf.extend(u16s("cat=type $1"));
        buf.extend_from_slice(&[0, 0]);
        assert_eq!(
            parse_alias_block(&buf),
            vec![
                ("ls".to_owned(), "dir $*".to_owned()),
                ("cat".to_owned(), "type $1".to_owned()),
            ]
        );
    }

    #[test]
    fn alias_without_target_keeps_source() {
        let mut buf = u16s("lonely");
        buf.push(0);
        assert_eq!(parse_alias_block(&buf), vec![("lonely".to_owned(), String::new())]);
    }

    #[test]
    fn borrowed_handle_is_never_closed() {
        let h = ConsoleHandle::borrowed(handle_from_raw(0x7777));
        assert!(!h.is_owned());
        h.close().expect("releasing a borrowed handle never fails");
    }

    #[test]
    fn output_buffer_round_trip() {
        init_logging();
        if !has_console() {
            return;
        }
        let buffer = create_console_screen_buffer(
            ConsoleAccess::GENERIC_READ | ConsoleAccess::GENERIC_WRITE,
            ConsoleShareMode::FILE_SHARE_READ | ConsoleShareMode::FILE_SHARE_WRITE,
            None,
            ConsoleBufferFlags::CONSOLE_TEXTMODE_BUFFER,
        )
        .expect("CreateConsoleScreenBuffer");
        assert!(buffer.is_owned());

        let at = Coord::new(0, 0);
        let n = write_console_output_character(&buffer, "winlayer", at).expect("write chars");
        assert_eq!(n, 8);
        assert_eq!(read_console_output_character(&buffer, 8, at).expect("read chars"), "winlayer");

        let red = CharacterAttributes::FOREGROUND_RED | CharacterAttributes::FOREGROUND_INTENSITY;
        assert_eq!(fill_console_output_attribute(&buffer, red, 4, at).expect("fill"), 4);
        let attrs = read_console_output_attribute(&buffer, 4, at).expect("read attrs");
        assert_eq!(attrs, vec![red; 4]);

        let info = get_console_screen_buffer_info(&buffer).expect("buffer info");
        let ex = get_console_screen_buffer_info_ex(&buffer).expect("buffer info ex");
        assert_eq!(ConsoleScreenBufferInfo::from(&ex).size, info.size);

        buffer.close().expect("CloseHandle");
    }

    #[test]
    fn title_round_trip() {
        if !has_console() {
            return;
        }
        let before = get_console_title().expect("GetConsoleTitleW");
        set_console_title("winlayer title test").expect("SetConsoleTitleW");
        assert_eq!(get_console_title().expect("GetConsoleTitleW"), "winlayer title test");
        set_console_title(&before).expect("restore title");
    }

    #[test]
    fn current_process_is_attached() {
        if !has_console() {
            return;
        }
        let ids = get_console_process_list().expect("GetConsoleProcessList");
        assert!(ids.contains(&std::process::id()));
    }

    #[test]
    fn input_queue_round_trip() {
        if !has_console() {
            return;
        }
        let Ok(input) = get_std_handle(StandardDevice::Input) else {
            return;
        };
        flush_console_input_buffer(&input).expect("flush");
        let focus = InputRecord::focus(true);
        assert_eq!(write_console_input(&input, &[focus]).expect("write input"), 1);
        let peeked = peek_console_input(&input, 4).expect("peek");
        assert_eq!(peeked, vec![focus]);
        assert_eq!(read_console_input(&input, 4).expect("read"), vec![focus]);
    }

    #[test]
    fn ctrl_handler_registration() {
        unsafe extern "system" fn handler(ctrl: u32) -> BOOL {
            BOOL::from(CtrlType::try_from(ctrl) == Ok(CtrlType::CtrlBreak))
        }
        set_console_ctrl_handler(Some(handler), true).expect("add handler");
        set_console_ctrl_handler(Some(handler), false).expect("remove handler");
    }

    #[test]
    fn astral_fill_character_is_rejected() {
        let h = ConsoleHandle::borrowed(handle_from_raw(0));
        assert!(matches!(
            fill_console_output_character(&h, '\u{1F600}', 1, Coord::default()),
            Err(WinError::InvalidValue { .. })
        ));
    }
}
