// ── Clipboard ─────────────────────────────────────────────────────────────────
//
// Ownership, content, formats and change observation.  The clipboard is a
// per-thread resource: `ClipboardGuard` is neither `Send` nor `Sync`, so it
// is always closed on the thread that opened it.
//
// Several getters return NULL both for "nothing there" and for failure; those
// clear the side channel first and only report an error when it is non-zero
// afterwards.

use std::ffi::c_void;
use std::marker::PhantomData;

use windows::core::PCWSTR;
use windows::Win32::Foundation::{GlobalFree, HANDLE, HGLOBAL, HWND};
use windows::Win32::System::DataExchange::{
    AddClipboardFormatListener, ChangeClipboardChain, CloseClipboard, CountClipboardFormats,
    EmptyClipboard, EnumClipboardFormats, GetClipboardData, GetClipboardFormatNameW,
    GetClipboardOwner, GetClipboardSequenceNumber, GetClipboardViewer, GetOpenClipboardWindow,
    GetPriorityClipboardFormat, GetUpdatedClipboardFormats, IsClipboardFormatAvailable,
    OpenClipboard, RegisterClipboardFormatW, RemoveClipboardFormatListener, SetClipboardData,
    SetClipboardViewer,
};
use windows::Win32::System::Memory::{
    GlobalAlloc, GlobalLock as LockGlobal, GlobalSize, GlobalUnlock, GMEM_MOVEABLE,
};

use super::{
    check, clear_last_error, hwnd_or_null, last_error, len_u32, optional, side_channel,
};
use crate::error::{Result, WinError};
use crate::types::clipboard::{format::CF_UNICODETEXT, PriorityFormat};
use crate::wide::{enumerate_cursor, from_wide, to_wide};

/// Registered format names are at most 255 characters.
const FORMAT_NAME_LEN: usize = 256;

// ── Ownership ─────────────────────────────────────────────────────────────────

/// Open the clipboard for the calling thread, associating it with `owner`
/// (or with the current task when `None`).
pub fn open_clipboard(owner: Option<HWND>) -> Result<()> {
    // SAFETY: a NULL or caller-provided window handle; no pointers.
    check(unsafe { OpenClipboard(hwnd_or_null(owner)) }, "OpenClipboard")
}

pub fn close_clipboard() -> Result<()> {
    // SAFETY: no arguments; fails cleanly when this thread has not opened it.
    check(unsafe { CloseClipboard() }, "CloseClipboard")
}

/// Entry point for scoped clipboard access.
pub struct Clipboard;

impl Clipboard {
    /// Open the clipboard; it is closed again when the guard drops.
    pub fn open(owner: Option<HWND>) -> Result<ClipboardGuard> {
        open_clipboard(owner)?;
        Ok(ClipboardGuard { _thread_bound: PhantomData })
    }
}

/// Proof that this thread holds the clipboard open.
#[must_use = "dropping the guard closes the clipboard"]
pub struct ClipboardGuard {
    _thread_bound: PhantomData<*const ()>,
}

impl ClipboardGuard {
    pub fn empty(&self) -> Result<()> {
        empty_clipboard()
    }

    pub fn formats(&self) -> Result<Vec<u32>> {
        enum_clipboard_formats()
    }

    pub fn get_text(&self) -> Result<Option<String>> {
        get_text()
    }

    pub fn set_text(&self, text: &str) -> Result<()> {
        set_text(text)
    }

    /// Close now and report the result, instead of ignoring it on drop.
    pub fn close(self) -> Result<()> {
        std::mem::forget(self);
        close_clipboard()
    }
}

impl Drop for ClipboardGuard {
    fn drop(&mut self) {
        // SAFETY: the guard only exists while this thread holds the clipboard
        // open (it is !Send), so the close cannot affect another thread.
        let _ = unsafe { CloseClipboard() };
    }
}

// ── Content ───────────────────────────────────────────────────────────────────

/// Empty the clipboard and take ownership of it.  The clipboard must be open.
pub fn empty_clipboard() -> Result<()> {
    // SAFETY: no arguments.
    check(unsafe { EmptyClipboard() }, "EmptyClipboard")
}

/// Handle to the data in `format`, or `None` when the format is absent.
/// The clipboard must be open; the handle belongs to the clipboard.
pub fn get_clipboard_data(format: u32) -> Result<Option<HANDLE>> {
    clear_last_error();
    // SAFETY: no pointers; the returned handle is not owned by the caller.
    optional(unsafe { GetClipboardData(format) }, "GetClipboardData")
}

/// Place `data` on the clipboard in `format`.  On success the system owns
/// `data`.  A NULL `data` requests delayed rendering.
pub fn set_clipboard_data(format: u32, data: HANDLE) -> Result<()> {
    clear_last_error();
    // SAFETY: `data` is either NULL or a movable global memory handle the
    // caller is handing over.
    let placed = unsafe { SetClipboardData(format, data) };
    if data.0.is_null() {
        // Delayed rendering succeeds with a NULL result.
        return optional(placed, "SetClipboardData").map(|_| ());
    }
    check(placed, "SetClipboardData").map(|_| ())
}

/// A locked global memory block; unlocked on drop.
struct GlobalLock {
    mem: HGLOBAL,
    ptr: *mut c_void,
}

impl GlobalLock {
    fn new(mem: HGLOBAL) -> Result<Self> {
        // SAFETY: `mem` is a global memory handle (from GetClipboardData or
        // GlobalAlloc); GlobalLock validates it and returns NULL on failure.
        let ptr = unsafe { LockGlobal(mem) };
        if ptr.is_null() {
            return Err(last_error("GlobalLock"));
        }
        Ok(Self { mem, ptr })
    }

    /// Size of the block in bytes.
    fn size(&self) -> usize {
        // SAFETY: `mem` is valid while locked.
        unsafe { GlobalSize(self.mem) }
    }
}

impl Drop for GlobalLock {
    fn drop(&mut self) {
        // SAFETY: balanced with the successful GlobalLock in `new`.
        let _ = unsafe { GlobalUnlock(self.mem) };
    }
}

/// Read `CF_UNICODETEXT`.  `None` when no text is on the clipboard.  The
/// clipboard must be open.
pub fn get_text() -> Result<Option<String>> {
    if !is_clipboard_format_available(CF_UNICODETEXT)? {
        return Ok(None);
    }
    let Some(h) = get_clipboard_data(CF_UNICODETEXT)? else {
        return Ok(None);
    };
    let lock = GlobalLock::new(HGLOBAL(h.0))?;
    let units = lock.size() / 2;
    // SAFETY: the locked block is at least `size` bytes, suitably aligned
    // for u16 (global memory is 8-byte aligned), and stays locked until
    // `lock` drops after the copy below.
    let text = unsafe { std::slice::from_raw_parts(lock.ptr as *const u16, units) };
    Ok(Some(from_wide(text)))
}

/// Replace the clipboard contents with `text` as `CF_UNICODETEXT`.  The
/// clipboard must be open.
///
/// The text is copied into global memory before the clipboard is emptied, so
/// a failed allocation leaves the old contents in place.  Once emptied they
/// are gone: if `SetClipboardData` then fails the clipboard is left empty.
pub fn set_text(text: &str) -> Result<()> {
    let wide = to_wide("SetClipboardData", text)?;
    let bytes = wide.len() * 2;

    // SAFETY: allocation only.
    let mem = check(unsafe { GlobalAlloc(GMEM_MOVEABLE, bytes) }, "GlobalAlloc")?;

    let filled = GlobalLock::new(mem).map(|lock| {
        // SAFETY: the block holds `bytes` bytes; `wide` holds exactly
        // `wide.len()` units and does not overlap fresh global memory.
        unsafe { std::ptr::copy_nonoverlapping(wide.as_ptr(), lock.ptr.cast::<u16>(), wide.len()) };
    });
    let placed = filled
        .and_then(|()| empty_clipboard())
        .and_then(|()| set_clipboard_data(CF_UNICODETEXT, HANDLE(mem.0)));

    if placed.is_err() {
        // SAFETY: the system did not take ownership, so the block is still ours.
        let _ = unsafe { GlobalFree(mem) };
    }
    placed
}

// ── Formats ───────────────────────────────────────────────────────────────────

pub fn count_clipboard_formats() -> Result<u32> {
    clear_last_error();
    // SAFETY: no arguments.
    let n = unsafe { CountClipboardFormats() };
    if n == 0 {
        side_channel("CountClipboardFormats")?;
    }
    Ok(n.max(0) as u32)
}

/// Every format currently on the clipboard, in the order the clipboard
/// reports them.  The clipboard must be open.
pub fn enum_clipboard_formats() -> Result<Vec<u32>> {
    clear_last_error();
    enumerate_cursor(
        // SAFETY: the cursor is the previous return value (0 to start).
        |prev| unsafe { EnumClipboardFormats(prev) },
        || side_channel("EnumClipboardFormats"),
    )
}

pub fn is_clipboard_format_available(format: u32) -> Result<bool> {
    clear_last_error();
    // SAFETY: no pointers.
    let available = unsafe { IsClipboardFormatAvailable(format) };
    optional(available, "IsClipboardFormatAvailable").map(|found| found.is_some())
}

/// Register (or look up) a named format.  Registered ids lie in
/// `0xC000..=0xFFFF`.
pub fn register_clipboard_format(name: &str) -> Result<u32> {
    let wide = to_wide("RegisterClipboardFormatW", name)?;
    // SAFETY: `wide` is NUL-terminated and outlives the call.
    let id = unsafe { RegisterClipboardFormatW(PCWSTR(wide.as_ptr())) };
    if id == 0 {
        return Err(last_error("RegisterClipboardFormatW"));
    }
    Ok(id)
}

/// Name of a registered format.  Fails for predefined formats.
pub fn get_clipboard_format_name(format: u32) -> Result<String> {
    let mut buf = [0u16; FORMAT_NAME_LEN];
    // SAFETY: the binding passes `buf`'s length as the capacity.
    let n = unsafe { GetClipboardFormatNameW(format, &mut buf) };
    if n <= 0 {
        return Err(last_error("GetClipboardFormatNameW"));
    }
    Ok(from_wide(&buf[..n as usize]))
}

/// First format of `priorities` that is on the clipboard.
pub fn get_priority_clipboard_format(priorities: &[u32]) -> Result<PriorityFormat> {
    if i32::try_from(priorities.len()).is_err() {
        return Err(WinError::InvalidValue {
            function: "GetPriorityClipboardFormat",
            value: u32::MAX,
        });
    }
    // SAFETY: the binding passes `priorities` with its length.
    let raw = unsafe { GetPriorityClipboardFormat(priorities) };
    Ok(PriorityFormat::from_raw(raw))
}

/// Formats currently on the clipboard, without opening it.  At most `max`
/// entries are returned.
pub fn get_updated_clipboard_formats(max: usize) -> Result<Vec<u32>> {
    len_u32("GetUpdatedClipboardFormats", max)?;
    let mut formats = vec![0u32; max];
    let mut written = 0u32;
    // SAFETY: the binding passes `formats` with its length; `written` is a
    // valid out-pointer.
    let ok = unsafe { GetUpdatedClipboardFormats(&mut formats, &mut written) };
    check(ok, "GetUpdatedClipboardFormats")?;
    formats.truncate(written as usize);
    Ok(formats)
}

// ── Observation ───────────────────────────────────────────────────────────────

fn window_query(
    function: &'static str,
    call: impl FnOnce() -> windows::core::Result<HWND>,
) -> Result<Option<HWND>> {
    clear_last_error();
    optional(call(), function)
}

pub fn get_clipboard_owner() -> Result<Option<HWND>> {
    // SAFETY: takes no arguments and only returns a handle.
    window_query("GetClipboardOwner", || unsafe { GetClipboardOwner() })
}

pub fn get_clipboard_viewer() -> Result<Option<HWND>> {
    // SAFETY: as above.
    window_query("GetClipboardViewer", || unsafe { GetClipboardViewer() })
}

pub fn get_open_clipboard_window() -> Result<Option<HWND>> {
    // SAFETY: as above.
    window_query("GetOpenClipboardWindow", || unsafe { GetOpenClipboardWindow() })
}

/// Changes with every clipboard modification; 0 without window-station
/// access.
pub fn get_clipboard_sequence_number() -> u32 {
    // SAFETY: no arguments.
    unsafe { GetClipboardSequenceNumber() }
}

/// Post `WM_CLIPBOARDUPDATE` to `hwnd` on every change.
pub fn add_clipboard_format_listener(hwnd: HWND) -> Result<()> {
    // SAFETY: the window handle is only recorded.
    check(unsafe { AddClipboardFormatListener(hwnd) }, "AddClipboardFormatListener")
}

pub fn remove_clipboard_format_listener(hwnd: HWND) -> Result<()> {
    // SAFETY: see `add_clipboard_format_listener`.
    check(
        unsafe { RemoveClipboardFormatListener(hwnd) },
        "RemoveClipboardFormatListener",
    )
}

/// Join the legacy viewer chain.  Returns the next window in the chain.
pub fn set_clipboard_viewer(hwnd: HWND) -> Result<Option<HWND>> {
    // SAFETY: the window handle is only recorded.
    window_query("SetClipboardViewer", || unsafe { SetClipboardViewer(hwnd) })
}

/// Leave the legacy viewer chain.  The result is whatever the chain's
/// windows answered to `WM_CHANGECBCHAIN`, typically `false`.
pub fn change_clipboard_chain(remove: HWND, next: Option<HWND>) -> bool {
    // SAFETY: window handles only; the call sends a message along the chain.
    unsafe { ChangeClipboardChain(remove, hwnd_or_null(next)) }.as_bool()
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(all(test, windows))]
mod tests {
    use windows::Win32::Foundation::ERROR_ACCESS_DENIED;

    use super::*;

    #[test]
    fn registering_twice_yields_same_id() {
        let a = register_clipboard_format("winlayer.test.format").expect("register");
        let b = register_clipboard_format("winlayer.test.format").expect("register again");
        assert_eq!(a, b);
        assert!(crate::types::clipboard::is_registered_format(a));
        assert_eq!(get_clipboard_format_name(a).expect("name"), "winlayer.test.format");
    }

    #[test]
    fn predefined_formats_have_no_registered_name() {
        assert!(get_clipboard_format_name(CF_UNICODETEXT).is_err());
    }

    #[test]
    fn empty_priority_list_is_handled() {
        // Any outcome is valid here; the call must simply not fail.
        let _ = get_priority_clipboard_format(&[]).expect("priority");
    }

    #[test]
    fn text_round_trips_through_the_clipboard() {
        let _ = env_logger::builder().is_test(true).try_init();
        let guard = match Clipboard::open(None) {
            Ok(guard) => guard,
            // Another process holds the clipboard, or the session has no
            // interactive window station.
            Err(e) if e.code() == Some(ERROR_ACCESS_DENIED.0) => return,
            Err(e) => panic!("OpenClipboard: {e}"),
        };

        guard.empty().expect("EmptyClipboard");
        guard.set_text("winlayer clipboard text").expect("set_text");

        let formats = guard.formats().expect("EnumClipboardFormats");
        assert!(formats.contains(&CF_UNICODETEXT), "formats: {formats:?}");
        assert!(is_clipboard_format_available(CF_UNICODETEXT).expect("available"));
        assert_eq!(guard.get_text().expect("get_text").as_deref(), Some("winlayer clipboard text"));
        assert_eq!(count_clipboard_formats().expect("count") as usize, formats.len());

        guard.close().expect("CloseClipboard");
    }

    #[test]
    fn sequence_number_is_stable_without_changes() {
        let a = get_clipboard_sequence_number();
        let b = get_clipboard_sequence_number();
        assert!(b >= a);
    }
}
