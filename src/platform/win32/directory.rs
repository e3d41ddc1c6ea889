// ── Directories ───────────────────────────────────────────────────────────────
//
// Creation and removal (plain, templated and transacted), the process current
// directory, and change notification in both forms: the waitable
// `FindFirstChangeNotification` handle and the record-returning
// `ReadDirectoryChangesW`.

use std::cell::Cell;
use std::ffi::c_void;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use std::time::Duration;

use windows::core::PCWSTR;
use windows::Win32::Foundation::{HANDLE, WAIT_FAILED, WAIT_OBJECT_0, WAIT_TIMEOUT};
use windows::Win32::Storage::FileSystem::{
    CreateDirectoryExW, CreateDirectoryTransactedW, CreateDirectoryW, CreateFileW,
    FindCloseChangeNotification, FindFirstChangeNotificationW, FindNextChangeNotification,
    ReadDirectoryChangesW, RemoveDirectoryTransactedW, RemoveDirectoryW,
    FILE_FLAG_BACKUP_SEMANTICS, FILE_LIST_DIRECTORY, FILE_NOTIFY_CHANGE, FILE_SHARE_DELETE,
    FILE_SHARE_READ, FILE_SHARE_WRITE, OPEN_EXISTING,
};
use windows::Win32::System::Environment::{GetCurrentDirectoryW, SetCurrentDirectoryW};
use windows::Win32::System::Threading::{WaitForSingleObject, INFINITE};

use super::abi::security_ptr;
use super::handle::OwnedHandle;
use super::{check, check_bool, handle_from_raw, last_error, len_u32, raw_handle};
use crate::error::{Result, WinError};
use crate::types::io::{parse_notify_buffer, FileNotification, NotifyFilter, SecurityAttributes};
use crate::wide::{path_to_wide, query_then_fetch};

fn wide_ptr(wide: &[u16]) -> PCWSTR {
    PCWSTR(wide.as_ptr())
}

// ── Create / remove ───────────────────────────────────────────────────────────

pub fn create_directory(path: &Path, security: Option<&SecurityAttributes>) -> Result<()> {
    let path = path_to_wide("CreateDirectoryW", path)?;
    // SAFETY: `path` is NUL-terminated and outlives the call; the security
    // pointer is NULL or a live structure.
    check(
        unsafe { CreateDirectoryW(wide_ptr(&path), security_ptr(security)) },
        "CreateDirectoryW",
    )
}

/// Create `path` with the attributes of `template`.
pub fn create_directory_ex(
    template: &Path,
    path: &Path,
    security: Option<&SecurityAttributes>,
) -> Result<()> {
    const F: &str = "CreateDirectoryExW";
    let template = path_to_wide(F, template)?;
    let path = path_to_wide(F, path)?;
    // SAFETY: both paths are NUL-terminated and outlive the call.
    check(
        unsafe { CreateDirectoryExW(wide_ptr(&template), wide_ptr(&path), security_ptr(security)) },
        F,
    )
}

/// Create `path` as part of the kernel transaction `transaction`.
pub fn create_directory_transacted(
    template: Option<&Path>,
    path: &Path,
    security: Option<&SecurityAttributes>,
    transaction: &OwnedHandle,
) -> Result<()> {
    const F: &str = "CreateDirectoryTransactedW";
    let template = template.map(|t| path_to_wide(F, t)).transpose()?;
    let path = path_to_wide(F, path)?;
    let template_ptr = template.as_deref().map_or(PCWSTR::null(), wide_ptr);
    // SAFETY: the paths are NULL or NUL-terminated and outlive the call; the
    // transaction handle is live for the borrow.
    let created = unsafe {
        CreateDirectoryTransactedW(
            template_ptr,
            wide_ptr(&path),
            security_ptr(security),
            transaction.as_handle(),
        )
    };
    check(created, F)
}

/// Remove an empty directory.
pub fn remove_directory(path: &Path) -> Result<()> {
    let path = path_to_wide("RemoveDirectoryW", path)?;
    // SAFETY: `path` is NUL-terminated and outlives the call.
    check(unsafe { RemoveDirectoryW(wide_ptr(&path)) }, "RemoveDirectoryW")
}

pub fn remove_directory_transacted(path: &Path, transaction: &OwnedHandle) -> Result<()> {
    let path = path_to_wide("RemoveDirectoryTransactedW", path)?;
    // SAFETY: `path` is NUL-terminated; the transaction handle is live.
    check(
        unsafe { RemoveDirectoryTransactedW(wide_ptr(&path), transaction.as_handle()) },
        "RemoveDirectoryTransactedW",
    )
}

// ── Current directory ─────────────────────────────────────────────────────────

pub fn get_current_directory() -> Result<PathBuf> {
    use std::os::windows::ffi::OsStringExt;

    let units = query_then_fetch(|buf| {
        len_u32("GetCurrentDirectoryW", buf.len())?;
        let out = if buf.is_empty() { None } else { Some(buf) };
        // SAFETY: the binding passes NULL with a zero size (the size query)
        // or the slice with its length.
        let n = unsafe { GetCurrentDirectoryW(out) };
        if n == 0 {
            return Err(last_error("GetCurrentDirectoryW"));
        }
        Ok(n as usize)
    })?;
    Ok(PathBuf::from(std::ffi::OsString::from_wide(&units)))
}

pub fn set_current_directory(path: &Path) -> Result<()> {
    let path = path_to_wide("SetCurrentDirectoryW", path)?;
    // SAFETY: `path` is NUL-terminated and outlives the call.
    check_bool(unsafe { SetCurrentDirectoryW(wide_ptr(&path)) }, "SetCurrentDirectoryW")
}

// ── Change notification handles ───────────────────────────────────────────────

/// A waitable change-notification handle, closed on drop.
#[derive(Debug)]
pub struct ChangeNotification {
    raw: isize,
    _not_sync: PhantomData<Cell<()>>,
}

/// Watch `path` (and its subtree when `subtree` is set) for changes matching
/// `filter`.
pub fn find_first_change_notification(
    path: &Path,
    subtree: bool,
    filter: NotifyFilter,
) -> Result<ChangeNotification> {
    const F: &str = "FindFirstChangeNotificationW";
    let path = path_to_wide(F, path)?;
    // SAFETY: `path` is NUL-terminated and outlives the call.
    let h = unsafe {
        FindFirstChangeNotificationW(wide_ptr(&path), subtree, FILE_NOTIFY_CHANGE(filter.bits()))
    };
    let h = check(h, F)?;
    Ok(ChangeNotification { raw: raw_handle(h), _not_sync: PhantomData })
}

impl ChangeNotification {
    pub fn as_handle(&self) -> HANDLE {
        handle_from_raw(self.raw)
    }

    /// Re-arm after a signalled wait.
    pub fn next(&self) -> Result<()> {
        // SAFETY: the handle is live for the borrow.
        check(
            unsafe { FindNextChangeNotification(self.as_handle()) },
            "FindNextChangeNotification",
        )
    }

    /// Block until a change is signalled (`true`) or `timeout` elapses
    /// (`false`).  `None` waits forever.
    pub fn wait(&self, timeout: Option<Duration>) -> Result<bool> {
        let ms = timeout.map_or(INFINITE, |t| {
            u32::try_from(t.as_millis()).unwrap_or(INFINITE - 1)
        });
        // SAFETY: the handle is live for the borrow.
        let event = unsafe { WaitForSingleObject(self.as_handle(), ms) };
        if event == WAIT_OBJECT_0 {
            Ok(true)
        } else if event == WAIT_TIMEOUT {
            Ok(false)
        } else if event == WAIT_FAILED {
            Err(last_error("WaitForSingleObject"))
        } else {
            Err(WinError::InvalidValue { function: "WaitForSingleObject", value: event.0 })
        }
    }

    /// Close now and report the result.
    pub fn close(self) -> Result<()> {
        let h = self.as_handle();
        std::mem::forget(self);
        // SAFETY: ownership was released above, so the handle is closed once.
        check(unsafe { FindCloseChangeNotification(h) }, "FindCloseChangeNotification")
    }
}

impl Drop for ChangeNotification {
    fn drop(&mut self) {
        // SAFETY: `raw` came from FindFirstChangeNotificationW and is closed
        // exactly once.
        let _ = unsafe { FindCloseChangeNotification(self.as_handle()) };
    }
}

// ── Change records ────────────────────────────────────────────────────────────

/// Open `path` as a directory handle suitable for [`read_directory_changes`].
pub fn open_directory(path: &Path) -> Result<OwnedHandle> {
    const F: &str = "CreateFileW";
    let path = path_to_wide(F, path)?;
    // SAFETY: `path` is NUL-terminated and outlives the call; no security
    // attributes or template.
    let h = unsafe {
        CreateFileW(
            wide_ptr(&path),
            FILE_LIST_DIRECTORY.0,
            FILE_SHARE_READ | FILE_SHARE_WRITE | FILE_SHARE_DELETE,
            None,
            OPEN_EXISTING,
            FILE_FLAG_BACKUP_SEMANTICS,
            HANDLE::default(),
        )
    };
    OwnedHandle::new(check(h, F)?)
}

/// Block until changes matching `filter` happen in `directory`, then return
/// them.  `buffer_len` bytes are reserved for the records; an empty result
/// means they overflowed it and the caller should rescan.
pub fn read_directory_changes(
    directory: &OwnedHandle,
    buffer_len: usize,
    subtree: bool,
    filter: NotifyFilter,
) -> Result<Vec<FileNotification>> {
    const F: &str = "ReadDirectoryChangesW";
    // Records must be DWORD-aligned.
    let mut buf = vec![0u32; buffer_len.div_ceil(4)];
    let bytes = len_u32(F, buf.len() * 4)?;
    let mut returned = 0u32;
    // SAFETY: `buf` is writable for `bytes` bytes and DWORD-aligned; without
    // an OVERLAPPED the call is synchronous, so the buffer is not written
    // after it returns.
    let read = unsafe {
        ReadDirectoryChangesW(
            directory.as_handle(),
            buf.as_mut_ptr().cast::<c_void>(),
            bytes,
            subtree,
            FILE_NOTIFY_CHANGE(filter.bits()),
            Some(&mut returned as *mut u32),
            None,
            None,
        )
    };
    check(read, F)?;
    let raw: Vec<u8> = buf
        .iter()
        .flat_map(|w| w.to_ne_bytes())
        .take(returned as usize)
        .collect();
    log::trace!("{F}: {returned} bytes of records");
    parse_notify_buffer(&raw)
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(all(test, windows))]
mod tests {
    use windows::Win32::Foundation::{ERROR_ALREADY_EXISTS, ERROR_FILE_NOT_FOUND};

    use super::*;
    use crate::types::io::FileAction;

    fn init_logging() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    #[test]
    fn create_and_remove() {
        init_logging();
        let root = tempfile::tempdir().expect("tempdir");
        let dir = root.path().join("created");
        create_directory(&dir, None).expect("CreateDirectoryW");
        assert!(dir.is_dir());
        let err = create_directory(&dir, None).unwrap_err();
        assert_eq!(err.code(), Some(ERROR_ALREADY_EXISTS.0));
        remove_directory(&dir).expect("RemoveDirectoryW");
        assert!(!dir.exists());
    }

    #[test]
    fn create_from_template() {
        let root = tempfile::tempdir().expect("tempdir");
        let template = root.path().join("template");
        let copy = root.path().join("copy");
        create_directory(&template, None).expect("template");
        create_directory_ex(&template, &copy, None).expect("CreateDirectoryExW");
        assert!(copy.is_dir());
    }

    #[test]
    fn removing_missing_directory_fails() {
        let root = tempfile::tempdir().expect("tempdir");
        let err = remove_directory(&root.path().join("missing")).unwrap_err();
        assert_eq!(err.code(), Some(ERROR_FILE_NOT_FOUND.0));
    }

    #[test]
    fn current_directory_matches_std() {
        let ours = get_current_directory().expect("GetCurrentDirectoryW");
        assert_eq!(ours, std::env::current_dir().expect("current_dir"));
    }

    #[test]
    fn change_notification_signals_on_new_file() {
        let root = tempfile::tempdir().expect("tempdir");
        let watch = find_first_change_notification(root.path(), false, NotifyFilter::FILE_NAME)
            .expect("FindFirstChangeNotificationW");
        assert!(!watch.wait(Some(Duration::from_millis(10))).expect("wait"));
        std::fs::write(root.path().join("touched.txt"), b"x").expect("write");
        assert!(watch.wait(Some(Duration::from_secs(5))).expect("wait"));
        watch.next().expect("FindNextChangeNotification");
        watch.close().expect("FindCloseChangeNotification");
    }

    #[test]
    fn read_directory_changes_reports_added_file() {
        let root = tempfile::tempdir().expect("tempdir");
        let dir = open_directory(root.path()).expect("open_directory");
        let target = root.path().join("added.txt");
        let writer = std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(100));
            std::fs::write(target, b"x").expect("write");
        });
        let records = read_directory_changes(&dir, 4096, false, NotifyFilter::FILE_NAME)
            .expect("ReadDirectoryChangesW");
        writer.join().expect("writer thread");
        assert!(records
            .iter()
            .any(|r| r.action == FileAction::Added && r.file_name == "added.txt"));
    }
}
