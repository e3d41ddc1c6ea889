// ── PathCch path manipulation ─────────────────────────────────────────────────
//
// Wrappers over the bounds-checked `PathCch*` / `PathAlloc*` family.  Every
// entry point reports an HRESULT: `S_OK` means the path changed, `S_FALSE`
// means there was nothing to do (the buffer still holds the input), anything
// negative is an error.
//
// In-place edits get a buffer of the input length plus whatever the edit can
// add; fresh results get `MAX_PATH + 1` units, or `PATHCCH_MAX_CCH` when the
// caller allows long paths.

use windows::core::{PCWSTR, PWSTR};
use windows::Win32::Foundation::{LocalFree, HLOCAL};
use windows::Win32::UI::Shell::{
    PathAllocCanonicalize, PathAllocCombine, PathCchAddBackslash, PathCchAddExtension,
    PathCchAppend, PathCchAppendEx, PathCchCanonicalize, PathCchCanonicalizeEx, PathCchCombine,
    PathCchCombineEx, PathCchFindExtension, PathCchIsRoot, PathCchRemoveBackslash,
    PathCchRemoveExtension, PathCchRemoveFileSpec, PathCchRenameExtension, PathCchSkipRoot,
    PathCchStripPrefix, PathCchStripToRoot, PathIsUNCEx, PATHCCH_OPTIONS,
};

use super::check;
use crate::error::Result;
use crate::types::path::{PathFlags, MAX_PATH};
use crate::wide::{from_wide, to_wide};

// ── Buffer helpers ────────────────────────────────────────────────────────────

/// Copy `path` into a buffer of `capacity` units, let `call` edit it in
/// place, and return the result.
fn edit_in_place<F>(function: &'static str, path: &str, capacity: usize, call: F) -> Result<String>
where
    F: FnOnce(&mut [u16]) -> windows::core::Result<()>,
{
    let mut buf = to_wide(function, path)?;
    let capacity = capacity.max(buf.len());
    buf.resize(capacity, 0);
    check(call(&mut buf), function)?;
    Ok(from_wide(&buf))
}

/// Let `call` write a fresh path into a zeroed buffer of `capacity` units.
fn write_fresh<F>(function: &'static str, capacity: usize, call: F) -> Result<String>
where
    F: FnOnce(&mut [u16]) -> windows::core::Result<()>,
{
    let mut buf = vec![0u16; capacity.max(1)];
    check(call(&mut buf), function)?;
    Ok(from_wide(&buf))
}

/// The suffix of `wide` starting at the address `at` points to.
fn suffix_at(wide: &[u16], at: PCWSTR) -> String {
    let base = wide.as_ptr() as usize;
    let offset = (at.0 as usize).saturating_sub(base) / 2;
    from_wide(wide.get(offset..).unwrap_or(&[]))
}

/// Take ownership of a `PathAlloc*` result: copy it out, then `LocalFree` it.
fn take_allocated(out: PWSTR) -> String {
    if out.0.is_null() {
        return String::new();
    }
    // SAFETY: `out` is a NUL-terminated string allocated by the system.
    let s = String::from_utf16_lossy(unsafe { out.as_wide() });
    // SAFETY: the string came from LocalAlloc inside PathAlloc* and is freed
    // exactly once, after the copy above.
    let _ = unsafe { LocalFree(HLOCAL(out.0.cast())) };
    s
}

fn ptr(wide: &[u16]) -> PCWSTR {
    PCWSTR(wide.as_ptr())
}

fn options(flags: PathFlags) -> PATHCCH_OPTIONS {
    PATHCCH_OPTIONS(flags.bits())
}

// ── Allocating variants ───────────────────────────────────────────────────────

pub fn path_alloc_canonicalize(path: &str, flags: PathFlags) -> Result<String> {
    const F: &str = "PathAllocCanonicalize";
    let path = to_wide(F, path)?;
    // SAFETY: `path` is NUL-terminated; the result is a system allocation.
    let out = check(unsafe { PathAllocCanonicalize(ptr(&path), options(flags)) }, F)?;
    Ok(take_allocated(out))
}

/// Combine two optional path parts into a freshly allocated path.
pub fn path_alloc_combine(
    path: Option<&str>,
    more: Option<&str>,
    flags: PathFlags,
) -> Result<String> {
    const F: &str = "PathAllocCombine";
    let path = path.map(|p| to_wide(F, p)).transpose()?;
    let more = more.map(|m| to_wide(F, m)).transpose()?;
    let path_ptr = path.as_deref().map_or(PCWSTR::null(), ptr);
    let more_ptr = more.as_deref().map_or(PCWSTR::null(), ptr);
    // SAFETY: both inputs are NULL or NUL-terminated and outlive the call.
    let out = check(unsafe { PathAllocCombine(path_ptr, more_ptr, options(flags)) }, F)?;
    Ok(take_allocated(out))
}

// ── In-place edits ────────────────────────────────────────────────────────────

pub fn path_cch_add_backslash(path: &str) -> Result<String> {
    // SAFETY (closure): the buffer is writable for its whole length.
    edit_in_place("PathCchAddBackslash", path, path.len() + 2, |buf| {
        unsafe { PathCchAddBackslash(buf) }.ok()
    })
}

/// Add `ext` unless the path already has an extension.
pub fn path_cch_add_extension(path: &str, ext: &str) -> Result<String> {
    const F: &str = "PathCchAddExtension";
    let ext_w = to_wide(F, ext)?;
    // SAFETY (closure): the buffer is writable for its whole length; `ext_w`
    // is NUL-terminated and outlives the call.
    edit_in_place(F, path, path.len() + ext.len() + 2, |buf| unsafe {
        PathCchAddExtension(buf, ptr(&ext_w))
    })
}

pub fn path_cch_append(path: &str, more: &str) -> Result<String> {
    const F: &str = "PathCchAppend";
    let more_w = to_wide(F, more)?;
    // SAFETY (closure): see `path_cch_add_extension`.
    edit_in_place(F, path, path.len() + more.len() + 2, |buf| unsafe {
        PathCchAppend(buf, ptr(&more_w))
    })
}

pub fn path_cch_append_ex(path: &str, more: &str, flags: PathFlags) -> Result<String> {
    const F: &str = "PathCchAppendEx";
    let more_w = to_wide(F, more)?;
    let capacity = flags.capacity(path.len() + more.len() + 2);
    // SAFETY (closure): see `path_cch_add_extension`.
    edit_in_place(F, path, capacity, |buf| unsafe {
        PathCchAppendEx(buf, ptr(&more_w), options(flags))
    })
}

pub fn path_cch_remove_backslash(path: &str) -> Result<String> {
    // SAFETY (closure): the buffer is writable for its whole length.
    edit_in_place("PathCchRemoveBackslash", path, path.len() + 1, |buf| {
        unsafe { PathCchRemoveBackslash(buf) }.ok()
    })
}

pub fn path_cch_remove_extension(path: &str) -> Result<String> {
    // SAFETY (closure): the buffer is writable for the length passed.
    edit_in_place("PathCchRemoveExtension", path, path.len() + 1, |buf| unsafe {
        PathCchRemoveExtension(PWSTR(buf.as_mut_ptr()), buf.len())
    })
}

/// Drop the last path component.
pub fn path_cch_remove_file_spec(path: &str) -> Result<String> {
    // SAFETY (closure): the buffer is writable for the length passed.
    edit_in_place("PathCchRemoveFileSpec", path, path.len() + 1, |buf| unsafe {
        PathCchRemoveFileSpec(PWSTR(buf.as_mut_ptr()), buf.len())
    })
}

pub fn path_cch_rename_extension(path: &str, ext: &str) -> Result<String> {
    const F: &str = "PathCchRenameExtension";
    let ext_w = to_wide(F, ext)?;
    // SAFETY (closure): see `path_cch_add_extension`.
    edit_in_place(F, path, path.len() + ext.len() + 2, |buf| unsafe {
        PathCchRenameExtension(buf, ptr(&ext_w))
    })
}

/// Remove a `\\?\` or `\\?\UNC\` prefix.
pub fn path_cch_strip_prefix(path: &str) -> Result<String> {
    // SAFETY (closure): the buffer is writable for its whole length.
    edit_in_place("PathCchStripPrefix", path, path.len() + 1, |buf| {
        unsafe { PathCchStripPrefix(buf) }.ok()
    })
}

pub fn path_cch_strip_to_root(path: &str) -> Result<String> {
    // SAFETY (closure): the buffer is writable for the length passed.
    edit_in_place("PathCchStripToRoot", path, path.len() + 1, |buf| {
        unsafe { PathCchStripToRoot(PWSTR(buf.as_mut_ptr()), buf.len()) }.ok()
    })
}

// ── Fresh results ─────────────────────────────────────────────────────────────

/// Resolve `.` and `..` segments.
pub fn path_cch_canonicalize(path: &str) -> Result<String> {
    const F: &str = "PathCchCanonicalize";
    let path = to_wide(F, path)?;
    // SAFETY (closure): the output buffer is writable for its whole length;
    // `path` is NUL-terminated and outlives the call.
    write_fresh(F, MAX_PATH + 1, |out| unsafe { PathCchCanonicalize(out, ptr(&path)) })
}

pub fn path_cch_canonicalize_ex(path: &str, flags: PathFlags) -> Result<String> {
    const F: &str = "PathCchCanonicalizeEx";
    let path = to_wide(F, path)?;
    // SAFETY (closure): see `path_cch_canonicalize`.
    write_fresh(F, flags.capacity(MAX_PATH + 1), |out| unsafe {
        PathCchCanonicalizeEx(out, ptr(&path), options(flags))
    })
}

pub fn path_cch_combine(path: &str, more: &str) -> Result<String> {
    const F: &str = "PathCchCombine";
    let path = to_wide(F, path)?;
    let more = to_wide(F, more)?;
    // SAFETY (closure): see `path_cch_canonicalize`.
    write_fresh(F, MAX_PATH + 1, |out| unsafe {
        PathCchCombine(out, ptr(&path), ptr(&more))
    })
}

pub fn path_cch_combine_ex(path: &str, more: &str, flags: PathFlags) -> Result<String> {
    const F: &str = "PathCchCombineEx";
    let capacity = flags.capacity(path.len() + more.len() + 3);
    let path = to_wide(F, path)?;
    let more = to_wide(F, more)?;
    // SAFETY (closure): see `path_cch_canonicalize`.
    write_fresh(F, capacity, |out| unsafe {
        PathCchCombineEx(out, ptr(&path), ptr(&more), options(flags))
    })
}

// ── Queries ───────────────────────────────────────────────────────────────────

/// The extension including its dot, or `None` when there is none.
pub fn path_cch_find_extension(path: &str) -> Result<Option<String>> {
    const F: &str = "PathCchFindExtension";
    let wide = to_wide(F, path)?;
    // SAFETY: `wide` is NUL-terminated and `wide.len()` includes the
    // terminator; the result points into `wide`.
    let ext = check(unsafe { PathCchFindExtension(ptr(&wide), wide.len()) }, F)?;
    let ext = suffix_at(&wide, ext);
    Ok(if ext.is_empty() { None } else { Some(ext) })
}

/// Whether `path` is exactly a root (`C:\`, `\\server\share`, ...).
pub fn path_cch_is_root(path: &str) -> Result<bool> {
    let wide = to_wide("PathCchIsRoot", path)?;
    // SAFETY: `wide` is NUL-terminated and outlives the call.
    Ok(unsafe { PathCchIsRoot(ptr(&wide)) }.as_bool())
}

/// Everything after the root.
pub fn path_cch_skip_root(path: &str) -> Result<String> {
    const F: &str = "PathCchSkipRoot";
    let wide = to_wide(F, path)?;
    // SAFETY: `wide` is NUL-terminated; the result points into it.
    let end = check(unsafe { PathCchSkipRoot(ptr(&wide)) }, F)?;
    Ok(suffix_at(&wide, end))
}

/// For a UNC path, the part after the leading `\\` (server and the rest).
/// `None` for non-UNC paths.
pub fn path_is_unc_ex(path: &str) -> Result<Option<String>> {
    let wide = to_wide("PathIsUNCEx", path)?;
    let mut server = PCWSTR::null();
    let out: *mut PCWSTR = &mut server;
    // SAFETY: `wide` is NUL-terminated; `out` receives a pointer into it.
    let is_unc = unsafe { PathIsUNCEx(ptr(&wide), Some(out)) }.as_bool();
    Ok(is_unc.then(|| suffix_at(&wide, server)))
}

// ── Tests ─────────────────────────────────────────────────────────────────────
