// ── UTF-16 strings and native buffer conventions ──────────────────────────────
//
// Pure Rust; no Win32 imports.  The wrappers in `platform::win32` feed native
// calls through these helpers so the buffer logic can be tested on any host.

use crate::error::{Result, WinError};

/// Hard ceiling for buffers grown by [`grow_until_fits`], in UTF-16 units.
/// Matches `PATHCCH_MAX_CCH`, the largest string any wrapped API produces.
pub const MAX_GROWN_LEN: usize = 32_768;

// ── Conversion ────────────────────────────────────────────────────────────────

/// Encode `s` as a NUL-terminated UTF-16 buffer.
///
/// Fails with [`WinError::InteriorNul`] if `s` contains a NUL, which the
/// native side would silently treat as the end of the string.
pub fn to_wide(function: &'static str, s: &str) -> Result<Vec<u16>> {
    if s.contains('\0') {
        return Err(WinError::InteriorNul { function });
    }
    Ok(s.encode_utf16().chain(std::iter::once(0)).collect())
}

/// Like [`to_wide`], for an optional argument that maps to a NULL pointer.
pub fn to_wide_opt(function: &'static str, s: Option<&str>) -> Result<Option<Vec<u16>>> {
    s.map(|s| to_wide(function, s)).transpose()
}

/// Encode an OS path as a NUL-terminated UTF-16 buffer without a lossy
/// round trip through `str`.
#[cfg(windows)]
pub fn path_to_wide(function: &'static str, path: &std::path::Path) -> Result<Vec<u16>> {
    use std::os::windows::ffi::OsStrExt;

    let mut buf: Vec<u16> = path.as_os_str().encode_wide().collect();
    if buf.contains(&0) {
        return Err(WinError::InteriorNul { function });
    }
    buf.push(0);
    Ok(buf)
}

/// Decode a UTF-16 buffer up to its first NUL (or its end).
pub fn from_wide(buf: &[u16]) -> String {
    let len = buf.iter().position(|&c| c == 0).unwrap_or(buf.len());
    String::from_utf16_lossy(&buf[..len])
}

/// Split a block of NUL-separated strings ("a\0b\0\0") into its parts.
/// Empty entries (including the final double NUL) are dropped.
pub fn split_nul_block(buf: &[u16]) -> Vec<String> {
    buf.split(|&c| c == 0)
        .filter(|part| !part.is_empty())
        .map(String::from_utf16_lossy)
        .collect()
}

/// Trim the trailing line break and whitespace `FormatMessageW` appends.
pub fn trim_message(s: &str) -> String {
    s.trim().to_owned()
}

// ── Buffer conventions ────────────────────────────────────────────────────────

/// Size-query-then-fetch for entry points that report the required buffer
/// length (including the terminator) when the buffer is too small, and the
/// number of units written (excluding the terminator) when it fits.
///
/// `call` receives the buffer to fill; an empty slice is the size query.
/// It returns the native result, or an error when the call failed.  A zero
/// answer to the size query means there is nothing to fetch.  If the
/// required size grows between the query and the fetch the exchange repeats.
pub fn query_then_fetch<E, F>(mut call: F) -> std::result::Result<Vec<u16>, E>
where
    F: FnMut(&mut [u16]) -> std::result::Result<usize, E>,
{
    let mut buf: Vec<u16> = Vec::new();
    loop {
        let n = call(&mut buf)?;
        if n == 0 {
            return Ok(Vec::new());
        }
        if n < buf.len() {
            buf.truncate(n);
            return Ok(buf);
        }
        log::trace!("query_then_fetch: growing buffer {} -> {}", buf.len(), n);
        buf.resize(n, 0);
    }
}

/// Grow-until-fits for entry points without a size query.
///
/// Starts at `initial` units and doubles while the reported length fills the
/// buffer (no room left for the terminator), up to [`MAX_GROWN_LEN`].  The
/// result is truncated to the reported length.
pub fn grow_until_fits<E, F>(initial: usize, mut call: F) -> std::result::Result<Vec<u16>, E>
where
    F: FnMut(&mut [u16]) -> std::result::Result<usize, E>,
{
    let mut buf = vec![0u16; initial.clamp(1, MAX_GROWN_LEN)];
    loop {
        let n = call(&mut buf)?;
        if n + 1 < buf.len() || buf.len() >= MAX_GROWN_LEN {
            buf.truncate(n.min(buf.len()));
            return Ok(buf);
        }
        let next = (buf.len() * 2).min(MAX_GROWN_LEN);
        log::trace!("grow_until_fits: growing buffer {} -> {}", buf.len(), next);
        buf.resize(next, 0);
    }
}

/// Cursor enumeration: call `next` with the previous result (starting at 0)
/// until it returns 0, then ask `finish` whether that 0 meant "end of data"
/// (`Ok`) or a real failure (`Err`), the way the last-error side channel
/// distinguishes the two.
pub fn enumerate_cursor<E, N, F>(mut next: N, finish: F) -> std::result::Result<Vec<u32>, E>
where
    N: FnMut(u32) -> u32,
    F: FnOnce() -> std::result::Result<(), E>,
{
    let mut items = Vec::new();
    let mut cursor = 0;
    loop {
        cursor = next(cursor);
        if cursor == 0 {
            finish()?;
            return Ok(items);
        }
        log::trace!("enumerate_cursor: {cursor}");
        items.push(cursor);
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn w(s: &str) -> Vec<u16> {
        s.encode_utf16().collect()
    }

    #[test]
    fn to_wide_appends_terminator() {
        let buf = to_wide("AddAtomW", "foo").expect("no interior nul");
        assert_eq!(buf, vec![b'f' as u16, b'o' as u16, b'o' as u16, 0]);
    }

    #[test]
    fn to_wide_rejects_interior_nul() {
        let err = to_wide("AddAtomW", "fo\0o").unwrap_err();
        assert!(matches!(err, WinError::InteriorNul { function: "AddAtomW" }));
    }

    #[test]
    fn to_wide_opt_maps_none_to_none() {
        assert!(to_wide_opt("x", None).expect("none is fine").is_none());
        assert_eq!(to_wide_opt("x", Some("a")).expect("valid").map(|v| v.len()), Some(2));
    }

    #[test]
    fn from_wide_stops_at_first_nul() {
        let mut buf = w("C:\\foo");
        buf.extend_from_slice(&[0, b'x' as u16, 0]);
        assert_eq!(from_wide(&buf), "C:\\foo");
    }

    #[test]
    fn from_wide_without_nul_uses_whole_buffer() {
        assert_eq!(from_wide(&w("title")), "title");
    }

    #[test]
    fn split_nul_block_drops_empty_entries() {
        let mut buf = w("cmd.exe");
        buf.push(0);
        buf.extend(w("pwsh.exe"));
        buf.extend_from_slice(&[0, 0]);
        assert_eq!(split_nul_block(&buf), vec!["cmd.exe", "pwsh.exe"]);
        assert!(split_nul_block(&[0, 0]).is_empty());
    }

    #[test]
    fn trim_message_removes_crlf() {
        assert_eq!(trim_message("The parameter is incorrect.\r\n"), "The parameter is incorrect.");
    }

    /// Emulates GetCurrentDirectoryW: required size (with NUL) when too
    /// small, written length (without NUL) when it fits.
    fn fake_sized(value: &[u16], buf: &mut [u16]) -> usize {
        if buf.len() <= value.len() {
            return value.len() + 1;
        }
        buf[..value.len()].copy_from_slice(value);
        buf[value.len()] = 0;
        value.len()
    }

    #[test]
    fn query_then_fetch_returns_reported_length() {
        let value = w("C:\\Users\\winlayer");
        let mut calls = Vec::new();
        let out: std::result::Result<Vec<u16>, ()> = query_then_fetch(|buf| {
            calls.push(buf.len());
            Ok(fake_sized(&value, buf))
        });
        let out = out.expect("fake never fails");
        assert_eq!(out, value);
        // Size query with an empty buffer, then exactly one fetch.
        assert_eq!(calls, vec![0, value.len() + 1]);
    }

    #[test]
    fn query_then_fetch_retries_when_value_grows() {
        let short = w("C:\\a");
        let long = w("C:\\a\\much\\longer\\path");
        let mut n = 0;
        let out: std::result::Result<Vec<u16>, ()> = query_then_fetch(|buf| {
            n += 1;
            // Value changes after the size query.
            let value = if n == 1 { &short } else { &long };
            Ok(fake_sized(value, buf))
        });
        assert_eq!(out.expect("fake never fails"), long);
        assert_eq!(n, 3);
    }

    #[test]
    fn query_then_fetch_zero_size_is_empty() {
        let mut calls = 0;
        let out: std::result::Result<Vec<u16>, ()> = query_then_fetch(|_| {
            calls += 1;
            Ok(0)
        });
        assert_eq!(out, Ok(Vec::new()));
        assert_eq!(calls, 1);
    }

    #[test]
    fn query_then_fetch_propagates_error() {
        let out: std::result::Result<Vec<u16>, u32> = query_then_fetch(|_| Err(5));
        assert_eq!(out, Err(5));
    }

    #[test]
    fn grow_until_fits_doubles_until_title_fits() {
        let title = w(&"x".repeat(300));
        let mut sizes = Vec::new();
        let out: std::result::Result<Vec<u16>, ()> = grow_until_fits(128, |buf| {
            sizes.push(buf.len());
            let n = title.len().min(buf.len() - 1);
            buf[..n].copy_from_slice(&title[..n]);
            buf[n] = 0;
            Ok(title.len())
        });
        assert_eq!(out.expect("fake never fails"), title);
        assert_eq!(sizes, vec![128, 256, 512]);
    }

    #[test]
    fn grow_until_fits_stops_at_cap() {
        let mut calls = 0;
        let out: std::result::Result<Vec<u16>, ()> = grow_until_fits(MAX_GROWN_LEN / 2, |buf| {
            calls += 1;
            Ok(buf.len() * 4)
        });
        assert_eq!(out.expect("fake never fails").len(), MAX_GROWN_LEN);
        assert_eq!(calls, 2);
    }

    #[test]
    fn enumerate_cursor_collects_until_zero() {
        let formats = [13u32, 16, 1, 7];
        let out: std::result::Result<Vec<u32>, u32> = enumerate_cursor(
            |prev| {
                let i = formats.iter().position(|&f| f == prev).map_or(0, |i| i + 1);
                if prev == 0 { formats[0] } else { formats.get(i).copied().unwrap_or(0) }
            },
            || Ok(()),
        );
        assert_eq!(out, Ok(formats.to_vec()));
    }

    #[test]
    fn enumerate_cursor_surfaces_side_channel_error() {
        // ERROR_CLIPBOARD_NOT_OPEN
        let out: std::result::Result<Vec<u32>, u32> = enumerate_cursor(|_| 0, || Err(1418));
        assert_eq!(out, Err(1418));
    }
}
