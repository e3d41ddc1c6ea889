// ── Directory I/O values ──────────────────────────────────────────────────────
//
// Change-notification filters and the `FILE_NOTIFY_INFORMATION` record
// stream returned by `ReadDirectoryChangesW`.

use bitflags::bitflags;
use serde::Serialize;

use super::{size_u32, WinBool};
use crate::error::{Result, WinError};

bitflags! {
    /// `FILE_NOTIFY_CHANGE_*` filters.
    #[repr(transparent)]
    #[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct NotifyFilter: u32 {
        const FILE_NAME   = 0x0000_0001;
        const DIR_NAME    = 0x0000_0002;
        const ATTRIBUTES  = 0x0000_0004;
        const SIZE        = 0x0000_0008;
        const LAST_WRITE  = 0x0000_0010;
        const LAST_ACCESS = 0x0000_0020;
        const CREATION    = 0x0000_0040;
        const SECURITY    = 0x0000_0100;
    }
}

/// `FILE_ACTION_*`: what happened to the named entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[repr(u32)]
pub enum FileAction {
    Added = 1,
    Removed = 2,
    Modified = 3,
    RenamedOldName = 4,
    RenamedNewName = 5,
}

impl TryFrom<u32> for FileAction {
    type Error = u32;

    fn try_from(v: u32) -> std::result::Result<Self, u32> {
        match v {
            1 => Ok(Self::Added),
            2 => Ok(Self::Removed),
            3 => Ok(Self::Modified),
            4 => Ok(Self::RenamedOldName),
            5 => Ok(Self::RenamedNewName),
            other => Err(other),
        }
    }
}

/// `SECURITY_ATTRIBUTES`.  `Default` fills in `length` and leaves the
/// descriptor null (default security).
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SecurityAttributes {
    pub length: u32,
    /// Raw `PSECURITY_DESCRIPTOR`.
    pub security_descriptor: usize,
    pub inherit_handle: WinBool,
}

impl Default for SecurityAttributes {
    fn default() -> Self {
        Self {
            length: size_u32::<Self>(),
            security_descriptor: 0,
            inherit_handle: WinBool::FALSE,
        }
    }
}

impl SecurityAttributes {
    /// Default security with an inheritable handle.
    pub fn inheritable() -> Self {
        Self {
            inherit_handle: WinBool::TRUE,
            ..Self::default()
        }
    }
}

#[cfg(target_pointer_width = "64")]
const _: () = assert!(std::mem::size_of::<SecurityAttributes>() == 24);
#[cfg(target_pointer_width = "32")]
const _: () = assert!(std::mem::size_of::<SecurityAttributes>() == 12);

// ── Change records ────────────────────────────────────────────────────────────

/// One decoded `FILE_NOTIFY_INFORMATION` record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileNotification {
    pub action: FileAction,
    /// Path relative to the watched directory.
    pub file_name: String,
}

/// Fixed part of `FILE_NOTIFY_INFORMATION`: three `DWORD`s before the name.
const NOTIFY_HEADER_LEN: usize = 12;

fn read_u32(buf: &[u8], at: usize) -> Option<u32> {
    let bytes = buf.get(at..at + 4)?;
    Some(u32::from_ne_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
}

/// Decode the record chain `ReadDirectoryChangesW` wrote into `buf`.
///
/// Records are linked by `NextEntryOffset` (0 ends the chain).  Every offset
/// and name length is checked against the buffer; a malformed chain is
/// reported as [`WinError::InvalidValue`] rather than read out of bounds.
pub fn parse_notify_buffer(buf: &[u8]) -> Result<Vec<FileNotification>> {
    const FUNCTION: &str = "ReadDirectoryChangesW";
    let malformed = |at: usize| WinError::InvalidValue {
        function: FUNCTION,
        value: at as u32,
    };

    let mut out = Vec::new();
    if buf.is_empty() {
        return Ok(out);
    }

    let mut at = 0usize;
    loop {
        let next = read_u32(buf, at).ok_or_else(|| malformed(at))? as usize;
        let action = read_u32(buf, at + 4).ok_or_else(|| malformed(at))?;
        let name_len = read_u32(buf, at + 8).ok_or_else(|| malformed(at))? as usize;

        let name_start = at + NOTIFY_HEADER_LEN;
        let name_bytes = buf
            .get(name_start..name_start + name_len)
            .filter(|b| b.len() % 2 == 0)
            .ok_or_else(|| malformed(at))?;
        let units: Vec<u16> = name_bytes
            .chunks_exact(2)
            .map(|c| u16::from_ne_bytes([c[0], c[1]]))
            .collect();

        let action = FileAction::try_from(action).map_err(|value| WinError::InvalidValue {
            function: FUNCTION,
            value,
        })?;
        out.push(FileNotification {
            action,
            file_name: String::from_utf16_lossy(&units),
        });

        if next == 0 {
            return Ok(out);
        }
        at = at.checked_add(next).ok_or_else(|| malformed(at))?;
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
