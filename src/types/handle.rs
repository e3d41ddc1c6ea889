// ── Handle flags ──────────────────────────────────────────────────────────────

use bitflags::bitflags;

/// `INVALID_HANDLE_VALUE` as the raw pointer-sized integer.
pub const INVALID_HANDLE_VALUE: isize = -1;

bitflags! {
    /// `GetHandleInformation` / `SetHandleInformation` flags.
    #[repr(transparent)]
    #[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct HandleFlags: u32 {
        const INHERIT            = 0x0000_0001;
        const PROTECT_FROM_CLOSE = 0x0000_0002;
    }
}

bitflags! {
    /// `DuplicateHandle` options.
    #[repr(transparent)]
    #[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct DuplicateOptions: u32 {
        const CLOSE_SOURCE    = 0x0000_0001;
        const SAME_ACCESS     = 0x0000_0002;
    }
}

/// Whether a raw handle value is one of the two failure sentinels the
/// handle-returning APIs use (`NULL` or `INVALID_HANDLE_VALUE`).
pub fn is_sentinel(raw: isize) -> bool {
    raw == 0 || raw == INVALID_HANDLE_VALUE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sentinels() {
        assert!(is_sentinel(0));
        assert!(is_sentinel(-1));
        assert!(!is_sentinel(0x44));
    }

    #[test]
    fn flag_values() {
        assert_eq!(HandleFlags::all().bits(), 0x3);
        assert_eq!(DuplicateOptions::SAME_ACCESS.bits(), 0x2);
    }
}
