// ── Path limits and flags ─────────────────────────────────────────────────────

use bitflags::bitflags;

/// Classic path limit, including the terminator.
pub const MAX_PATH: usize = 260;

/// Longest path the `PathCch*` family accepts, including the terminator.
pub const PATHCCH_MAX_CCH: usize = 0x8000;

bitflags! {
    /// `PATHCCH_*` options for the `Ex` and `PathAlloc*` entry points.
    #[repr(transparent)]
    #[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct PathFlags: u32 {
        const ALLOW_LONG_PATHS                  = 0x0000_0001;
        const FORCE_ENABLE_LONG_NAME_PROCESS    = 0x0000_0002;
        const FORCE_DISABLE_LONG_NAME_PROCESS   = 0x0000_0004;
        const DO_NOT_NORMALIZE_SEGMENTS         = 0x0000_0008;
        const ENSURE_IS_EXTENDED_LENGTH_PATH    = 0x0000_0010;
        const ENSURE_TRAILING_SLASH             = 0x0000_0020;
    }
}

impl PathFlags {
    /// `PATHCCH_NONE`.
    pub const NONE: Self = Self::empty();

    /// Output capacity the `Ex` entry points need for a result that may be
    /// up to `needed` units: long-path callers always get the maximum.
    pub fn capacity(self, needed: usize) -> usize {
        if self.contains(Self::ALLOW_LONG_PATHS) {
            PATHCCH_MAX_CCH
        } else {
            needed.clamp(1, MAX_PATH + 1)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn long_paths_get_max_capacity() {
        assert_eq!(PathFlags::ALLOW_LONG_PATHS.capacity(10), PATHCCH_MAX_CCH);
        assert_eq!(PathFlags::NONE.capacity(10), 10);
        assert_eq!(PathFlags::NONE.capacity(10_000), MAX_PATH + 1);
    }
}
