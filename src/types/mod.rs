// ── ABI-exact value types ─────────────────────────────────────────────────────
//
// Structures, flag sets and constant sets shared with native code.  Nothing
// here calls into Windows, so layouts and conversions are checked by tests on
// every host.  Each structure carries a compile-time size assertion against
// the documented native size.

use serde::Serialize;

pub mod clipboard;
pub mod console;
pub mod diagnostics;
pub mod handle;
pub mod input;
pub mod io;
pub mod path;

/// Win32 `BOOL`: a 32-bit integer where any non-zero value is true.
#[repr(transparent)]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WinBool(pub i32);

impl WinBool {
    pub const FALSE: Self = Self(0);
    pub const TRUE: Self = Self(1);

    pub fn as_bool(self) -> bool {
        self.0 != 0
    }
}

impl From<bool> for WinBool {
    fn from(b: bool) -> Self {
        Self(i32::from(b))
    }
}

impl From<WinBool> for bool {
    fn from(b: WinBool) -> Self {
        b.as_bool()
    }
}

impl Serialize for WinBool {
    fn serialize<S: serde::Serializer>(&self, s: S) -> std::result::Result<S::Ok, S::Error> {
        s.serialize_bool(self.as_bool())
    }
}

/// Byte size of `T` as the `u32` that self-describing structures store in
/// their leading `cbSize` / `nLength` field.
pub(crate) const fn size_u32<T>() -> u32 {
    std::mem::size_of::<T>() as u32
}
