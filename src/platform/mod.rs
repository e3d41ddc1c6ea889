// ── Platform layer ────────────────────────────────────────────────────────────
//
// All native calls are confined to the `win32` sub-module.  On
// other targets the module is empty; the pure `types`, `wide` and `error`
// modules still build and test there.

#[cfg(windows)]
pub mod win32;
