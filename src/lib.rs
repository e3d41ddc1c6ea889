// ── Safety policy ────────────────────────────────────────────────────────────
// Unsafe code is forbidden everywhere except:
//   • `platform::win32` – calls into the `windows` bindings
//   • `types::input`    – reads of the INPUT_RECORD event union
// Each unsafe block in those modules MUST carry a `// SAFETY:` comment.
#![deny(unsafe_code)]

//! Thin, typed wrappers over native Windows APIs.
//!
//! The crate is split in two halves:
//!
//! * Platform-independent pieces: the [`error`] taxonomy, the UTF-16 and
//!   buffer helpers in [`wide`], and the ABI-exact value structures, flag sets
//!   and constants in [`types`].  These build and test on every host.
//! * [`platform::win32`]: one safe wrapper per entry point over the `windows`
//!   crate bindings, grouped by subsystem (atoms, clipboard, console,
//!   diagnostics, handles, directories, paths).  Windows only.
//!
//! [`report`] builds a serialisable snapshot on top of both; the `winprobe`
//! binary prints it.

pub mod error;
pub mod platform;
pub mod report;
pub mod types;
pub mod wide;

pub use error::{Result, WinError};
