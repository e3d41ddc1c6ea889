// ── Central error type ────────────────────────────────────────────────────────
//
// Every fallible wrapper returns `error::Result<T>`.  A native call that
// signals failure (FALSE, zero, an invalid handle, a failing HRESULT) is
// surfaced immediately with the side-channel code attached; nothing retries.

/// `FACILITY_WIN32` HRESULTs carry a Win32 code in their low word.
const FACILITY_WIN32_MASK: u32 = 0xFFFF_0000;
const FACILITY_WIN32_PREFIX: u32 = 0x8007_0000;

/// Every error that the binding layer can produce.
#[derive(Debug)]
pub enum WinError {
    /// A Win32 API call returned its failure sentinel.
    Win32 {
        /// The name of the failing function, for display purposes.
        function: &'static str,
        /// The `GetLastError()` value captured right after the call.
        code: u32,
    },

    /// An entry point that reports status as an `HRESULT` returned a failure.
    HResult {
        function: &'static str,
        code: i32,
    },

    /// A string argument contains an interior NUL and cannot be passed as a
    /// NUL-terminated wide string.
    InteriorNul { function: &'static str },

    /// The native call succeeded but returned a value outside the constant
    /// set this crate knows about.
    InvalidValue { function: &'static str, value: u32 },

    /// A standard I/O error.
    Io(std::io::Error),
}

impl WinError {
    /// The Win32 error code carried by this error, if any.
    ///
    /// `HRESULT`s from `FACILITY_WIN32` are unwrapped to the Win32 code they
    /// encode; other `HRESULT`s are returned bit-for-bit.
    pub fn code(&self) -> Option<u32> {
        match self {
            Self::Win32 { code, .. } => Some(*code),
            Self::HResult { code, .. } => {
                let bits = *code as u32;
                if bits & FACILITY_WIN32_MASK == FACILITY_WIN32_PREFIX {
                    Some(bits & 0xFFFF)
                } else {
                    Some(bits)
                }
            }
            Self::Io(e) => e.raw_os_error().map(|c| c as u32),
            Self::InteriorNul { .. } | Self::InvalidValue { .. } => None,
        }
    }

    /// The name of the native function that failed.
    pub fn function(&self) -> Option<&'static str> {
        match self {
            Self::Win32 { function, .. }
            | Self::HResult { function, .. }
            | Self::InteriorNul { function }
            | Self::InvalidValue { function, .. } => Some(*function),
            Self::Io(_) => None,
        }
    }

    /// System message text for this error, resolved through `FormatMessageW`.
    #[cfg(windows)]
    pub fn message(&self) -> Option<String> {
        self.code()
            .and_then(crate::platform::win32::diagnostics::error_message)
    }
}

impl std::fmt::Display for WinError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Win32 { function, code } => write!(f, "{function} failed (error {code})"),
            Self::HResult { function, code } => {
                write!(f, "{function} failed (HRESULT {:#010x})", *code as u32)
            }
            Self::InteriorNul { function } => {
                write!(f, "{function}: string argument contains an interior NUL")
            }
            Self::InvalidValue { function, value } => {
                write!(f, "{function} returned an unknown value {value:#x}")
            }
            Self::Io(e) => write!(f, "I/O error: {e}"),
        }
    }
}

impl std::error::Error for WinError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for WinError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<WinError> for std::io::Error {
    fn from(e: WinError) -> Self {
        match e {
            WinError::Io(inner) => inner,
            other => match other.code() {
                Some(code) => std::io::Error::from_raw_os_error(code as i32),
                None => std::io::Error::new(std::io::ErrorKind::InvalidInput, other.to_string()),
            },
        }
    }
}

#[cfg(windows)]
impl WinError {
    /// Attach `function` to a windows-crate error.  `FACILITY_WIN32` codes
    /// (what `BOOL::ok()` and the handle-returning bindings produce from
    /// `GetLastError()`) become [`WinError::Win32`]; anything else stays an
    /// `HRESULT`.
    pub fn from_windows(function: &'static str, e: &windows::core::Error) -> Self {
        classify(function, e.code().0)
    }
}

/// Split a raw `HRESULT` into the Win32 or `HRESULT` variant.  Zero (a failure
/// reported with a clear last error) is kept as Win32 code 0.
#[cfg_attr(not(windows), allow(dead_code))]
fn classify(function: &'static str, hr: i32) -> WinError {
    let bits = hr as u32;
    if bits == 0 {
        WinError::Win32 { function, code: 0 }
    } else if bits & FACILITY_WIN32_MASK == FACILITY_WIN32_PREFIX {
        WinError::Win32 { function, code: bits & 0xFFFF }
    } else {
        WinError::HResult { function, code: hr }
    }
}

// Lets `?` work on `windows::core::Result<T>` where no function name is at hand.
#[cfg(windows)]
impl From<windows::core::Error> for WinError {
    fn from(e: windows::core::Error) -> Self {
        WinError::from_windows("windows", &e)
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, WinError>;

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn win32_display_names_function_and_code() {
        let e = WinError::Win32 { function: "OpenClipboard", code: 5 };
        assert_eq!(e.to_string(), "OpenClipboard failed (error 5)");
        assert_eq!(e.code(), Some(5));
        assert_eq!(e.function(), Some("OpenClipboard"));
    }

    #[test]
    fn hresult_display_is_hex() {
        let e = WinError::HResult { function: "PathCchCombine", code: 0x8007_007Au32 as i32 };
        assert_eq!(e.to_string(), "PathCchCombine failed (HRESULT 0x8007007a)");
    }

    #[test]
    fn facility_win32_hresult_unwraps_to_win32_code() {
        // HRESULT_FROM_WIN32(ERROR_INSUFFICIENT_BUFFER)
        let e = WinError::HResult { function: "PathCchAppend", code: 0x8007_007Au32 as i32 };
        assert_eq!(e.code(), Some(122));
    }

    #[test]
    fn only_facility_win32_hresults_are_unwrapped() {
        // E_INVALIDARG
        let e = WinError::HResult { function: "PathAllocCombine", code: 0x8007_0057u32 as i32 };
        assert_eq!(e.code(), Some(87));
        // E_UNEXPECTED has FACILITY_NULL.
        let e = WinError::HResult { function: "x", code: 0x8000_FFFFu32 as i32 };
        assert_eq!(e.code(), Some(0x8000_FFFF));
    }

    #[test]
    fn classify_splits_by_facility() {
        match classify("RemoveDirectoryW", 0x8007_0002u32 as i32) {
            WinError::Win32 { function, code } => {
                assert_eq!(function, "RemoveDirectoryW");
                assert_eq!(code, 2);
            }
            other => panic!("unexpected: {other:?}"),
        }
        assert!(matches!(
            classify("PathAllocCombine", 0x8000_4005u32 as i32),
            WinError::HResult { code, .. } if code as u32 == 0x8000_4005
        ));
        assert!(matches!(classify("GetStdHandle", 0), WinError::Win32 { code: 0, .. }));
    }

    #[test]
    fn interior_nul_has_no_code() {
        let e = WinError::InteriorNul { function: "AddAtomW" };
        assert_eq!(e.code(), None);
        assert!(e.to_string().contains("interior NUL"));
    }

    #[test]
    fn converts_into_io_error_with_os_code() {
        let e = WinError::Win32 { function: "RemoveDirectoryW", code: 2 };
        let io: std::io::Error = e.into();
        assert_eq!(io.raw_os_error(), Some(2));
    }

    #[test]
    fn io_error_is_the_source() {
        use std::error::Error as _;
        let e = WinError::from(std::io::Error::new(std::io::ErrorKind::Other, "boom"));
        assert!(e.source().is_some());
        assert_eq!(e.function(), None);
    }
}
