// ── Atom tables ───────────────────────────────────────────────────────────────
//
// Local (per-process) and global (per-session) string interning.  Names are
// at most 255 characters, so every name lookup uses a fixed 256-unit buffer.

use windows::core::PCWSTR;
use windows::Win32::System::DataExchange::{
    AddAtomW, DeleteAtom, FindAtomW, GetAtomNameW, GlobalAddAtomW, GlobalDeleteAtom,
    GlobalFindAtomW, GlobalGetAtomNameW, InitAtomTable,
};

use super::{check_bool, last_error};
use crate::error::{Result, WinError};
use crate::wide::{from_wide, to_wide};

/// Name buffer size in UTF-16 units, terminator included.
const ATOM_NAME_LEN: usize = 256;

/// A 16-bit atom.  Zero is never a valid atom.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Atom(pub u16);

impl Atom {
    pub const fn value(self) -> u16 {
        self.0
    }
}

impl std::fmt::Display for Atom {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:#06x}", self.0)
    }
}

fn atom_or_error(raw: u16, function: &'static str) -> Result<Atom> {
    if raw == 0 {
        Err(last_error(function))
    } else {
        Ok(Atom(raw))
    }
}

/// `call` receives the NUL-terminated name.
fn by_name(function: &'static str, name: &str, call: impl FnOnce(PCWSTR) -> u16) -> Result<Atom> {
    let wide = to_wide(function, name)?;
    atom_or_error(call(PCWSTR(wide.as_ptr())), function)
}

fn name_with(
    function: &'static str,
    atom: Atom,
    call: impl FnOnce(u16, &mut [u16]) -> u32,
) -> Result<String> {
    let mut buf = [0u16; ATOM_NAME_LEN];
    let n = call(atom.0, &mut buf);
    if n == 0 {
        return Err(last_error(function));
    }
    Ok(from_wide(&buf[..n as usize]))
}

fn delete_with(function: &'static str, rest: u16) -> Result<()> {
    // Zero means success; the atom itself is returned on failure.
    if rest == 0 {
        Ok(())
    } else {
        Err(last_error(function))
    }
}

// ── Local table ───────────────────────────────────────────────────────────────

/// Add `name` to the local atom table, or bump its reference count.
pub fn add_atom(name: &str) -> Result<Atom> {
    // SAFETY: `by_name` passes a NUL-terminated buffer that outlives the call.
    by_name("AddAtomW", name, |p| unsafe { AddAtomW(p) })
}

pub fn find_atom(name: &str) -> Result<Atom> {
    // SAFETY: as `add_atom`.
    by_name("FindAtomW", name, |p| unsafe { FindAtomW(p) })
}

/// Decrement the reference count of a local string atom.
pub fn delete_atom(atom: Atom) -> Result<()> {
    // SAFETY: only touches the atom table; an unknown atom is reported
    // through the return value.
    delete_with("DeleteAtom", unsafe { DeleteAtom(atom.0) })
}

pub fn get_atom_name(atom: Atom) -> Result<String> {
    // SAFETY: the binding passes the buffer's length as its capacity; the
    // call writes at most that many units including the terminator.
    name_with("GetAtomNameW", atom, |a, buf| unsafe { GetAtomNameW(a, buf) })
}

/// Set the number of hash buckets of the local table.  Only effective
/// before the first local atom is added.
pub fn init_atom_table(size: u32) -> Result<()> {
    // SAFETY: takes no pointers.
    check_bool(unsafe { InitAtomTable(size) }, "InitAtomTable")
}

// ── Global table ──────────────────────────────────────────────────────────────

pub fn global_add_atom(name: &str) -> Result<Atom> {
    // SAFETY: as `add_atom`.
    by_name("GlobalAddAtomW", name, |p| unsafe { GlobalAddAtomW(p) })
}

pub fn global_find_atom(name: &str) -> Result<Atom> {
    // SAFETY: as `add_atom`.
    by_name("GlobalFindAtomW", name, |p| unsafe { GlobalFindAtomW(p) })
}

pub fn global_delete_atom(atom: Atom) -> Result<()> {
    // SAFETY: as `delete_atom`.
    delete_with("GlobalDeleteAtom", unsafe { GlobalDeleteAtom(atom.0) })
}

pub fn global_get_atom_name(atom: Atom) -> Result<String> {
    // SAFETY: as `get_atom_name`.
    name_with("GlobalGetAtomNameW", atom, |a, buf| unsafe { GlobalGetAtomNameW(a, buf) })
}

impl TryFrom<u16> for Atom {
    type Error = WinError;

    fn try_from(v: u16) -> Result<Self> {
        if v == 0 {
            Err(WinError::InvalidValue { function: "Atom", value: 0 })
        } else {
            Ok(Self(v))
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(all(test, windows))]
mod tests {
    use super::*;

    fn init_logging() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    #[test]
    fn local_atom_lifecycle() {
        init_logging();
        let atom = add_atom("winlayer-local-foo").expect("AddAtomW");
        assert!(atom.0 > 0);
        assert_eq!(find_atom("winlayer-local-foo").expect("FindAtomW"), atom);
        assert_eq!(get_atom_name(atom).expect("GetAtomNameW"), "winlayer-local-foo");
        delete_atom(atom).expect("DeleteAtom");
        assert!(find_atom("winlayer-local-foo").is_err());
    }

    #[test]
    fn global_atom_lifecycle() {
        init_logging();
        let atom = global_add_atom("winlayer-global-foo").expect("GlobalAddAtomW");
        assert_eq!(global_find_atom("winlayer-global-foo").expect("GlobalFindAtomW"), atom);
        assert_eq!(global_get_atom_name(atom).expect("GlobalGetAtomNameW"), "winlayer-global-foo");
        global_delete_atom(atom).expect("GlobalDeleteAtom");
    }

    #[test]
    fn integer_atoms_name_themselves() {
        // Atoms below 0xC000 are integer atoms; their name is "#<value>".
        let atom = add_atom("#42").expect("AddAtomW");
        assert_eq!(atom, Atom(42));
        assert_eq!(get_atom_name(atom).expect("GetAtomNameW"), "#42");
    }

    #[test]
    fn missing_atom_reports_error() {
        let err = find_atom("winlayer-never-added").unwrap_err();
        assert_eq!(err.function(), Some("FindAtomW"));
        assert!(err.code().is_some());
    }

    #[test]
    fn interior_nul_never_reaches_the_table() {
        assert!(matches!(add_atom("a\0b"), Err(WinError::InteriorNul { .. })));
    }

    #[test]
    fn zero_is_not_an_atom() {
        assert!(Atom::try_from(0).is_err());
        assert_eq!(Atom::try_from(7).expect("non-zero"), Atom(7));
    }
}
