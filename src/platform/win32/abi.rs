// ── Crate structures ↔ binding structures ────────────────────────────────────
//
// The public `types` structures are `repr(C)` mirrors with typed fields
// (flag sets, `WinBool`, `Coord`).  The `windows` bindings take their own
// structures.  Each pair below is checked at compile time for identical size,
// alignment and field offsets, which is what makes the pointer casts in
// `NativeLayout` sound.

use std::mem::{align_of, offset_of, size_of};

use windows::Win32::Security::SECURITY_ATTRIBUTES;
use windows::Win32::System::Console::{
    CHAR_INFO, CONSOLE_CURSOR_INFO, CONSOLE_FONT_INFO, CONSOLE_FONT_INFOEX,
    CONSOLE_HISTORY_INFO, CONSOLE_READCONSOLE_CONTROL, CONSOLE_SCREEN_BUFFER_INFO,
    CONSOLE_SCREEN_BUFFER_INFOEX, CONSOLE_SELECTION_INFO, COORD, INPUT_RECORD, SMALL_RECT,
};
use windows::Win32::UI::WindowsAndMessaging::FLASHWINFO;

use crate::types::console::{
    CharInfo, ConsoleCursorInfo, ConsoleFontInfo, ConsoleFontInfoEx, ConsoleHistoryInfo,
    ConsoleScreenBufferInfo, ConsoleScreenBufferInfoEx, ConsoleSelectionInfo, Coord,
    ReadConsoleControl, SmallRect,
};
use crate::types::diagnostics::FlashWindowInfo;
use crate::types::input::InputRecord;
use crate::types::io::SecurityAttributes;

/// A crate structure with the exact layout of a binding structure.
///
/// # Safety
///
/// `Self` and `Native` must have the same size, alignment and field offsets,
/// and every bit pattern valid for one must be valid for the other.
pub(crate) unsafe trait NativeLayout: Sized + Copy {
    type Native: Copy;

    fn as_native(&self) -> &Self::Native {
        // SAFETY: identical layout per the trait contract.
        unsafe { &*(self as *const Self).cast::<Self::Native>() }
    }

    fn as_native_mut(&mut self) -> &mut Self::Native {
        // SAFETY: identical layout, and any value the OS writes through the
        // native view is a valid `Self`.
        unsafe { &mut *(self as *mut Self).cast::<Self::Native>() }
    }

    fn to_native(self) -> Self::Native {
        *self.as_native()
    }

    fn from_native(native: Self::Native) -> Self {
        // SAFETY: identical size; every native bit pattern is a valid `Self`.
        unsafe { std::mem::transmute_copy(&native) }
    }
}

pub(crate) fn native_slice<T: NativeLayout>(items: &[T]) -> &[T::Native] {
    // SAFETY: same element size and alignment, so the length carries over.
    unsafe { std::slice::from_raw_parts(items.as_ptr().cast(), items.len()) }
}

pub(crate) fn native_slice_mut<T: NativeLayout>(items: &mut [T]) -> &mut [T::Native] {
    // SAFETY: as `native_slice`; the borrow is unique for its lifetime.
    unsafe { std::slice::from_raw_parts_mut(items.as_mut_ptr().cast(), items.len()) }
}

macro_rules! same_layout {
    ($ours:ty => $native:ty $(, $field:ident = $nfield:ident)* $(,)?) => {
        const _: () = {
            assert!(size_of::<$ours>() == size_of::<$native>());
            assert!(align_of::<$ours>() == align_of::<$native>());
            $(assert!(offset_of!($ours, $field) == offset_of!($native, $nfield));)*
        };

        // SAFETY: layout asserted above; every field on both sides is a plain
        // integer (or a transparent wrapper of one) of the same width.
        unsafe impl NativeLayout for $ours {
            type Native = $native;
        }
    };
}

same_layout!(Coord => COORD, x = X, y = Y);
same_layout!(SmallRect => SMALL_RECT, left = Left, top = Top, right = Right, bottom = Bottom);
same_layout!(CharInfo => CHAR_INFO, unicode_char = Char, attributes = Attributes);
same_layout!(ConsoleCursorInfo => CONSOLE_CURSOR_INFO, size = dwSize, visible = bVisible);
same_layout!(
    ConsoleScreenBufferInfo => CONSOLE_SCREEN_BUFFER_INFO,
    size = dwSize,
    cursor_position = dwCursorPosition,
    attributes = wAttributes,
    window = srWindow,
    maximum_window_size = dwMaximumWindowSize,
);
same_layout!(
    ConsoleScreenBufferInfoEx => CONSOLE_SCREEN_BUFFER_INFOEX,
    cb_size = cbSize,
    size = dwSize,
    cursor_position = dwCursorPosition,
    attributes = wAttributes,
    window = srWindow,
    maximum_window_size = dwMaximumWindowSize,
    popup_attributes = wPopupAttributes,
    fullscreen_supported = bFullscreenSupported,
    color_table = ColorTable,
);
same_layout!(ConsoleFontInfo => CONSOLE_FONT_INFO, font = nFont, font_size = dwFontSize);
same_layout!(
    ConsoleFontInfoEx => CONSOLE_FONT_INFOEX,
    cb_size = cbSize,
    font = nFont,
    font_size = dwFontSize,
    font_family = FontFamily,
    font_weight = FontWeight,
    face_name = FaceName,
);
same_layout!(
    ConsoleSelectionInfo => CONSOLE_SELECTION_INFO,
    flags = dwFlags,
    selection_anchor = dwSelectionAnchor,
    selection = srSelection,
);
same_layout!(
    ConsoleHistoryInfo => CONSOLE_HISTORY_INFO,
    cb_size = cbSize,
    history_buffer_size = HistoryBufferSize,
    number_of_history_buffers = NumberOfHistoryBuffers,
    flags = dwFlags,
);
same_layout!(
    ReadConsoleControl => CONSOLE_READCONSOLE_CONTROL,
    length = nLength,
    initial_chars = nInitialChars,
    ctrl_wakeup_mask = dwCtrlWakeupMask,
    control_key_state = dwControlKeyState,
);
same_layout!(InputRecord => INPUT_RECORD, event_type = EventType);
same_layout!(
    FlashWindowInfo => FLASHWINFO,
    cb_size = cbSize,
    hwnd = hwnd,
    flags = dwFlags,
    count = uCount,
    timeout = dwTimeout,
);
same_layout!(
    SecurityAttributes => SECURITY_ATTRIBUTES,
    length = nLength,
    security_descriptor = lpSecurityDescriptor,
    inherit_handle = bInheritHandle,
);

/// Optional security attributes as the pointer the bindings take.
pub(crate) fn security_ptr(
    sa: Option<&SecurityAttributes>,
) -> Option<*const SECURITY_ATTRIBUTES> {
    sa.map(|sa| sa.as_native() as *const SECURITY_ATTRIBUTES)
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use windows::Win32::Foundation::{
        DUPLICATE_SAME_ACCESS, HANDLE_FLAG_PROTECT_FROM_CLOSE, MAX_PATH,
    };
    use windows::Win32::Storage::FileSystem::{
        FILE_NOTIFY_CHANGE_LAST_WRITE, FILE_NOTIFY_CHANGE_SECURITY,
    };
    use windows::Win32::System::Console::{
        ATTACH_PARENT_PROCESS, ENABLE_VIRTUAL_TERMINAL_PROCESSING, ENABLE_QUICK_EDIT_MODE,
        FOREGROUND_INTENSITY, LEFT_CTRL_PRESSED,
    };
    use windows::Win32::System::Diagnostics::Debug::{
        FORMAT_MESSAGE_FROM_SYSTEM, FORMAT_MESSAGE_IGNORE_INSERTS, SEM_NOOPENFILEERRORBOX,
    };
    use windows::Win32::UI::Shell::{PATHCCH_ALLOW_LONG_PATHS, PATHCCH_MAX_CCH};
    use windows::Win32::UI::WindowsAndMessaging::{FLASHW_TIMERNOFG, MB_ICONWARNING};

    use super::*;
    use crate::types::console::{CharacterAttributes, ConsoleMode, ATTACH_PARENT_PROCESS as OURS};
    use crate::types::diagnostics::{ErrorMode, FlashFlags, FormatMessageFlags, MessageBeepType};
    use crate::types::handle::{DuplicateOptions, HandleFlags};
    use crate::types::input::ControlKeyState;
    use crate::types::io::NotifyFilter;
    use crate::types::path::{self, PathFlags};

    #[test]
    fn values_cross_unchanged() {
        let rect = SmallRect::new(1, 2, 79, 24);
        let native = rect.to_native();
        assert_eq!((native.Left, native.Top, native.Right, native.Bottom), (1, 2, 79, 24));
        assert_eq!(SmallRect::from_native(native), rect);

        let mut info = ConsoleScreenBufferInfo::default();
        info.as_native_mut().dwSize = COORD { X: 120, Y: 9001 };
        assert_eq!(info.size, Coord::new(120, 9001));
    }

    #[test]
    fn slices_keep_their_length() {
        let cells = [CharInfo::new('a', CharacterAttributes::FOREGROUND_RED); 3];
        let native = native_slice(&cells);
        assert_eq!(native.len(), 3);
        assert_eq!(native[2].Attributes, 0x0004);
    }

    #[test]
    fn flag_sets_match_binding_constants() {
        assert_eq!(NotifyFilter::LAST_WRITE.bits(), FILE_NOTIFY_CHANGE_LAST_WRITE.0);
        assert_eq!(NotifyFilter::SECURITY.bits(), FILE_NOTIFY_CHANGE_SECURITY.0);
        assert_eq!(
            ConsoleMode::ENABLE_VIRTUAL_TERMINAL_PROCESSING.bits(),
            ENABLE_VIRTUAL_TERMINAL_PROCESSING.0
        );
        assert_eq!(ConsoleMode::ENABLE_QUICK_EDIT_MODE.bits(), ENABLE_QUICK_EDIT_MODE.0);
        assert_eq!(CharacterAttributes::FOREGROUND_INTENSITY.bits(), FOREGROUND_INTENSITY.0);
        assert_eq!(ControlKeyState::LEFT_CTRL_PRESSED.bits(), LEFT_CTRL_PRESSED);
        assert_eq!(HandleFlags::PROTECT_FROM_CLOSE.bits(), HANDLE_FLAG_PROTECT_FROM_CLOSE.0);
        assert_eq!(DuplicateOptions::SAME_ACCESS.bits(), DUPLICATE_SAME_ACCESS.0);
        assert_eq!(ErrorMode::SEM_NOOPENFILEERRORBOX.bits(), SEM_NOOPENFILEERRORBOX.0);
        assert_eq!(
            (FormatMessageFlags::FROM_SYSTEM | FormatMessageFlags::IGNORE_INSERTS).bits(),
            (FORMAT_MESSAGE_FROM_SYSTEM | FORMAT_MESSAGE_IGNORE_INSERTS).0
        );
        assert_eq!(FlashFlags::TIMERNOFG.bits(), FLASHW_TIMERNOFG.0);
        assert_eq!(MessageBeepType::IconWarning as u32, MB_ICONWARNING.0);
        assert_eq!(PathFlags::ALLOW_LONG_PATHS.bits(), PATHCCH_ALLOW_LONG_PATHS.0);
    }

    #[test]
    fn limits_match_binding_constants() {
        assert_eq!(path::MAX_PATH, MAX_PATH as usize);
        assert_eq!(path::PATHCCH_MAX_CCH, PATHCCH_MAX_CCH as usize);
        assert_eq!(OURS, ATTACH_PARENT_PROCESS);
    }
}
