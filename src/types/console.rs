// ── Console value types ───────────────────────────────────────────────────────
//
// Mirrors of the wincon.h / consoleapi*.h structures and constants.  Field
// order, widths and padding match the native declarations exactly; the
// `const` assertions below fail the build if they ever drift.

use bitflags::bitflags;
use serde::Serialize;

use super::{input::ControlKeyState, size_u32, WinBool};

/// `AttachConsole` target meaning "the console of the parent process".
pub const ATTACH_PARENT_PROCESS: u32 = 0xFFFF_FFFF;

/// Number of entries in a console colour table.
pub const COLOR_TABLE_LEN: usize = 16;

/// Length of `CONSOLE_FONT_INFOEX::FaceName` in UTF-16 units (`LF_FACESIZE`).
pub const LF_FACESIZE: usize = 32;

// ── Geometry ──────────────────────────────────────────────────────────────────

/// `COORD`: a character-cell position or size.
#[repr(C)]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Coord {
    pub x: i16,
    pub y: i16,
}

impl Coord {
    pub const fn new(x: i16, y: i16) -> Self {
        Self { x, y }
    }

    /// Number of cells in a `Coord` interpreted as a size (0 for negative).
    pub fn area(self) -> usize {
        usize::try_from(self.x).unwrap_or(0) * usize::try_from(self.y).unwrap_or(0)
    }
}

impl std::fmt::Display for Coord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// `SMALL_RECT`: an inclusive rectangle of character cells.
#[repr(C)]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct SmallRect {
    pub left: i16,
    pub top: i16,
    pub right: i16,
    pub bottom: i16,
}

impl SmallRect {
    pub const fn new(left: i16, top: i16, right: i16, bottom: i16) -> Self {
        Self { left, top, right, bottom }
    }

    /// Width in cells.  Both edges are inclusive, so the full `i16` span
    /// needs a wider result type.
    pub fn width(&self) -> i32 {
        i32::from(self.right) - i32::from(self.left) + 1
    }

    /// Height in cells.  Both edges are inclusive.
    pub fn height(&self) -> i32 {
        i32::from(self.bottom) - i32::from(self.top) + 1
    }
}

// ── Cells and colours ─────────────────────────────────────────────────────────

bitflags! {
    /// Character attributes (`FOREGROUND_*`, `BACKGROUND_*`, `COMMON_LVB_*`).
    #[repr(transparent)]
    #[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct CharacterAttributes: u16 {
        const FOREGROUND_BLUE            = 0x0001;
        const FOREGROUND_GREEN           = 0x0002;
        const FOREGROUND_RED             = 0x0004;
        const FOREGROUND_INTENSITY       = 0x0008;
        const BACKGROUND_BLUE            = 0x0010;
        const BACKGROUND_GREEN           = 0x0020;
        const BACKGROUND_RED             = 0x0040;
        const BACKGROUND_INTENSITY       = 0x0080;
        const COMMON_LVB_LEADING_BYTE    = 0x0100;
        const COMMON_LVB_TRAILING_BYTE   = 0x0200;
        const COMMON_LVB_GRID_HORIZONTAL = 0x0400;
        const COMMON_LVB_GRID_LVERTICAL  = 0x0800;
        const COMMON_LVB_GRID_RVERTICAL  = 0x1000;
        const COMMON_LVB_REVERSE_VIDEO   = 0x4000;
        const COMMON_LVB_UNDERSCORE      = 0x8000;
    }
}

impl Serialize for CharacterAttributes {
    fn serialize<S: serde::Serializer>(&self, s: S) -> std::result::Result<S::Ok, S::Error> {
        s.serialize_u16(self.bits())
    }
}

/// `CHAR_INFO`: one screen-buffer cell (Unicode variant of the char union).
#[repr(C)]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CharInfo {
    pub unicode_char: u16,
    pub attributes: CharacterAttributes,
}

impl CharInfo {
    /// A cell holding `ch`.  Characters outside the BMP cannot occupy a single
    /// cell and become U+FFFD.
    pub fn new(ch: char, attributes: CharacterAttributes) -> Self {
        let unicode_char = u16::try_from(u32::from(ch)).unwrap_or(0xFFFD);
        Self { unicode_char, attributes }
    }
}

/// `COLORREF`: `0x00BBGGRR`.
#[repr(transparent)]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ColorRef(pub u32);

impl ColorRef {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self(r as u32 | (g as u32) << 8 | (b as u32) << 16)
    }

    pub const fn r(self) -> u8 {
        (self.0 & 0xFF) as u8
    }

    pub const fn g(self) -> u8 {
        ((self.0 >> 8) & 0xFF) as u8
    }

    pub const fn b(self) -> u8 {
        ((self.0 >> 16) & 0xFF) as u8
    }
}

impl std::fmt::Display for ColorRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r(), self.g(), self.b())
    }
}

impl Serialize for ColorRef {
    fn serialize<S: serde::Serializer>(&self, s: S) -> std::result::Result<S::Ok, S::Error> {
        s.collect_str(self)
    }
}

// ── Buffers and access ────────────────────────────────────────────────────────

bitflags! {
    /// Desired access for `CreateConsoleScreenBuffer`.
    #[repr(transparent)]
    #[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ConsoleAccess: u32 {
        const GENERIC_READ  = 0x8000_0000;
        const GENERIC_WRITE = 0x4000_0000;
    }
}

bitflags! {
    /// Share mode for `CreateConsoleScreenBuffer`.
    #[repr(transparent)]
    #[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ConsoleShareMode: u32 {
        const FILE_SHARE_READ  = 0x0000_0001;
        const FILE_SHARE_WRITE = 0x0000_0002;
    }
}

bitflags! {
    /// Buffer type for `CreateConsoleScreenBuffer`.
    #[repr(transparent)]
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ConsoleBufferFlags: u32 {
        const CONSOLE_TEXTMODE_BUFFER = 0x1;
    }
}

bitflags! {
    /// Input and output modes for `GetConsoleMode` / `SetConsoleMode`.
    ///
    /// Input-handle and output-handle flags share bit positions; which set
    /// applies depends on the handle.
    #[repr(transparent)]
    #[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ConsoleMode: u32 {
        const ENABLE_PROCESSED_INPUT             = 0x0001;
        const ENABLE_LINE_INPUT                  = 0x0002;
        const ENABLE_ECHO_INPUT                  = 0x0004;
        const ENABLE_WINDOW_INPUT                = 0x0008;
        const ENABLE_MOUSE_INPUT                 = 0x0010;
        const ENABLE_INSERT_MODE                 = 0x0020;
        const ENABLE_QUICK_EDIT_MODE             = 0x0040;
        const ENABLE_EXTENDED_FLAGS              = 0x0080;
        const ENABLE_AUTO_POSITION               = 0x0100;
        const ENABLE_VIRTUAL_TERMINAL_INPUT      = 0x0200;

        const ENABLE_PROCESSED_OUTPUT            = 0x0001;
        const ENABLE_WRAP_AT_EOL_OUTPUT          = 0x0002;
        const ENABLE_VIRTUAL_TERMINAL_PROCESSING = 0x0004;
        const DISABLE_NEWLINE_AUTO_RETURN        = 0x0008;
        const ENABLE_LVB_GRID_WORLDWIDE          = 0x0010;
    }
}

impl Serialize for ConsoleMode {
    fn serialize<S: serde::Serializer>(&self, s: S) -> std::result::Result<S::Ok, S::Error> {
        s.serialize_u32(self.bits())
    }
}

/// `CONSOLE_CURSOR_INFO`.
#[repr(C)]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ConsoleCursorInfo {
    /// Percentage of the cell filled by the cursor, 1–100.
    pub size: u32,
    pub visible: WinBool,
}

/// `CONSOLE_SCREEN_BUFFER_INFO`.
#[repr(C)]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ConsoleScreenBufferInfo {
    pub size: Coord,
    pub cursor_position: Coord,
    pub attributes: CharacterAttributes,
    pub window: SmallRect,
    pub maximum_window_size: Coord,
}

/// `CONSOLE_SCREEN_BUFFER_INFOEX`.  `Default` fills in `cb_size`.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ConsoleScreenBufferInfoEx {
    pub cb_size: u32,
    pub size: Coord,
    pub cursor_position: Coord,
    pub attributes: CharacterAttributes,
    pub window: SmallRect,
    pub maximum_window_size: Coord,
    pub popup_attributes: CharacterAttributes,
    pub fullscreen_supported: WinBool,
    pub color_table: [ColorRef; COLOR_TABLE_LEN],
}

impl Default for ConsoleScreenBufferInfoEx {
    fn default() -> Self {
        Self {
            cb_size: size_u32::<Self>(),
            size: Coord::default(),
            cursor_position: Coord::default(),
            attributes: CharacterAttributes::empty(),
            window: SmallRect::default(),
            maximum_window_size: Coord::default(),
            popup_attributes: CharacterAttributes::empty(),
            fullscreen_supported: WinBool::FALSE,
            color_table: [ColorRef::default(); COLOR_TABLE_LEN],
        }
    }
}

impl From<&ConsoleScreenBufferInfoEx> for ConsoleScreenBufferInfo {
    fn from(ex: &ConsoleScreenBufferInfoEx) -> Self {
        Self {
            size: ex.size,
            cursor_position: ex.cursor_position,
            attributes: ex.attributes,
            window: ex.window,
            maximum_window_size: ex.maximum_window_size,
        }
    }
}

// ── Display mode ──────────────────────────────────────────────────────────────

/// `GetConsoleDisplayMode` result.  Zero (no flag) is a windowed console.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[repr(u32)]
pub enum ConsoleDisplayMode {
    Windowed = 0x0,
    Fullscreen = 0x1,
    FullscreenHardware = 0x2,
}

impl TryFrom<u32> for ConsoleDisplayMode {
    type Error = u32;

    fn try_from(v: u32) -> std::result::Result<Self, u32> {
        match v {
            0x0 => Ok(Self::Windowed),
            0x1 => Ok(Self::Fullscreen),
            0x2 => Ok(Self::FullscreenHardware),
            other => Err(other),
        }
    }
}

/// `SetConsoleDisplayMode` request.  These values differ from the ones
/// `GetConsoleDisplayMode` reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum DisplayModeRequest {
    /// `CONSOLE_FULLSCREEN_MODE`.
    Fullscreen = 1,
    /// `CONSOLE_WINDOWED_MODE`.
    Windowed = 2,
}

// ── Fonts ─────────────────────────────────────────────────────────────────────

/// Font family bits (`FF_*`) found in the high nibble of
/// `CONSOLE_FONT_INFOEX::FontFamily`.  The low nibble holds pitch flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[repr(u32)]
pub enum ConsoleFontFamily {
    DontCare = 0 << 4,
    Roman = 1 << 4,
    Swiss = 2 << 4,
    Modern = 3 << 4,
    Script = 4 << 4,
    Decorative = 5 << 4,
}

impl TryFrom<u32> for ConsoleFontFamily {
    type Error = u32;

    fn try_from(v: u32) -> std::result::Result<Self, u32> {
        match v & 0xF0 {
            0x00 => Ok(Self::DontCare),
            0x10 => Ok(Self::Roman),
            0x20 => Ok(Self::Swiss),
            0x30 => Ok(Self::Modern),
            0x40 => Ok(Self::Script),
            0x50 => Ok(Self::Decorative),
            _ => Err(v),
        }
    }
}

/// `CONSOLE_FONT_INFO`.
#[repr(C)]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ConsoleFontInfo {
    pub font: u32,
    pub font_size: Coord,
}

/// `CONSOLE_FONT_INFOEX`.  `Default` fills in `cb_size`.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConsoleFontInfoEx {
    pub cb_size: u32,
    pub font: u32,
    pub font_size: Coord,
    pub font_family: u32,
    pub font_weight: u32,
    pub face_name: [u16; LF_FACESIZE],
}

impl Default for ConsoleFontInfoEx {
    fn default() -> Self {
        Self {
            cb_size: size_u32::<Self>(),
            font: 0,
            font_size: Coord::default(),
            font_family: 0,
            font_weight: 0,
            face_name: [0; LF_FACESIZE],
        }
    }
}

impl ConsoleFontInfoEx {
    pub fn face_name(&self) -> String {
        crate::wide::from_wide(&self.face_name)
    }

    /// Store `name`, truncated so the terminator always fits.
    pub fn set_face_name(&mut self, name: &str) {
        self.face_name = [0; LF_FACESIZE];
        for (dst, src) in self.face_name[..LF_FACESIZE - 1].iter_mut().zip(name.encode_utf16()) {
            *dst = src;
        }
    }

    pub fn family(&self) -> Option<ConsoleFontFamily> {
        ConsoleFontFamily::try_from(self.font_family).ok()
    }
}

// ── Selection and history ─────────────────────────────────────────────────────

bitflags! {
    /// `CONSOLE_SELECTION_INFO::dwFlags`.  The empty set is
    /// `CONSOLE_NO_SELECTION`.
    #[repr(transparent)]
    #[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ConsoleSelectionFlags: u32 {
        const CONSOLE_SELECTION_IN_PROGRESS = 0x0001;
        const CONSOLE_SELECTION_NOT_EMPTY   = 0x0002;
        const CONSOLE_MOUSE_SELECTION       = 0x0004;
        const CONSOLE_MOUSE_DOWN            = 0x0008;
    }
}

impl Serialize for ConsoleSelectionFlags {
    fn serialize<S: serde::Serializer>(&self, s: S) -> std::result::Result<S::Ok, S::Error> {
        s.serialize_u32(self.bits())
    }
}

/// `CONSOLE_SELECTION_INFO`.
#[repr(C)]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ConsoleSelectionInfo {
    pub flags: ConsoleSelectionFlags,
    pub selection_anchor: Coord,
    pub selection: SmallRect,
}

bitflags! {
    /// `CONSOLE_HISTORY_INFO::dwFlags`.
    #[repr(transparent)]
    #[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ConsoleHistoryFlags: u32 {
        const HISTORY_NO_DUP_FLAG = 0x1;
    }
}

impl Serialize for ConsoleHistoryFlags {
    fn serialize<S: serde::Serializer>(&self, s: S) -> std::result::Result<S::Ok, S::Error> {
        s.serialize_u32(self.bits())
    }
}

/// `CONSOLE_HISTORY_INFO`.  `Default` fills in `cb_size`.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ConsoleHistoryInfo {
    pub cb_size: u32,
    pub history_buffer_size: u32,
    pub number_of_history_buffers: u32,
    pub flags: ConsoleHistoryFlags,
}

impl Default for ConsoleHistoryInfo {
    fn default() -> Self {
        Self {
            cb_size: size_u32::<Self>(),
            history_buffer_size: 0,
            number_of_history_buffers: 0,
            flags: ConsoleHistoryFlags::empty(),
        }
    }
}

/// `CONSOLE_READCONSOLE_CONTROL`.  `Default` fills in `length`.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadConsoleControl {
    pub length: u32,
    /// Characters already in the buffer that the read should skip.
    pub initial_chars: u32,
    /// Bit `n` set ends the read when control character `n` is typed.
    pub ctrl_wakeup_mask: u32,
    /// Output: modifier state when the read ended.
    pub control_key_state: ControlKeyState,
}

impl Default for ReadConsoleControl {
    fn default() -> Self {
        Self {
            length: size_u32::<Self>(),
            initial_chars: 0,
            ctrl_wakeup_mask: 0,
            control_key_state: ControlKeyState::empty(),
        }
    }
}

// ── Standard devices and control events ───────────────────────────────────────

/// `GetStdHandle` / `SetStdHandle` device selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum StandardDevice {
    Input = -10,
    Output = -11,
    Error = -12,
}

impl StandardDevice {
    /// The `DWORD` the native API expects (`(DWORD)-10` etc.).
    pub const fn as_u32(self) -> u32 {
        self as i32 as u32
    }
}

/// Events `GenerateConsoleCtrlEvent` can send.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum CtrlEvent {
    CtrlC = 0,
    CtrlBreak = 1,
}

/// Control signals delivered to a console control handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum CtrlType {
    CtrlC = 0,
    CtrlBreak = 1,
    Close = 2,
    Logoff = 5,
    Shutdown = 6,
}

impl TryFrom<u32> for CtrlType {
    type Error = u32;

    fn try_from(v: u32) -> std::result::Result<Self, u32> {
        match v {
            0 => Ok(Self::CtrlC),
            1 => Ok(Self::CtrlBreak),
            2 => Ok(Self::Close),
            5 => Ok(Self::Logoff),
            6 => Ok(Self::Shutdown),
            other => Err(other),
        }
    }
}

// ── Layout checks ─────────────────────────────────────────────────────────────

const _: () = assert!(std::mem::size_of::<Coord>() == 4);
const _: () = assert!(std::mem::size_of::<SmallRect>() == 8);
const _: () = assert!(std::mem::size_of::<CharInfo>() == 4);
const _: () = assert!(std::mem::size_of::<ColorRef>() == 4);
const _: () = assert!(std::mem::size_of::<ConsoleCursorInfo>() == 8);
const _: () = assert!(std::mem::size_of::<ConsoleScreenBufferInfo>() == 22);
const _: () = assert!(std::mem::size_of::<ConsoleScreenBufferInfoEx>() == 96);
const _: () = assert!(std::mem::size_of::<ConsoleFontInfo>() == 8);
const _: () = assert!(std::mem::size_of::<ConsoleFontInfoEx>() == 84);
const _: () = assert!(std::mem::size_of::<ConsoleSelectionInfo>() == 16);
const _: () = assert!(std::mem::size_of::<ConsoleHistoryInfo>() == 16);
const _: () = assert!(std::mem::size_of::<ReadConsoleControl>() == 16);

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::mem::{align_of, offset_of};

    use super::*;

    #[test]
    fn small_structs_are_short_aligned() {
        assert_eq!(align_of::<Coord>(), 2);
        assert_eq!(align_of::<SmallRect>(), 2);
        assert_eq!(align_of::<CharInfo>(), 2);
        assert_eq!(align_of::<ConsoleScreenBufferInfo>(), 2);
    }

    #[test]
    fn screen_buffer_info_offsets() {
        assert_eq!(offset_of!(ConsoleScreenBufferInfo, cursor_position), 4);
        assert_eq!(offset_of!(ConsoleScreenBufferInfo, attributes), 8);
        assert_eq!(offset_of!(ConsoleScreenBufferInfo, window), 10);
        assert_eq!(offset_of!(ConsoleScreenBufferInfo, maximum_window_size), 18);
    }

    #[test]
    fn screen_buffer_info_ex_offsets() {
        assert_eq!(offset_of!(ConsoleScreenBufferInfoEx, size), 4);
        assert_eq!(offset_of!(ConsoleScreenBufferInfoEx, attributes), 12);
        assert_eq!(offset_of!(ConsoleScreenBufferInfoEx, window), 14);
        assert_eq!(offset_of!(ConsoleScreenBufferInfoEx, maximum_window_size), 22);
        assert_eq!(offset_of!(ConsoleScreenBufferInfoEx, popup_attributes), 26);
        assert_eq!(offset_of!(ConsoleScreenBufferInfoEx, fullscreen_supported), 28);
        assert_eq!(offset_of!(ConsoleScreenBufferInfoEx, color_table), 32);
    }

    #[test]
    fn font_info_ex_offsets() {
        assert_eq!(offset_of!(ConsoleFontInfoEx, font_size), 8);
        assert_eq!(offset_of!(ConsoleFontInfoEx, font_family), 12);
        assert_eq!(offset_of!(ConsoleFontInfoEx, face_name), 20);
    }

    #[test]
    fn selection_info_offsets() {
        assert_eq!(offset_of!(ConsoleSelectionInfo, selection_anchor), 4);
        assert_eq!(offset_of!(ConsoleSelectionInfo, selection), 8);
    }

    #[test]
    fn self_sized_structs_record_their_size() {
        assert_eq!(ConsoleScreenBufferInfoEx::default().cb_size, 96);
        assert_eq!(ConsoleFontInfoEx::default().cb_size, 84);
        assert_eq!(ConsoleHistoryInfo::default().cb_size, 16);
        assert_eq!(ReadConsoleControl::default().length, 16);
    }

    #[test]
    fn color_ref_is_bbggrr() {
        let c = ColorRef::rgb(0x12, 0x34, 0x56);
        assert_eq!(c.0, 0x0056_3412);
        assert_eq!((c.r(), c.g(), c.b()), (0x12, 0x34, 0x56));
        assert_eq!(c.to_string(), "#123456");
    }

    #[test]
    fn color_ref_bytes_are_r_g_b_reserved() {
        let c = ColorRef::rgb(1, 2, 3);
        assert_eq!(c.0.to_le_bytes(), [1, 2, 3, 0]);
    }

    #[test]
    fn character_attribute_values() {
        let white = CharacterAttributes::FOREGROUND_RED
            | CharacterAttributes::FOREGROUND_GREEN
            | CharacterAttributes::FOREGROUND_BLUE;
        assert_eq!(white.bits(), 0x0007);
        assert_eq!(CharacterAttributes::COMMON_LVB_UNDERSCORE.bits(), 0x8000);
        assert_eq!(CharacterAttributes::BACKGROUND_INTENSITY.bits(), 0x0080);
    }

    #[test]
    fn char_info_replaces_astral_chars() {
        let cell = CharInfo::new('A', CharacterAttributes::FOREGROUND_GREEN);
        assert_eq!(cell.unicode_char, 0x41);
        assert_eq!(CharInfo::new('\u{1F600}', CharacterAttributes::empty()).unicode_char, 0xFFFD);
    }

    #[test]
    fn small_rect_dimensions_are_inclusive() {
        let r = SmallRect::new(0, 0, 79, 24);
        assert_eq!((r.width(), r.height()), (80, 25));
    }

    #[test]
    fn small_rect_full_span_does_not_overflow() {
        let r = SmallRect::new(i16::MIN, 0, i16::MAX, 0);
        assert_eq!(r.width(), 65_536);
        assert_eq!(r.height(), 1);

        let tall = SmallRect::new(0, i16::MIN, 0, i16::MAX);
        assert_eq!(tall.height(), 65_536);
        // Inverted rectangles come out non-positive rather than wrapping.
        assert_eq!(SmallRect::new(10, 0, 0, 0).width(), -9);
    }

    #[test]
    fn coord_area() {
        assert_eq!(Coord::new(80, 25).area(), 2000);
        assert_eq!(Coord::new(-1, 25).area(), 0);
    }

    #[test]
    fn standard_devices_are_negative_dwords() {
        assert_eq!(StandardDevice::Input.as_u32(), 0xFFFF_FFF6);
        assert_eq!(StandardDevice::Output.as_u32(), 0xFFFF_FFF5);
        assert_eq!(StandardDevice::Error.as_u32(), 0xFFFF_FFF4);
    }

    #[test]
    fn ctrl_type_decoding() {
        assert_eq!(CtrlType::try_from(2), Ok(CtrlType::Close));
        assert_eq!(CtrlType::try_from(3), Err(3));
        assert_eq!(CtrlEvent::CtrlBreak as u32, 1);
    }

    #[test]
    fn display_mode_decoding() {
        assert_eq!(ConsoleDisplayMode::try_from(1), Ok(ConsoleDisplayMode::Fullscreen));
        assert_eq!(ConsoleDisplayMode::try_from(9), Err(9));
        assert_eq!(DisplayModeRequest::Windowed as u32, 2);
    }

    #[test]
    fn font_family_ignores_pitch_bits() {
        // FF_MODERN | TMPF_FIXED_PITCH | TMPF_TRUETYPE
        assert_eq!(ConsoleFontFamily::try_from(0x36), Ok(ConsoleFontFamily::Modern));
        assert_eq!(ConsoleFontFamily::try_from(0x70), Err(0x70));
    }

    #[test]
    fn face_name_is_truncated_with_terminator() {
        let mut info = ConsoleFontInfoEx::default();
        info.set_face_name("Consolas");
        assert_eq!(info.face_name(), "Consolas");

        let long = "F".repeat(40);
        info.set_face_name(&long);
        assert_eq!(info.face_name().len(), LF_FACESIZE - 1);
        assert_eq!(info.face_name[LF_FACESIZE - 1], 0);
    }

    #[test]
    fn basic_info_from_extended() {
        let mut ex = ConsoleScreenBufferInfoEx::default();
        ex.size = Coord::new(120, 9001);
        ex.window = SmallRect::new(0, 0, 119, 29);
        let basic = ConsoleScreenBufferInfo::from(&ex);
        assert_eq!(basic.size, ex.size);
        assert_eq!(basic.window, ex.window);
    }

    #[test]
    fn screen_buffer_info_serializes_geometry() {
        let info = ConsoleScreenBufferInfo {
            size: Coord::new(80, 300),
            ..Default::default()
        };
        let json = serde_json::to_value(info).expect("serialize");
        assert_eq!(json["size"]["x"], 80);
        assert_eq!(json["size"]["y"], 300);
        assert_eq!(json["attributes"], 0);
    }
}
