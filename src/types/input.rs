// ── Console input records ─────────────────────────────────────────────────────
//
// `INPUT_RECORD` holds a tagged union.  Reading a union field is the only
// unsafe operation outside `platform::win32`; every variant consists of plain
// integers, so any bit pattern is a valid value of every field.
#![allow(unsafe_code)]

use bitflags::bitflags;

use super::{console::Coord, WinBool};

bitflags! {
    /// Modifier and lock-key state (`*_PRESSED`, `*_ON`, `ENHANCED_KEY`).
    #[repr(transparent)]
    #[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ControlKeyState: u32 {
        const RIGHT_ALT_PRESSED  = 0x0001;
        const LEFT_ALT_PRESSED   = 0x0002;
        const RIGHT_CTRL_PRESSED = 0x0004;
        const LEFT_CTRL_PRESSED  = 0x0008;
        const SHIFT_PRESSED      = 0x0010;
        const NUMLOCK_ON         = 0x0020;
        const SCROLLLOCK_ON      = 0x0040;
        const CAPSLOCK_ON        = 0x0080;
        const ENHANCED_KEY       = 0x0100;
    }
}

bitflags! {
    /// `MOUSE_EVENT_RECORD::dwButtonState`.
    #[repr(transparent)]
    #[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct MouseButtonState: u32 {
        const FROM_LEFT_1ST_BUTTON_PRESSED = 0x0001;
        const RIGHTMOST_BUTTON_PRESSED     = 0x0002;
        const FROM_LEFT_2ND_BUTTON_PRESSED = 0x0004;
        const FROM_LEFT_3RD_BUTTON_PRESSED = 0x0008;
        const FROM_LEFT_4TH_BUTTON_PRESSED = 0x0010;
    }
}

bitflags! {
    /// `MOUSE_EVENT_RECORD::dwEventFlags`.  The empty set is a press or
    /// release.
    #[repr(transparent)]
    #[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct MouseEventFlags: u32 {
        const MOUSE_MOVED    = 0x0001;
        const DOUBLE_CLICK   = 0x0002;
        const MOUSE_WHEELED  = 0x0004;
        const MOUSE_HWHEELED = 0x0008;
    }
}

/// `INPUT_RECORD::EventType`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum InputEventType {
    Key = 0x0001,
    Mouse = 0x0002,
    WindowBufferSize = 0x0004,
    Menu = 0x0008,
    Focus = 0x0010,
}

impl TryFrom<u16> for InputEventType {
    type Error = u16;

    fn try_from(v: u16) -> std::result::Result<Self, u16> {
        match v {
            0x0001 => Ok(Self::Key),
            0x0002 => Ok(Self::Mouse),
            0x0004 => Ok(Self::WindowBufferSize),
            0x0008 => Ok(Self::Menu),
            0x0010 => Ok(Self::Focus),
            other => Err(other),
        }
    }
}

/// `KEY_EVENT_RECORD` (Unicode variant).
#[repr(C)]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct KeyEventRecord {
    pub key_down: WinBool,
    pub repeat_count: u16,
    pub virtual_key_code: u16,
    pub virtual_scan_code: u16,
    pub unicode_char: u16,
    pub control_key_state: ControlKeyState,
}

/// `MOUSE_EVENT_RECORD`.
#[repr(C)]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct MouseEventRecord {
    pub mouse_position: Coord,
    pub button_state: MouseButtonState,
    pub control_key_state: ControlKeyState,
    pub event_flags: MouseEventFlags,
}

/// `WINDOW_BUFFER_SIZE_RECORD`.
#[repr(C)]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct WindowBufferSizeRecord {
    pub size: Coord,
}

/// `MENU_EVENT_RECORD`.
#[repr(C)]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct MenuEventRecord {
    pub command_id: u32,
}

/// `FOCUS_EVENT_RECORD`.
#[repr(C)]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FocusEventRecord {
    pub set_focus: WinBool,
}

#[repr(C)]
#[derive(Clone, Copy)]
union InputEventUnion {
    key: KeyEventRecord,
    mouse: MouseEventRecord,
    window_buffer_size: WindowBufferSizeRecord,
    menu: MenuEventRecord,
    focus: FocusEventRecord,
}

/// `INPUT_RECORD`.  Build one with the variant constructors; inspect one with
/// [`InputRecord::event`].
#[repr(C)]
#[derive(Clone, Copy)]
pub struct InputRecord {
    pub event_type: u16,
    event: InputEventUnion,
}

/// A decoded [`InputRecord`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleEvent {
    Key(KeyEventRecord),
    Mouse(MouseEventRecord),
    WindowBufferSize(Coord),
    Menu(u32),
    Focus(bool),
    /// An event type this crate does not know.
    Unknown(u16),
}

impl Default for InputRecord {
    fn default() -> Self {
        Self {
            event_type: 0,
            event: InputEventUnion { key: KeyEventRecord::default() },
        }
    }
}

impl InputRecord {
    pub fn key(record: KeyEventRecord) -> Self {
        Self {
            event_type: InputEventType::Key as u16,
            event: InputEventUnion { key: record },
        }
    }

    pub fn mouse(record: MouseEventRecord) -> Self {
        Self {
            event_type: InputEventType::Mouse as u16,
            event: InputEventUnion { mouse: record },
        }
    }

    pub fn window_buffer_size(size: Coord) -> Self {
        let mut rec = Self {
            event_type: InputEventType::WindowBufferSize as u16,
            ..Self::default()
        };
        rec.event.window_buffer_size = WindowBufferSizeRecord { size };
        rec
    }

    pub fn menu(command_id: u32) -> Self {
        let mut rec = Self {
            event_type: InputEventType::Menu as u16,
            ..Self::default()
        };
        rec.event.menu = MenuEventRecord { command_id };
        rec
    }

    pub fn focus(set_focus: bool) -> Self {
        let mut rec = Self {
            event_type: InputEventType::Focus as u16,
            ..Self::default()
        };
        rec.event.focus = FocusEventRecord { set_focus: WinBool::from(set_focus) };
        rec
    }

    /// Decode the record according to its `event_type`.
    pub fn event(&self) -> ConsoleEvent {
        // SAFETY: every union variant is a plain-integer `repr(C)` struct for
        // which all bit patterns are valid, and the union is always fully
        // initialised (constructors start from the zeroed key variant, the
        // largest one).  The tag only selects which view is meaningful.
        unsafe {
            match InputEventType::try_from(self.event_type) {
                Ok(InputEventType::Key) => ConsoleEvent::Key(self.event.key),
                Ok(InputEventType::Mouse) => ConsoleEvent::Mouse(self.event.mouse),
                Ok(InputEventType::WindowBufferSize) => {
                    ConsoleEvent::WindowBufferSize(self.event.window_buffer_size.size)
                }
                Ok(InputEventType::Menu) => ConsoleEvent::Menu(self.event.menu.command_id),
                Ok(InputEventType::Focus) => {
                ConsoleEvent::Focus(self.event.focus.set_focus.as_bool())
            }
                Err(other) => ConsoleEvent::Unknown(other),
            }
        }
    }
}

impl From<ConsoleEvent> for InputRecord {
    fn from(ev: ConsoleEvent) -> Self {
        match ev {
            ConsoleEvent::Key(k) => Self::key(k),
            ConsoleEvent::Mouse(m) => Self::mouse(m),
            ConsoleEvent::WindowBufferSize(c) => Self::window_buffer_size(c),
            ConsoleEvent::Menu(id) => Self::menu(id),
            ConsoleEvent::Focus(f) => Self::focus(f),
            ConsoleEvent::Unknown(tag) => Self {
                event_type: tag,
                ..Self::default()
            },
        }
    }
}

impl std::fmt::Debug for InputRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("InputRecord").field(&self.event()).finish()
    }
}

impl PartialEq for InputRecord {
    fn eq(&self, other: &Self) -> bool {
        self.event() == other.event()
    }
}

const _: () = assert!(std::mem::size_of::<KeyEventRecord>() == 16);
const _: () = assert!(std::mem::size_of::<MouseEventRecord>() == 16);
const _: () = assert!(std::mem::size_of::<WindowBufferSizeRecord>() == 4);
const _: () = assert!(std::mem::size_of::<MenuEventRecord>() == 4);
const _: () = assert!(std::mem::size_of::<FocusEventRecord>() == 4);
const _: () = assert!(std::mem::size_of::<InputRecord>() == 20);

// ── Tests ─────────────────────────────────────────────────────────────────────
