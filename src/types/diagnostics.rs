// ── Error reporting and alert values ──────────────────────────────────────────

use bitflags::bitflags;

use super::size_u32;

bitflags! {
    /// `FormatMessageW` flags.  The low byte is the line-width mask.
    #[repr(transparent)]
    #[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct FormatMessageFlags: u32 {
        const ALLOCATE_BUFFER = 0x0000_0100;
        const IGNORE_INSERTS  = 0x0000_0200;
        const FROM_STRING     = 0x0000_0400;
        const FROM_HMODULE    = 0x0000_0800;
        const FROM_SYSTEM     = 0x0000_1000;
        const ARGUMENT_ARRAY  = 0x0000_2000;
        const MAX_WIDTH_MASK  = 0x0000_00FF;
    }
}

bitflags! {
    /// Process and thread error modes (`SEM_*`).
    #[repr(transparent)]
    #[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ErrorMode: u32 {
        const SEM_FAILCRITICALERRORS     = 0x0001;
        const SEM_NOGPFAULTERRORBOX      = 0x0002;
        const SEM_NOALIGNMENTFAULTEXCEPT = 0x0004;
        const SEM_NOOPENFILEERRORBOX     = 0x8000;
    }
}

bitflags! {
    /// `FLASHWINFO::dwFlags`.  The empty set is `FLASHW_STOP`.
    #[repr(transparent)]
    #[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct FlashFlags: u32 {
        const CAPTION   = 0x0000_0001;
        const TRAY      = 0x0000_0002;
        const ALL       = 0x0000_0003;
        const TIMER     = 0x0000_0004;
        const TIMERNOFG = 0x0000_000C;
    }
}

impl FlashFlags {
    pub const STOP: Self = Self::empty();
}

/// `MessageBeep` sound selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum MessageBeepType {
    /// `0xFFFFFFFF`: simple beep.
    Default = 0xFFFF_FFFF,
    Ok = 0x0000_0000,
    IconError = 0x0000_0010,
    IconQuestion = 0x0000_0020,
    IconWarning = 0x0000_0030,
    IconInformation = 0x0000_0040,
}

impl MessageBeepType {
    pub const ICON_HAND: Self = Self::IconError;
    pub const ICON_STOP: Self = Self::IconError;
    pub const ICON_EXCLAMATION: Self = Self::IconWarning;
    pub const ICON_ASTERISK: Self = Self::IconInformation;
}

/// `FLASHWINFO`.  `Default` fills in `cb_size`.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlashWindowInfo {
    pub cb_size: u32,
    /// Raw `HWND`.
    pub hwnd: isize,
    pub flags: FlashFlags,
    /// Number of flashes.
    pub count: u32,
    /// Flash interval in milliseconds; 0 uses the cursor blink rate.
    pub timeout: u32,
}

impl Default for FlashWindowInfo {
    fn default() -> Self {
        Self {
            cb_size: size_u32::<Self>(),
            hwnd: 0,
            flags: FlashFlags::STOP,
            count: 0,
            timeout: 0,
        }
    }
}

#[cfg(target_pointer_width = "64")]
const _: () = assert!(std::mem::size_of::<FlashWindowInfo>() == 32);
#[cfg(target_pointer_width = "32")]
const _: () = assert!(std::mem::size_of::<FlashWindowInfo>() == 20);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flash_info_is_self_sized() {
        let info = FlashWindowInfo::default();
        assert_eq!(info.cb_size as usize, std::mem::size_of::<FlashWindowInfo>());
        assert_eq!(info.flags, FlashFlags::STOP);
    }

    #[test]
    fn flash_flag_values() {
        assert_eq!(FlashFlags::ALL, FlashFlags::CAPTION | FlashFlags::TRAY);
        assert_eq!(FlashFlags::TIMERNOFG.bits(), 0xC);
        assert_eq!(FlashFlags::STOP.bits(), 0);
    }

    #[test]
    fn beep_aliases() {
        assert_eq!(MessageBeepType::ICON_HAND as u32, 0x10);
        assert_eq!(MessageBeepType::ICON_EXCLAMATION as u32, 0x30);
        assert_eq!(MessageBeepType::Default as u32, u32::MAX);
    }

    #[test]
    fn error_mode_values() {
        let mode = ErrorMode::SEM_FAILCRITICALERRORS | ErrorMode::SEM_NOOPENFILEERRORBOX;
        assert_eq!(mode.bits(), 0x8001);
    }

    #[test]
    fn format_message_system_lookup_flags() {
        let flags = FormatMessageFlags::FROM_SYSTEM | FormatMessageFlags::IGNORE_INSERTS;
        assert_eq!(flags.bits(), 0x1200);
    }
}
