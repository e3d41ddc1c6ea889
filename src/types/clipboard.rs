// ── Clipboard formats and notifications ───────────────────────────────────────

/// Standard clipboard formats (`CF_*`).
pub mod format {
    pub const CF_TEXT: u32 = 1;
    pub const CF_BITMAP: u32 = 2;
    pub const CF_METAFILEPICT: u32 = 3;
    pub const CF_SYLK: u32 = 4;
    pub const CF_DIF: u32 = 5;
    pub const CF_TIFF: u32 = 6;
    pub const CF_OEMTEXT: u32 = 7;
    pub const CF_DIB: u32 = 8;
    pub const CF_PALETTE: u32 = 9;
    pub const CF_PENDATA: u32 = 10;
    pub const CF_RIFF: u32 = 11;
    pub const CF_WAVE: u32 = 12;
    pub const CF_UNICODETEXT: u32 = 13;
    pub const CF_ENHMETAFILE: u32 = 14;
    pub const CF_HDROP: u32 = 15;
    pub const CF_LOCALE: u32 = 16;
    pub const CF_DIBV5: u32 = 17;

    pub const CF_OWNERDISPLAY: u32 = 0x0080;
    pub const CF_DSPTEXT: u32 = 0x0081;
    pub const CF_DSPBITMAP: u32 = 0x0082;
    pub const CF_DSPMETAFILEPICT: u32 = 0x0083;
    pub const CF_DSPENHMETAFILE: u32 = 0x008E;

    /// First and last values of the private (`CF_PRIVATEFIRST`) and GDI
    /// object (`CF_GDIOBJFIRST`) ranges.
    pub const CF_PRIVATEFIRST: u32 = 0x0200;
    pub const CF_PRIVATELAST: u32 = 0x02FF;
    pub const CF_GDIOBJFIRST: u32 = 0x0300;
    pub const CF_GDIOBJLAST: u32 = 0x03FF;

    /// Registered formats start here (`RegisterClipboardFormatW` results).
    pub const REGISTERED_FIRST: u32 = 0xC000;
}

/// Clipboard window messages (`WM_*CLIPBOARD*`).
pub mod message {
    pub const WM_RENDERFORMAT: u32 = 0x0305;
    pub const WM_RENDERALLFORMATS: u32 = 0x0306;
    pub const WM_DESTROYCLIPBOARD: u32 = 0x0307;
    pub const WM_DRAWCLIPBOARD: u32 = 0x0308;
    pub const WM_PAINTCLIPBOARD: u32 = 0x0309;
    pub const WM_VSCROLLCLIPBOARD: u32 = 0x030A;
    pub const WM_SIZECLIPBOARD: u32 = 0x030B;
    pub const WM_ASKCBFORMATNAME: u32 = 0x030C;
    pub const WM_CHANGECBCHAIN: u32 = 0x030D;
    pub const WM_HSCROLLCLIPBOARD: u32 = 0x030E;
    pub const WM_CLIPBOARDUPDATE: u32 = 0x031D;
}

/// Symbolic name of a predefined format, or `None` for registered and
/// private formats (ask `GetClipboardFormatNameW` for those).
pub fn standard_format_name(id: u32) -> Option<&'static str> {
    use format::*;

    Some(match id {
        CF_TEXT => "CF_TEXT",
        CF_BITMAP => "CF_BITMAP",
        CF_METAFILEPICT => "CF_METAFILEPICT",
        CF_SYLK => "CF_SYLK",
        CF_DIF => "CF_DIF",
        CF_TIFF => "CF_TIFF",
        CF_OEMTEXT => "CF_OEMTEXT",
        CF_DIB => "CF_DIB",
        CF_PALETTE => "CF_PALETTE",
        CF_PENDATA => "CF_PENDATA",
        CF_RIFF => "CF_RIFF",
        CF_WAVE => "CF_WAVE",
        CF_UNICODETEXT => "CF_UNICODETEXT",
        CF_ENHMETAFILE => "CF_ENHMETAFILE",
        CF_HDROP => "CF_HDROP",
        CF_LOCALE => "CF_LOCALE",
        CF_DIBV5 => "CF_DIBV5",
        CF_OWNERDISPLAY => "CF_OWNERDISPLAY",
        CF_DSPTEXT => "CF_DSPTEXT",
        CF_DSPBITMAP => "CF_DSPBITMAP",
        CF_DSPMETAFILEPICT => "CF_DSPMETAFILEPICT",
        CF_DSPENHMETAFILE => "CF_DSPENHMETAFILE",
        _ => return None,
    })
}

/// Whether `id` lies in the range handed out by `RegisterClipboardFormatW`.
pub fn is_registered_format(id: u32) -> bool {
    (format::REGISTERED_FIRST..=0xFFFF).contains(&id)
}

/// Outcome of `GetPriorityClipboardFormat`, which overloads its return
/// value: a format id, `0` for an empty clipboard, `-1` when the clipboard
/// holds data but in none of the listed formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub enum PriorityFormat {
    Available(u32),
    Empty,
    NoneAvailable,
}

impl PriorityFormat {
    pub fn from_raw(raw: i32) -> Self {
        match raw {
            0 => Self::Empty,
            -1 => Self::NoneAvailable,
            id => Self::Available(id as u32),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn predefined_names() {
        assert_eq!(standard_format_name(format::CF_UNICODETEXT), Some("CF_UNICODETEXT"));
        assert_eq!(standard_format_name(17), Some("CF_DIBV5"));
        assert_eq!(standard_format_name(0xC0F3), None);
        assert_eq!(standard_format_name(0), None);
    }

    #[test]
    fn registered_range() {
        assert!(is_registered_format(0xC000));
        assert!(is_registered_format(0xFFFF));
        assert!(!is_registered_format(format::CF_HDROP));
    }

    #[test]
    fn priority_format_overloads() {
        assert_eq!(PriorityFormat::from_raw(0), PriorityFormat::Empty);
        assert_eq!(PriorityFormat::from_raw(-1), PriorityFormat::NoneAvailable);
        assert_eq!(PriorityFormat::from_raw(13), PriorityFormat::Available(13));
    }

    #[test]
    fn message_values() {
        assert_eq!(message::WM_CLIPBOARDUPDATE, 0x031D);
        assert_eq!(message::WM_CHANGECBCHAIN - message::WM_RENDERFORMAT, 8);
    }
}
