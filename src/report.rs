// ── State report ──────────────────────────────────────────────────────────────
//
// A serialisable snapshot of what the current process can observe through the
// wrappers: working directory and error modes, the attached console, and the
// clipboard's format list.  A section that cannot be collected (no console,
// clipboard held by another window) is reported under `errors` and does not
// abort the rest.

use serde::Serialize;

use crate::error::{Result, WinError};
use crate::types::clipboard::standard_format_name;
use crate::types::console::{ConsoleCursorInfo, ConsoleMode, ConsoleScreenBufferInfo};

/// One selectable part of the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Section {
    Process,
    Console,
    Clipboard,
}

impl Section {
    pub const ALL: [Section; 3] = [Section::Process, Section::Console, Section::Clipboard];

    pub fn name(self) -> &'static str {
        match self {
            Section::Process => "process",
            Section::Console => "console",
            Section::Clipboard => "clipboard",
        }
    }
}

impl std::fmt::Display for Section {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProcessReport {
    pub current_directory: String,
    pub error_mode: u32,
    pub thread_error_mode: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConsoleReport {
    pub input_code_page: u32,
    pub output_code_page: u32,
    pub title: String,
    pub output_mode: ConsoleMode,
    pub cursor: ConsoleCursorInfo,
    pub screen_buffer: ConsoleScreenBufferInfo,
}

/// A clipboard format id with its display name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormatEntry {
    pub id: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl FormatEntry {
    /// Predefined formats are named from the constant table; `registered` is
    /// used for everything else.
    pub fn new(id: u32, registered: Option<String>) -> Self {
        let name = standard_format_name(id).map(str::to_owned).or(registered);
        Self { id, name }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClipboardReport {
    pub sequence_number: u32,
    pub formats: Vec<FormatEntry>,
}

/// Why a section is missing from the report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SectionError {
    pub section: Section,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub function: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<u32>,
    pub message: String,
}

impl SectionError {
    pub fn new(section: Section, err: &WinError) -> Self {
        Self { section, function: err.function(), code: err.code(), message: err.to_string() }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Report {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub process: Option<ProcessReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub console: Option<ConsoleReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clipboard: Option<ClipboardReport>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<SectionError>,
}

impl Report {
    /// Store the outcome of collecting `section`.
    pub fn record<T>(
        &mut self,
        section: Section,
        outcome: Result<T>,
        place: impl FnOnce(&mut Self, T),
    ) {
        match outcome {
            Ok(value) => place(self, value),
            Err(e) => {
                log::warn!("{section} section unavailable: {e}");
                self.errors.push(SectionError::new(section, &e));
            }
        }
    }

    /// Render as JSON, pretty-printed unless `compact`.
    pub fn to_json(&self, compact: bool) -> Result<String> {
        let out = if compact {
            serde_json::to_string(self)
        } else {
            serde_json::to_string_pretty(self)
        };
        out.map_err(|e| WinError::Io(e.into()))
    }
}

/// Collect the requested sections once each, in declaration order.
pub fn collect(sections: &[Section]) -> Report {
    let mut wanted = sections.to_vec();
    wanted.sort();
    wanted.dedup();

    let mut report = Report::default();
    for section in wanted {
        log::debug!("collecting {section}");
        match section {
            Section::Process => {
                report.record(section, collect_process(), |r, v| r.process = Some(v))
            }
            Section::Console => {
                report.record(section, collect_console(), |r, v| r.console = Some(v))
            }
            Section::Clipboard => {
                report.record(section, collect_clipboard(), |r, v| r.clipboard = Some(v))
            }
        }
    }
    report
}

// ── Collectors ────────────────────────────────────────────────────────────────

#[cfg(windows)]
fn collect_process() -> Result<ProcessReport> {
    use crate::platform::win32::{diagnostics, directory};

    Ok(ProcessReport {
        current_directory: directory::get_current_directory()?.display().to_string(),
        error_mode: diagnostics::get_error_mode().bits(),
        thread_error_mode: diagnostics::get_thread_error_mode().bits(),
    })
}

#[cfg(windows)]
fn collect_console() -> Result<ConsoleReport> {
    use crate::platform::win32::console;
    use crate::types::console::StandardDevice;

    let out = console::get_std_handle(StandardDevice::Output)?;
    Ok(ConsoleReport {
        input_code_page: console::get_console_cp()?,
        output_code_page: console::get_console_output_cp()?,
        title: console::get_console_title()?,
        output_mode: console::get_console_mode(&out)?,
        cursor: console::get_console_cursor_info(&out)?,
        screen_buffer: console::get_console_screen_buffer_info(&out)?,
    })
}

#[cfg(windows)]
fn collect_clipboard() -> Result<ClipboardReport> {
    use crate::platform::win32::clipboard::{self, Clipboard};
    use crate::types::clipboard::is_registered_format;

    let sequence_number = clipboard::get_clipboard_sequence_number();
    let guard = Clipboard::open(None)?;
    let ids = guard.formats()?;
    guard.close()?;

    let formats = ids
        .into_iter()
        .map(|id| {
            let registered = if is_registered_format(id) {
                clipboard::get_clipboard_format_name(id).ok()
            } else {
                None
            };
            FormatEntry::new(id, registered)
        })
        .collect();
    Ok(ClipboardReport { sequence_number, formats })
}

#[cfg(not(windows))]
fn unsupported<T>(function: &'static str) -> Result<T> {
    Err(WinError::Io(std::io::Error::new(
        std::io::ErrorKind::Unsupported,
        format!("{function}: Win32 APIs are only available on Windows"),
    )))
}

#[cfg(not(windows))]
fn collect_process() -> Result<ProcessReport> {
    unsupported("collect_process")
}

#[cfg(not(windows))]
fn collect_console() -> Result<ConsoleReport> {
    unsupported("collect_console")
}

#[cfg(not(windows))]
fn collect_clipboard() -> Result<ClipboardReport> {
    unsupported("collect_clipboard")
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::clipboard::format::{CF_UNICODETEXT, REGISTERED_FIRST};
    use crate::types::console::{Coord, SmallRect};
    use crate::types::WinBool;

    fn sample_console() -> ConsoleReport {
        ConsoleReport {
            input_code_page: 437,
            output_code_page: 65001,
            title: "winlayer".into(),
            output_mode: ConsoleMode::from_bits_retain(0x3),
            cursor: ConsoleCursorInfo { size: 25, visible: WinBool::TRUE },
            screen_buffer: ConsoleScreenBufferInfo {
                size: Coord::new(120, 9001),
                cursor_position: Coord::new(0, 4),
                attributes: Default::default(),
                window: SmallRect::new(0, 0, 119, 29),
                maximum_window_size: Coord::new(120, 50),
            },
        }
    }

    #[test]
    fn empty_report_is_an_empty_object() {
        assert_eq!(Report::default().to_json(true).expect("json"), "{}");
    }

    #[test]
    fn process_section_shape() {
        let report = Report {
            process: Some(ProcessReport {
                current_directory: r"C:\work".into(),
                error_mode: 1,
                thread_error_mode: 0,
            }),
            ..Report::default()
        };
        let json = report.to_json(true).expect("json");
        let v: serde_json::Value = serde_json::from_str(&json).expect("parse");
        assert_eq!(v["process"]["current_directory"], r"C:\work");
        assert_eq!(v["process"]["error_mode"], 1);
        assert!(v.get("console").is_none());
        assert!(v.get("errors").is_none());
    }

    #[test]
    fn console_section_shape() {
        let report = Report { console: Some(sample_console()), ..Report::default() };
        let json = report.to_json(false).expect("json");
        let v: serde_json::Value = serde_json::from_str(&json).expect("parse");
        let c = &v["console"];
        assert_eq!(c["output_code_page"], 65001);
        assert_eq!(c["output_mode"], 3);
        assert_eq!(c["cursor"]["visible"], true);
        assert_eq!(c["screen_buffer"]["size"]["x"], 120);
        assert_eq!(c["screen_buffer"]["window"]["right"], 119);
    }

    #[test]
    fn format_names() {
        assert_eq!(FormatEntry::new(CF_UNICODETEXT, None).name.as_deref(), Some("CF_UNICODETEXT"));
        let custom = FormatEntry::new(REGISTERED_FIRST + 7, Some("HTML Format".into()));
        assert_eq!(custom.name.as_deref(), Some("HTML Format"));
        assert_eq!(FormatEntry::new(REGISTERED_FIRST + 8, None).name, None);

        let json = serde_json::to_string(&FormatEntry::new(0x0300, None)).expect("json");
        assert_eq!(json, r#"{"id":768}"#);
    }

    #[test]
    fn failed_sections_are_listed() {
        let mut report = Report::default();
        let err: Result<ConsoleReport> = Err(WinError::Win32 { function: "GetStdHandle", code: 6 });
        report.record(Section::Console, err, |r, v| r.console = Some(v));
        assert!(report.console.is_none());

        let json = report.to_json(true).expect("json");
        let v: serde_json::Value = serde_json::from_str(&json).expect("parse");
        assert_eq!(v["errors"][0]["section"], "console");
        assert_eq!(v["errors"][0]["function"], "GetStdHandle");
        assert_eq!(v["errors"][0]["code"], 6);
    }

    #[test]
    fn section_names() {
        let names: Vec<_> = Section::ALL.iter().map(|s| s.to_string()).collect();
        assert_eq!(names, ["process", "console", "clipboard"]);
    }

    #[cfg(not(windows))]
    #[test]
    fn every_section_fails_off_windows() {
        let report = collect(&[Section::Clipboard, Section::Process, Section::Process]);
        assert_eq!(report.errors.len(), 2);
        assert_eq!(report.errors[0].section, Section::Process);
        let json = report.to_json(true).expect("json");
        assert_eq!(json.matches("only available on Windows").count(), 2);
    }
}
