//! # hid_report
//!
//! Encode USB HID **boot-keyboard reports** and write them to a HID gadget
//! device, so a single-board computer on a USB OTG port shows up to its host
//! as an ordinary keyboard.
//!
//! No external crates are required — report bytes are written directly.
//!
//! A key event is two 8-byte reports, in order:
//!
//! | byte | meaning |
//! |---|---|
//! | 0 | modifier bits (Ctrl/Shift/Alt/GUI) |
//! | 1 | reserved, always 0 |
//! | 2–7 | up to six concurrent key usage codes |
//!
//! first with the key's usage code at byte 2 (**press**), then all zeros
//! (**release**).
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use hid_report::{open_report_sink, KeyUsage};
//!
//! let mut sink = open_report_sink("/dev/hidg0".as_ref());
//! sink.send_key(KeyUsage::RightArrow).unwrap();
//! ```

use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Length of one boot-keyboard report.
pub const REPORT_LEN: usize = 8;

/// The all-zero report sent after every press.
pub const RELEASE_REPORT: [u8; REPORT_LEN] = [0; REPORT_LEN];

// ════════════════════════════════════════════════════════════════════════════
// KeyUsage — HID usage IDs, keyboard/keypad page
// ════════════════════════════════════════════════════════════════════════════

/// HID keyboard usage IDs (usage page 0x07), as sent in report bytes 2–7.
///
/// Use [`KeyUsage::code`] to get the raw `u8` value.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
#[allow(dead_code)]
pub enum KeyUsage {
    // Letters
    A = 0x04,
    B = 0x05,
    C = 0x06,
    D = 0x07,
    E = 0x08,
    F = 0x09,
    G = 0x0A,
    H = 0x0B,
    I = 0x0C,
    J = 0x0D,
    K = 0x0E,
    L = 0x0F,
    M = 0x10,
    N = 0x11,
    O = 0x12,
    P = 0x13,
    Q = 0x14,
    R = 0x15,
    S = 0x16,
    T = 0x17,
    U = 0x18,
    V = 0x19,
    W = 0x1A,
    X = 0x1B,
    Y = 0x1C,
    Z = 0x1D,
    // Digits (top row)
    Digit1 = 0x1E,
    Digit2 = 0x1F,
    Digit3 = 0x20,
    Digit4 = 0x21,
    Digit5 = 0x22,
    Digit6 = 0x23,
    Digit7 = 0x24,
    Digit8 = 0x25,
    Digit9 = 0x26,
    Digit0 = 0x27,
    // Controls
    Enter     = 0x28,
    Escape    = 0x29,
    Backspace = 0x2A,
    Tab       = 0x2B,
    Space     = 0x2C,
    // Navigation cluster
    Insert   = 0x49,
    Home     = 0x4A,
    PageUp   = 0x4B,
    Delete   = 0x4C,
    End      = 0x4D,
    PageDown = 0x4E,
    // Arrows
    RightArrow = 0x4F,
    LeftArrow  = 0x50,
    DownArrow  = 0x51,
    UpArrow    = 0x52,
}

impl KeyUsage {
    /// Raw usage ID (keyboard/keypad page).
    pub fn code(self) -> u8 {
        self as u8
    }

    /// Human-readable name, for log lines.
    pub fn name(self) -> &'static str {
        match self {
            KeyUsage::A => "A",
            KeyUsage::B => "B",
            KeyUsage::C => "C",
            KeyUsage::D => "D",
            KeyUsage::E => "E",
            KeyUsage::F => "F",
            KeyUsage::G => "G",
            KeyUsage::H => "H",
            KeyUsage::I => "I",
            KeyUsage::J => "J",
            KeyUsage::K => "K",
            KeyUsage::L => "L",
            KeyUsage::M => "M",
            KeyUsage::N => "N",
            KeyUsage::O => "O",
            KeyUsage::P => "P",
            KeyUsage::Q => "Q",
            KeyUsage::R => "R",
            KeyUsage::S => "S",
            KeyUsage::T => "T",
            KeyUsage::U => "U",
            KeyUsage::V => "V",
            KeyUsage::W => "W",
            KeyUsage::X => "X",
            KeyUsage::Y => "Y",
            KeyUsage::Z => "Z",
            KeyUsage::Digit1 => "1",
            KeyUsage::Digit2 => "2",
            KeyUsage::Digit3 => "3",
            KeyUsage::Digit4 => "4",
            KeyUsage::Digit5 => "5",
            KeyUsage::Digit6 => "6",
            KeyUsage::Digit7 => "7",
            KeyUsage::Digit8 => "8",
            KeyUsage::Digit9 => "9",
            KeyUsage::Digit0 => "0",
            KeyUsage::Enter     => "Enter",
            KeyUsage::Escape    => "Escape",
            KeyUsage::Backspace => "Backspace",
            KeyUsage::Tab       => "Tab",
            KeyUsage::Space     => "Space",
            KeyUsage::Insert   => "Insert",
            KeyUsage::Home     => "Home",
            KeyUsage::PageUp   => "Page Up",
            KeyUsage::Delete   => "Delete",
            KeyUsage::End      => "End",
            KeyUsage::PageDown => "Page Down",
            KeyUsage::RightArrow => "Right Arrow",
            KeyUsage::LeftArrow  => "Left Arrow",
            KeyUsage::DownArrow  => "Down Arrow",
            KeyUsage::UpArrow    => "Up Arrow",
        }
    }
}

// ── modifier bits (report byte 0) ───────────────────────────────────────────

pub mod modifier {
    pub const LEFT_CTRL:   u8 = 0x01;
    pub const LEFT_SHIFT:  u8 = 0x02;
    pub const LEFT_ALT:    u8 = 0x04;
    pub const LEFT_GUI:    u8 = 0x08;
    pub const RIGHT_CTRL:  u8 = 0x10;
    pub const RIGHT_SHIFT: u8 = 0x20;
    pub const RIGHT_ALT:   u8 = 0x40;
    pub const RIGHT_GUI:   u8 = 0x80;
}

// ════════════════════════════════════════════════════════════════════════════
// Report encoding
// ════════════════════════════════════════════════════════════════════════════

/// Press report for one key, no modifiers.
pub fn press_report(usage: KeyUsage) -> [u8; REPORT_LEN] {
    press_report_with_modifiers(0, usage)
}

/// Press report for one key with the given modifier bits (see [`modifier`]).
pub fn press_report_with_modifiers(modifiers: u8, usage: KeyUsage) -> [u8; REPORT_LEN] {
    let mut report = [0u8; REPORT_LEN];
    report[0] = modifiers;
    report[2] = usage.code();
    report
}

// ════════════════════════════════════════════════════════════════════════════
// ReportSink — abstraction over the gadget device / null (for testing)
// ════════════════════════════════════════════════════════════════════════════

/// Destination for HID reports.
pub trait ReportSink: Send {
    fn write_report(&mut self, report: &[u8; REPORT_LEN]) -> Result<(), SinkError>;

    /// One full key event: press, then release, synchronously and in order.
    fn send_key(&mut self, usage: KeyUsage) -> Result<(), SinkError> {
        self.write_report(&press_report(usage))?;
        self.write_report(&RELEASE_REPORT)
    }
}

/// A failed write to the report device.
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("cannot write HID report to {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

// ── gadget backend ──────────────────────────────────────────────────────────

/// Sink backed by a HID gadget device file (usually `/dev/hidg0`).
///
/// The device is reopened per report, so an unplugged-and-replugged host
/// link recovers on the next write without any state to repair.
pub struct GadgetSink {
    path: PathBuf,
}

impl GadgetSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        GadgetSink { path: path.into() }
    }
}

impl ReportSink for GadgetSink {
    fn write_report(&mut self, report: &[u8; REPORT_LEN]) -> Result<(), SinkError> {
        let wrap = |source| SinkError::Write { path: self.path.clone(), source };
        let mut device = OpenOptions::new().write(true).open(&self.path).map_err(wrap)?;
        device.write_all(report).map_err(wrap)
    }
}

// ── null backend (used when no gadget device is available) ──────────────────

pub struct NullSink;

impl ReportSink for NullSink {
    fn write_report(&mut self, _report: &[u8; REPORT_LEN]) -> Result<(), SinkError> {
        Ok(())
    }
}

// ════════════════════════════════════════════════════════════════════════════
// open_report_sink — gadget device if present, else null
// ════════════════════════════════════════════════════════════════════════════

/// Open the gadget device at `path`, falling back to [`NullSink`] with a
/// warning if it does not exist.
pub fn open_report_sink(path: &Path) -> Box<dyn ReportSink> {
    if path.exists() {
        eprintln!("[hid] writing reports to {}", path.display());
        Box::new(GadgetSink::new(path))
    } else {
        eprintln!("[hid] {} not found — using null sink.", path.display());
        eprintln!("[hid] To expose a keyboard gadget on an OTG port:");
        eprintln!("      • enable dwc2 and libcomposite");
        eprintln!("      • create a configfs HID function with an 8-byte report");
        Box::new(NullSink)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    struct VecSink {
        reports: Vec<[u8; REPORT_LEN]>,
    }

    impl ReportSink for VecSink {
        fn write_report(&mut self, report: &[u8; REPORT_LEN]) -> Result<(), SinkError> {
            self.reports.push(*report);
            Ok(())
        }
    }

    // ── usage codes ──────────────────────────────────────────────────────
    #[test]
    fn arrow_usage_codes() {
        assert_eq!(KeyUsage::RightArrow.code(), 79);
        assert_eq!(KeyUsage::LeftArrow.code(), 80);
        assert_eq!(KeyUsage::DownArrow.code(), 81);
        assert_eq!(KeyUsage::UpArrow.code(), 82);
    }

    #[test]
    fn letter_and_control_codes() {
        assert_eq!(KeyUsage::A.code(), 0x04);
        assert_eq!(KeyUsage::Z.code(), 0x1D);
        assert_eq!(KeyUsage::Space.code(), 0x2C);
        assert_eq!(KeyUsage::Digit0.code(), 0x27);
    }

    // ── report layout ────────────────────────────────────────────────────
    #[test]
    fn press_report_layout() {
        let r = press_report(KeyUsage::RightArrow);
        assert_eq!(r.len(), REPORT_LEN);
        assert_eq!(r[0], 0);  // no modifiers
        assert_eq!(r[1], 0);  // reserved
        assert_eq!(r[2], 79); // usage at byte 2
        assert_eq!(&r[3..], &[0, 0, 0, 0, 0]);
    }

    #[test]
    fn modifiers_land_in_byte_zero() {
        let r = press_report_with_modifiers(modifier::LEFT_SHIFT, KeyUsage::A);
        assert_eq!(r[0], 0x02);
        assert_eq!(r[2], 0x04);
    }

    #[test]
    fn release_report_is_all_zero() {
        assert_eq!(RELEASE_REPORT, [0u8; 8]);
    }

    // ── send_key sequencing ──────────────────────────────────────────────
    #[test]
    fn send_key_writes_press_then_release() {
        let mut sink = VecSink { reports: Vec::new() };
        sink.send_key(KeyUsage::UpArrow).unwrap();
        assert_eq!(sink.reports.len(), 2);
        assert_eq!(sink.reports[0][2], 82);
        assert_eq!(sink.reports[1], RELEASE_REPORT);
    }

    // ── gadget backend ───────────────────────────────────────────────────
    #[test]
    fn gadget_sink_writes_to_device_file() {
        let path = std::env::temp_dir().join("hid_report_gadget_sink_test");
        std::fs::write(&path, [0u8; 8]).unwrap();

        let mut sink = GadgetSink::new(&path);
        sink.write_report(&press_report(KeyUsage::LeftArrow)).unwrap();

        let written = std::fs::read(&path).unwrap();
        assert_eq!(written, press_report(KeyUsage::LeftArrow));
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn gadget_sink_reports_missing_device() {
        let mut sink = GadgetSink::new("/nonexistent/hidg99");
        assert!(sink.write_report(&RELEASE_REPORT).is_err());
    }

    #[test]
    fn null_sink_swallows_everything() {
        let mut sink = NullSink;
        assert!(sink.send_key(KeyUsage::Space).is_ok());
    }

    #[test]
    fn open_report_sink_falls_back_to_null() {
        let mut sink = open_report_sink(Path::new("/nonexistent/hidg99"));
        assert!(sink.send_key(KeyUsage::Space).is_ok());
    }
}
