//! Top-level scan loop.
//!
//! `AppState` owns the key sources, the report sink, and the shared
//! feedback level. Once per cycle it polls every source in keymap order,
//! turns active ones into HID key events, and brightens the indicators a
//! step further.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use hid_report::{open_report_sink, KeyUsage, ReportSink};
use impulse_stream::{Sensor, SamplerConfig};

use crate::keys::{ButtonKey, KeySource, MotionKey};

// ════════════════════════════════════════════════════════════════════════════
// KeyDef / AppConfig
// ════════════════════════════════════════════════════════════════════════════

/// One keymap entry, fixed at startup.
pub enum KeyDef {
    /// Pushbutton on a GPIO node (local or remote hostname).
    Button {
        name: String,
        node: String,
        input_pin: u8,
        feedback_pin: u8,
        usage: KeyUsage,
    },
    /// Shake of the whole device, detected by the impulse pipeline.
    Motion {
        name: String,
        usage: KeyUsage,
        /// Impulses at or below this magnitude (in g) are ignored.
        threshold: f64,
        sampler: SamplerConfig,
    },
}

/// Configuration for the full controller.
pub struct AppConfig {
    pub keymap: Vec<KeyDef>,
    /// Pause between scan cycles.
    pub scan_period: Duration,
    /// Feedback level gain per key event.
    pub feedback_step: u8,
    /// HID gadget device to write reports to.
    pub sink_path: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            keymap: vec![
                KeyDef::Button {
                    name: "Right Arrow".into(),
                    node: "localhost".into(),
                    input_pin: 21,
                    feedback_pin: 4,
                    usage: KeyUsage::RightArrow,
                },
                KeyDef::Button {
                    name: "Left Arrow".into(),
                    node: "pizero-left.local".into(),
                    input_pin: 12,
                    feedback_pin: 4,
                    usage: KeyUsage::LeftArrow,
                },
                KeyDef::Button {
                    name: "Up Arrow".into(),
                    node: "pi3-updown.local".into(),
                    input_pin: 12,
                    feedback_pin: 4,
                    usage: KeyUsage::UpArrow,
                },
                KeyDef::Button {
                    name: "Down Arrow".into(),
                    node: "pi3-updown.local".into(),
                    input_pin: 21,
                    feedback_pin: 17,
                    usage: KeyUsage::DownArrow,
                },
                KeyDef::Motion {
                    name: "Shake".into(),
                    usage: KeyUsage::Space,
                    threshold: 2.0,
                    sampler: SamplerConfig::default(),
                },
            ],
            scan_period: Duration::from_millis(100),
            feedback_step: 10,
            sink_path: PathBuf::from("/dev/hidg0"),
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// FeedbackLevel — the shared brightness cursor
// ════════════════════════════════════════════════════════════════════════════

/// One process-wide brightness percentage, stepped on every key event and
/// wrapped back to 0 past 100.
pub struct FeedbackLevel {
    level: u8,
    step: u8,
}

impl FeedbackLevel {
    pub fn new(step: u8) -> Self {
        FeedbackLevel { level: 0, step }
    }

    /// Advance by one step and return the new level.
    pub fn advance(&mut self) -> u8 {
        self.level = self.level.saturating_add(self.step);
        if self.level > 100 {
            self.level = 0;
        }
        self.level
    }

    pub fn level(&self) -> u8 {
        self.level
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Source building
// ════════════════════════════════════════════════════════════════════════════

/// Build every key source in the keymap, in order. A key whose node or
/// sensor cannot be reached becomes a `None` entry: logged, skipped every
/// cycle, never fatal.
pub fn build_sources(keymap: &[KeyDef]) -> Vec<Option<Box<dyn KeySource>>> {
    keymap
        .iter()
        .map(|def| match def {
            KeyDef::Button { name, node, input_pin, feedback_pin, usage } => {
                match ButtonKey::connect(name, node, *input_pin, *feedback_pin, *usage) {
                    Ok(key) => Some(Box::new(key) as Box<dyn KeySource>),
                    Err(e) => {
                        eprintln!("[app] {name} on {node} unavailable: {e}");
                        None
                    }
                }
            }
            KeyDef::Motion { name, usage, threshold, sampler } => {
                open_motion_sensor().map(|sensor| {
                    Box::new(MotionKey::spawn(name, *usage, *threshold, sensor, *sampler))
                        as Box<dyn KeySource>
                })
            }
        })
        .collect()
}

/// The accelerometer backend: real MPU-6050 with the `hw` feature, a
/// zero-reading stand-in otherwise (the pipeline runs, nothing triggers).
fn open_motion_sensor() -> Option<Box<dyn Sensor>> {
    #[cfg(feature = "hw")]
    return match crate::sensor::Mpu6050::open() {
        Ok(sensor) => Some(Box::new(sensor)),
        Err(e) => {
            eprintln!("[app] accelerometer unavailable: {e}");
            None
        }
    };

    #[cfg(not(feature = "hw"))]
    return Some(Box::new(impulse_stream::ZeroSensor));
}

// ════════════════════════════════════════════════════════════════════════════
// AppState
// ════════════════════════════════════════════════════════════════════════════

pub struct AppState {
    sources: Vec<Option<Box<dyn KeySource>>>,
    sink: Box<dyn ReportSink>,
    feedback: FeedbackLevel,
}

impl AppState {
    pub fn new(
        sources: Vec<Option<Box<dyn KeySource>>>,
        sink: Box<dyn ReportSink>,
        feedback_step: u8,
    ) -> Self {
        AppState {
            sources,
            sink,
            feedback: FeedbackLevel::new(feedback_step),
        }
    }

    pub fn available_keys(&self) -> usize {
        self.sources.iter().flatten().count()
    }

    pub fn feedback_level(&self) -> u8 {
        self.feedback.level()
    }

    /// Poll every source once, in keymap order. Each active source emits
    /// its own key event; no coalescing. Returns how many events went out.
    pub fn scan_once(&mut self) -> usize {
        let mut emitted = 0;

        for slot in self.sources.iter_mut() {
            let Some(source) = slot else { continue };
            let Some(usage) = source.read() else { continue };

            // A transient host-link fault drops this event; the key fires
            // again on a later scan if still active.
            if let Err(e) = self.sink.send_key(usage) {
                eprintln!("[app] report write failed ({e}) — retrying next scan");
                continue;
            }

            let level = self.feedback.advance();
            source.light(level);
            emitted += 1;
        }

        emitted
    }
}

// ════════════════════════════════════════════════════════════════════════════
// run() — the main scan loop
// ════════════════════════════════════════════════════════════════════════════

/// Run the controller until `stop` is raised.
///
/// This is the entry point called from `main.rs`; tests raise the flag,
/// the binary never does.
pub fn run_until(cfg: AppConfig, stop: &AtomicBool) {
    let sink = open_report_sink(&cfg.sink_path);
    let sources = build_sources(&cfg.keymap);

    let mut app = AppState::new(sources, sink, cfg.feedback_step);
    println!(
        "[app] {} of {} keys available — scanning every {} ms",
        app.available_keys(),
        cfg.keymap.len(),
        cfg.scan_period.as_millis()
    );

    while !stop.load(Ordering::Relaxed) {
        app.scan_once();
        thread::sleep(cfg.scan_period);
    }
}

/// Run forever (process shutdown is the only exit).
pub fn run(cfg: AppConfig) {
    let stop = AtomicBool::new(false);
    run_until(cfg, &stop);
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
