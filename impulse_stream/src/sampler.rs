//! The background sampling thread.
//!
//! One sampler runs per motion source: it reads the sensor at a fixed
//! cadence, feeds the [`ImpulseWindow`], and forwards fired impulses over a
//! channel to whoever polls the [`SamplerHandle`]. Sensor faults are
//! absorbed as zero readings; only an explicit [`SamplerCommand::Stop`]
//! (or the consumer going away) ends the loop.

use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::thread;
use std::time::Duration;

use crate::window::ImpulseWindow;
use crate::{AccelSample, Sensor, DEFAULT_IMPULSE_FLOOR};

// ════════════════════════════════════════════════════════════════════════════
// SamplerConfig
// ════════════════════════════════════════════════════════════════════════════

/// Cadence and window geometry for one sampling loop.
#[derive(Clone, Copy, Debug)]
pub struct SamplerConfig {
    /// Samples held by the impulse window.
    pub window_len: usize,
    /// Pause between sensor reads.
    pub period: Duration,
    /// Running maximum must exceed this (in g) for the window to fire.
    pub impulse_floor: f64,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        SamplerConfig {
            window_len:    5,
            period:        Duration::from_millis(10),
            impulse_floor: DEFAULT_IMPULSE_FLOOR,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// SamplerCommand — sent to the sampling thread
// ════════════════════════════════════════════════════════════════════════════

pub enum SamplerCommand {
    /// Finish the current cycle and exit the loop.
    Stop,
}

// ════════════════════════════════════════════════════════════════════════════
// SamplerHandle — the consumer's end
// ════════════════════════════════════════════════════════════════════════════

/// Handle to a running sampling thread.
pub struct SamplerHandle {
    pub impulse_rx: Receiver<f64>,
    pub cmd_tx:     Sender<SamplerCommand>,
}

impl SamplerHandle {
    /// Drain every impulse queued since the last poll (non-blocking).
    pub fn drain_impulses(&self) -> Vec<f64> {
        let mut out = Vec::new();
        while let Ok(m) = self.impulse_rx.try_recv() {
            out.push(m);
        }
        out
    }

    /// Drain the queue and keep the most recently enqueued impulse whose
    /// magnitude exceeds `threshold`.
    ///
    /// Several impulses can pile up between polls; the newest qualifying
    /// one wins, not the largest or the first.
    pub fn last_over(&self, threshold: f64) -> Option<f64> {
        self.drain_impulses()
            .into_iter()
            .filter(|&m| m > threshold)
            .last()
    }

    /// Ask the sampling thread to exit. Safe to call more than once.
    pub fn stop(&self) {
        let _ = self.cmd_tx.send(SamplerCommand::Stop);
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Sampler — spawn the thread
// ════════════════════════════════════════════════════════════════════════════

pub struct Sampler;

impl Sampler {
    /// Spawn the sampling loop on its own thread and return the handle.
    pub fn spawn(sensor: Box<dyn Sensor>, cfg: SamplerConfig) -> SamplerHandle {
        let (impulse_tx, impulse_rx) = mpsc::channel::<f64>();
        let (cmd_tx, cmd_rx) = mpsc::channel::<SamplerCommand>();

        thread::spawn(move || sampler_thread(sensor, cfg, cmd_rx, impulse_tx));

        SamplerHandle { impulse_rx, cmd_tx }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// sampler_thread — the actual loop
// ════════════════════════════════════════════════════════════════════════════

fn sampler_thread(
    mut sensor: Box<dyn Sensor>,
    cfg:        SamplerConfig,
    cmd_rx:     Receiver<SamplerCommand>,
    impulse_tx: Sender<f64>,
) {
    let mut window = ImpulseWindow::with_floor(cfg.window_len, cfg.impulse_floor);

    loop {
        // ── drain commands ────────────────────────────────────────────────
        match cmd_rx.try_recv() {
            Ok(SamplerCommand::Stop) | Err(TryRecvError::Disconnected) => return,
            Err(TryRecvError::Empty) => {}
        }

        // ── one sampling cycle ────────────────────────────────────────────
        // A failed read is a zero reading, never a dead loop.
        let sample = match sensor.read_sample() {
            Ok(s) => s,
            Err(e) => {
                eprintln!("[sampler] read failed ({e}) — assuming 0 g");
                AccelSample::zero()
            }
        };

        if let Some(peak) = window.push(sample.signed_magnitude()) {
            // Consumer hung up; nothing left to sample for.
            if impulse_tx.send(peak).is_err() {
                return;
            }
        }

        thread::sleep(cfg.period);
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
