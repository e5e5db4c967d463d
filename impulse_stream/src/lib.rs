//! # impulse_stream
//!
//! Convert a continuously sampled, noisy 3-axis acceleration signal into
//! discrete **impulse events** — one event per physical shake or tap.
//!
//! The pipeline has three stages:
//!
//! * [`AccelSample`] → a signed scalar magnitude (Euclidean norm, sign of Z),
//! * [`ImpulseWindow`] → a fixed-length sliding window of recent magnitudes
//!   whose running maximum arms the trigger, with a reset-to-zero hysteresis
//!   so a single shake never fires twice,
//! * [`Sampler`] → a background thread that runs the first two stages at a
//!   fixed cadence and hands impulses to the consumer over a channel.
//!
//! Hardware access stays behind the [`Sensor`] trait; this crate itself never
//! touches a bus.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use impulse_stream::{Sampler, SamplerConfig, ScriptSensor, AccelSample};
//!
//! let sensor = ScriptSensor::new(vec![
//!     AccelSample::zero(); 5
//! ]);
//!
//! let handle = Sampler::spawn(Box::new(sensor), SamplerConfig::default());
//!
//! // Elsewhere, at your own pace:
//! for magnitude in handle.drain_impulses() {
//!     println!("impulse of {magnitude:+.1} g");
//! }
//! handle.stop();
//! ```

use thiserror::Error;

pub mod sampler;
pub mod window;

pub use sampler::{Sampler, SamplerCommand, SamplerConfig, SamplerHandle};
pub use window::{ImpulseWindow, WindowState, DEFAULT_IMPULSE_FLOOR};

// ════════════════════════════════════════════════════════════════════════════
// AccelSample
// ════════════════════════════════════════════════════════════════════════════

/// One 3-axis accelerometer reading, scaled to g.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AccelSample {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl AccelSample {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        AccelSample { x, y, z }
    }

    /// The all-zero reading substituted for a failed sensor read.
    pub fn zero() -> Self {
        AccelSample { x: 0.0, y: 0.0, z: 0.0 }
    }

    /// Euclidean norm of the three axes with the *sign of Z copied onto it*
    /// (sign copy, not multiplication; a Z of exactly 0 counts as positive).
    ///
    /// The norm makes the value rotation-invariant; the sign lets a downward
    /// impulse be told apart from an upward one.
    pub fn signed_magnitude(&self) -> f64 {
        (self.x * self.x + self.y * self.y + self.z * self.z)
            .sqrt()
            .copysign(self.z)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Sensor trait — the hardware seam
// ════════════════════════════════════════════════════════════════════════════

/// Anything that can produce one [`AccelSample`] per call.
///
/// A transport fault is reported as [`SensorError`]; the [`Sampler`] treats
/// every error as a zero reading and keeps going.
pub trait Sensor: Send {
    fn read_sample(&mut self) -> Result<AccelSample, SensorError>;
}

/// A failed read from the underlying accelerometer.
#[derive(Debug, Error)]
pub enum SensorError {
    /// The bus transaction itself failed (I2C NAK, lost arbitration, …).
    #[error("bus transfer failed: {0}")]
    Bus(String),
}

// ── ZeroSensor ──────────────────────────────────────────────────────────────

/// Sensor that always reads a perfectly still device.
///
/// Used as the simulation-mode backend when no hardware is present: the
/// pipeline runs, nothing ever triggers.
pub struct ZeroSensor;

impl Sensor for ZeroSensor {
    fn read_sample(&mut self) -> Result<AccelSample, SensorError> {
        Ok(AccelSample::zero())
    }
}

// ── ScriptSensor ────────────────────────────────────────────────────────────

/// Sensor that replays a fixed list of samples, then reads zeros forever.
///
/// Handy for tests and demos: script a spike, watch the impulse come out.
pub struct ScriptSensor {
    samples: std::collections::VecDeque<AccelSample>,
}

impl ScriptSensor {
    pub fn new(samples: Vec<AccelSample>) -> Self {
        ScriptSensor { samples: samples.into() }
    }

    /// Script built from plain Z-axis values (x = y = 0).
    pub fn from_z_values(values: &[f64]) -> Self {
        Self::new(values.iter().map(|&z| AccelSample::new(0.0, 0.0, z)).collect())
    }
}

impl Sensor for ScriptSensor {
    fn read_sample(&mut self) -> Result<AccelSample, SensorError> {
        Ok(self.samples.pop_front().unwrap_or_else(AccelSample::zero))
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
