//! The sliding-window impulse trigger.
//!
//! A fixed-capacity FIFO of the most recent signed magnitudes. The window
//! fills, arms, and fires at most once per physical impulse: firing clears
//! the buffer back to a single zero entry, so at least one full window of
//! quiet samples must pass before the next event.

use std::collections::VecDeque;

/// Running maximum must exceed this (in g) for the window to fire.
///
/// This is the window's own coarse filter; consumers usually apply a finer
/// per-source threshold on top when draining events.
pub const DEFAULT_IMPULSE_FLOOR: f64 = 2.0;

// ════════════════════════════════════════════════════════════════════════════
// WindowState
// ════════════════════════════════════════════════════════════════════════════

/// Where the window is in its fill/arm cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WindowState {
    /// Fewer samples than capacity collected since the last reset; the
    /// window cannot fire.
    Filling,
    /// Exactly capacity samples present; every push evicts the oldest,
    /// recomputes the running maximum, and may fire.
    Armed,
}

// ════════════════════════════════════════════════════════════════════════════
// ImpulseWindow
// ════════════════════════════════════════════════════════════════════════════

/// Fixed-length history of recent magnitudes with an arm-and-fire trigger.
///
/// Owned exclusively by the sampling loop that feeds it; nothing else
/// mutates it.
pub struct ImpulseWindow {
    recent: VecDeque<f64>,
    capacity: usize,
    floor: f64,
    peak: f64,
}

impl ImpulseWindow {
    /// Window of `capacity` samples with the default impulse floor.
    pub fn new(capacity: usize) -> Self {
        Self::with_floor(capacity, DEFAULT_IMPULSE_FLOOR)
    }

    pub fn with_floor(capacity: usize, floor: f64) -> Self {
        assert!(capacity > 0, "window capacity must be at least 1");
        ImpulseWindow {
            recent: VecDeque::with_capacity(capacity),
            capacity,
            floor,
            peak: 0.0,
        }
    }

    pub fn state(&self) -> WindowState {
        if self.recent.len() == self.capacity {
            WindowState::Armed
        } else {
            WindowState::Filling
        }
    }

    pub fn len(&self) -> usize {
        self.recent.len()
    }

    pub fn is_empty(&self) -> bool {
        self.recent.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Running maximum over the window contents, as of the last armed push.
    pub fn peak(&self) -> f64 {
        self.peak
    }

    /// Append one magnitude. Returns the running maximum if this push fired
    /// the trigger, in which case the window has already reset itself.
    ///
    /// While filling, samples are only collected; the trigger cannot fire
    /// until a push happens with the window already full.
    pub fn push(&mut self, magnitude: f64) -> Option<f64> {
        if self.recent.len() == self.capacity {
            self.recent.pop_front();
            self.recent.push_back(magnitude);
            self.peak = self.recent.iter().copied().fold(f64::NEG_INFINITY, f64::max);

            if self.peak > self.floor {
                let fired = self.peak;
                self.reset();
                return Some(fired);
            }
        } else {
            self.recent.push_back(magnitude);
        }
        None
    }

    /// Clear back to a single zero entry and start filling again.
    ///
    /// This is the hysteresis: after a fire, the window needs a full refill
    /// (capacity − 1 further pushes) before it can arm again.
    pub fn reset(&mut self) {
        self.recent.clear();
        self.recent.push_back(0.0);
        self.peak = 0.0;
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
