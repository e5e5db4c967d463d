//! Key sources — everything that can say "my key is pressed this cycle".
//!
//! The public interface is [`KeySource`]. The scan loop polls a list of
//! these once per cycle and never needs to know whether a key is a physical
//! button on some node or a shake of the whole device.

use hid_report::KeyUsage;
use impulse_stream::{Sampler, SamplerConfig, SamplerHandle, Sensor};

use crate::gpio::{GpioError, GpioLink};

// ════════════════════════════════════════════════════════════════════════════
// KeySource trait — unified interface for buttons and motion
// ════════════════════════════════════════════════════════════════════════════

/// A polled input that may produce one key usage per scan cycle.
pub trait KeySource {
    fn name(&self) -> &str;

    /// Non-blocking. `Some(usage)` iff the source is active this cycle.
    fn read(&mut self) -> Option<KeyUsage>;

    /// Drive the source's feedback indicator to `percent` (clamped to 100).
    /// Sources without an indicator ignore this.
    fn light(&mut self, percent: u8);
}

// ════════════════════════════════════════════════════════════════════════════
// ButtonKey — a pushbutton on a (possibly remote) GPIO node
// ════════════════════════════════════════════════════════════════════════════

/// Active-low pushbutton with a PWM-dimmed indicator LED, both reached
/// through one `pigpiod` connection.
pub struct ButtonKey {
    name: String,
    link: GpioLink,
    input_pin: u8,
    feedback_pin: u8,
    usage: KeyUsage,
}

impl ButtonKey {
    /// Connect to the node and run the wiring ritual: input pin pulled up,
    /// indicator dark. Fails if the node is unreachable; the caller turns
    /// that into an absent key, not a crash.
    pub fn connect(
        name: &str,
        node: &str,
        input_pin: u8,
        feedback_pin: u8,
        usage: KeyUsage,
    ) -> Result<Self, GpioError> {
        println!("[keys] setting up {name} on {node}");
        let mut link = GpioLink::connect(node)?;
        link.setup_button_pin(input_pin)?;
        link.set_pwm_duty(feedback_pin, 0)?;

        Ok(ButtonKey {
            name: name.to_string(),
            link,
            input_pin,
            feedback_pin,
            usage,
        })
    }

    #[cfg(test)]
    fn connect_with_port(
        name: &str,
        node: &str,
        port: u16,
        input_pin: u8,
        feedback_pin: u8,
        usage: KeyUsage,
    ) -> Result<Self, GpioError> {
        let mut link = GpioLink::connect_with_port(node, port)?;
        link.setup_button_pin(input_pin)?;
        link.set_pwm_duty(feedback_pin, 0)?;
        Ok(ButtonKey { name: name.to_string(), link, input_pin, feedback_pin, usage })
    }
}

impl KeySource for ButtonKey {
    fn name(&self) -> &str {
        &self.name
    }

    fn read(&mut self) -> Option<KeyUsage> {
        // Pull-up wiring: pressed shorts the pin to ground, so low = active.
        match self.link.read_pin(self.input_pin) {
            Ok(false) => {
                println!("[keys] {}", self.name);
                Some(self.usage)
            }
            Ok(true) => None,
            Err(e) => {
                eprintln!("[keys] {}: read failed: {e}", self.name);
                None
            }
        }
    }

    fn light(&mut self, percent: u8) {
        let percent = percent.min(100);
        let duty = (percent as u16 * 255 / 100) as u8;
        if let Err(e) = self.link.set_pwm_duty(self.feedback_pin, duty) {
            eprintln!("[keys] {}: light failed: {e}", self.name);
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// MotionKey — a shake of the whole device
// ════════════════════════════════════════════════════════════════════════════

/// Key driven by the impulse pipeline: owns its background sampler and
/// drains the impulse channel on every poll, keeping the most recent event
/// over its trigger threshold.
pub struct MotionKey {
    name: String,
    usage: KeyUsage,
    threshold: f64,
    sampler: SamplerHandle,
}

impl MotionKey {
    /// Spawn the sampling thread for `sensor` and wrap it as a key source.
    pub fn spawn(
        name: &str,
        usage: KeyUsage,
        threshold: f64,
        sensor: Box<dyn Sensor>,
        cfg: SamplerConfig,
    ) -> Self {
        println!("[keys] setting up {name} (shake > {threshold:.1} g)");
        MotionKey {
            name: name.to_string(),
            usage,
            threshold,
            sampler: Sampler::spawn(sensor, cfg),
        }
    }

    #[cfg(test)]
    fn with_handle(name: &str, usage: KeyUsage, threshold: f64, sampler: SamplerHandle) -> Self {
        MotionKey { name: name.to_string(), usage, threshold, sampler }
    }
}

impl KeySource for MotionKey {
    fn name(&self) -> &str {
        &self.name
    }

    fn read(&mut self) -> Option<KeyUsage> {
        self.sampler.last_over(self.threshold).map(|magnitude| {
            println!("[keys] {} ({magnitude:+.1} g)", self.name);
            self.usage
        })
    }

    fn light(&mut self, _percent: u8) {
        // The shake sensor has no indicator of its own.
    }
}

impl Drop for MotionKey {
    fn drop(&mut self) {
        self.sampler.stop();
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gpio::testing::spawn_fake_daemon;
    use std::sync::mpsc;

    fn motion_key(threshold: f64) -> (mpsc::Sender<f64>, MotionKey) {
        let (impulse_tx, impulse_rx) = mpsc::channel();
        let (cmd_tx, _cmd_rx) = mpsc::channel();
        let handle = SamplerHandle { impulse_rx, cmd_tx };
        (impulse_tx, MotionKey::with_handle("Shake", KeyUsage::Space, threshold, handle))
    }

    // ── MotionKey ────────────────────────────────────────────────────────
    #[test]
    fn quiet_channel_reads_inactive() {
        let (_tx, mut key) = motion_key(2.0);
        assert_eq!(key.read(), None);
    }

    #[test]
    fn weak_impulse_stays_below_threshold() {
        let (tx, mut key) = motion_key(2.0);
        tx.send(1.5).unwrap();
        assert_eq!(key.read(), None);
    }

    #[test]
    fn strong_impulse_produces_the_key() {
        let (tx, mut key) = motion_key(2.0);
        tx.send(2.5).unwrap();
        assert_eq!(key.read(), Some(KeyUsage::Space));
        // Consumed: the same impulse cannot fire twice.
        assert_eq!(key.read(), None);
    }

    #[test]
    fn backlog_yields_most_recent_qualifying() {
        let (tx, mut key) = motion_key(2.0);
        for m in [3.0, 5.0, 4.0, 1.0] {
            tx.send(m).unwrap();
        }
        // One poll, one key: the backlog collapses.
        assert_eq!(key.read(), Some(KeyUsage::Space));
        assert_eq!(key.read(), None);
    }

    #[test]
    fn motion_light_is_a_no_op() {
        let (_tx, mut key) = motion_key(2.0);
        key.light(80); // nothing to assert beyond "does not panic"
    }

    // ── ButtonKey ────────────────────────────────────────────────────────
    #[test]
    fn button_reads_active_low() {
        let (port, daemon) = spawn_fake_daemon(vec![0, 1]);
        {
            let mut key = ButtonKey::connect_with_port(
                "Right Arrow", "127.0.0.1", port, 21, 4, KeyUsage::RightArrow,
            )
            .unwrap();
            assert_eq!(key.read(), Some(KeyUsage::RightArrow)); // low = pressed
            assert_eq!(key.read(), None); // high = idle
        }
        daemon.join().unwrap();
    }

    #[test]
    fn button_setup_ritual_and_duty_mapping() {
        let (port, daemon) = spawn_fake_daemon(vec![]);
        {
            let mut key = ButtonKey::connect_with_port(
                "Right Arrow", "127.0.0.1", port, 21, 4, KeyUsage::RightArrow,
            )
            .unwrap();
            key.light(100);
            key.light(50);
        }
        let seen = daemon.join().unwrap();
        // Wiring ritual: input mode, pull-up, indicator dark.
        assert_eq!(&seen[..3], &[(0, 21, 0), (2, 21, 2), (5, 4, 0)]);
        // Percent → 8-bit duty.
        assert_eq!(&seen[3..], &[(5, 4, 255), (5, 4, 127)]);
    }

    #[test]
    fn unreachable_node_fails_connect() {
        let err = ButtonKey::connect_with_port(
            "Left Arrow", "127.0.0.1", 1, 12, 4, KeyUsage::LeftArrow,
        );
        assert!(err.is_err());
    }
}
