//! Console monitor for the impulse pipeline.
//!
//! Runs a sampler against a synthetic sensor that shakes the virtual device
//! once a second, and prints every impulse event as it is drained. Useful
//! for eyeballing window length / floor combinations without hardware.

use impulse_stream::{
    AccelSample, Sampler, SamplerConfig, Sensor, SensorError, DEFAULT_IMPULSE_FLOOR,
};
use std::io::{self, Write};
use std::time::Duration;

/// Quiet for a fixed number of cycles, then one hard spike, repeating.
struct PulseSensor {
    cycle: u32,
    quiet_cycles: u32,
    spike_g: f64,
}

impl Sensor for PulseSensor {
    fn read_sample(&mut self) -> Result<AccelSample, SensorError> {
        self.cycle += 1;
        if self.cycle >= self.quiet_cycles {
            self.cycle = 0;
            Ok(AccelSample::new(0.3, 0.1, self.spike_g))
        } else {
            Ok(AccelSample::new(0.0, 0.0, 1.0)) // resting flat: 1 g on Z
        }
    }
}

fn main() {
    println!();
    println!("╔══════════════════════════════════════════════════════╗");
    println!("║            Impulse Stream — Live Monitor             ║");
    println!("╚══════════════════════════════════════════════════════╝");
    println!();

    let window_len: usize = read_line("  Window length in samples (default 5): ")
        .trim().parse().unwrap_or(5).max(1);
    let period_ms: u64 = read_line("  Sampling period in ms (default 10): ")
        .trim().parse().unwrap_or(10).max(1);
    let floor: f64 = read_line("  Impulse floor in g (default 2.0): ")
        .trim().parse().unwrap_or(DEFAULT_IMPULSE_FLOOR);
    let spike_g: f64 = read_line("  Synthetic spike in g (default 9.0): ")
        .trim().parse().unwrap_or(9.0);

    let cfg = SamplerConfig {
        window_len,
        period: Duration::from_millis(period_ms),
        impulse_floor: floor,
    };
    let sensor = PulseSensor {
        cycle: 0,
        quiet_cycles: (1000 / period_ms.max(1)) as u32, // ~one spike per second
        spike_g,
    };

    println!();
    println!("  window {} × {} ms, floor {:.1} g — Ctrl-C to quit", window_len, period_ms, floor);
    println!();

    let handle = Sampler::spawn(Box::new(sensor), cfg);
    let mut count = 0u64;
    loop {
        for magnitude in handle.drain_impulses() {
            count += 1;
            println!("  impulse #{:<4} {:+7.2} g", count, magnitude);
        }
        std::thread::sleep(Duration::from_millis(100));
    }
}

fn read_line(prompt: &str) -> String {
    print!("{}", prompt);
    io::stdout().flush().ok();
    let mut buf = String::new();
    io::stdin().read_line(&mut buf).ok();
    buf
}
