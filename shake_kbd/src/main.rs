//! shake_kbd — controller entry point.

use shake_kbd::app::{run, AppConfig, KeyDef};
use std::io::{self, Write};
use std::path::PathBuf;
use std::time::Duration;

fn main() {
    println!();
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║        Shake Keyboard — GPIO & Motion Key Controller         ║");
    println!("╚══════════════════════════════════════════════════════════════╝");
    println!();

    #[cfg(feature = "hw")]
    println!("  Shake sensor: MPU-6050 on the local I2C bus");
    #[cfg(not(feature = "hw"))]
    println!("  Shake sensor: simulation  (use --features hw for hardware)");
    println!();

    let cfg = if std::env::args().any(|a| a == "--quick") {
        println!("  Quick-start: default keymap, /dev/hidg0, 100 ms scan\n");
        AppConfig::default()
    } else {
        configure_interactively()
    };

    run(cfg);
}

fn configure_interactively() -> AppConfig {
    let mut cfg = AppConfig::default();

    let sink = read_line("  HID gadget device (default /dev/hidg0): ");
    if !sink.trim().is_empty() {
        cfg.sink_path = PathBuf::from(sink.trim());
    }

    let scan_ms: u64 = read_line("  Scan period in ms (default 100): ")
        .trim().parse().unwrap_or(100);
    cfg.scan_period = Duration::from_millis(scan_ms.clamp(10, 1000));

    let threshold: f64 = read_line("  Shake trigger threshold in g (default 2.0): ")
        .trim().parse().unwrap_or(2.0);
    let window_len: usize = read_line("  Shake window in samples (default 5): ")
        .trim().parse::<usize>().unwrap_or(5).max(1);
    let sample_ms: u64 = read_line("  Shake sampling period in ms (default 10): ")
        .trim().parse::<u64>().unwrap_or(10).max(1);

    for def in &mut cfg.keymap {
        if let KeyDef::Motion { threshold: t, sampler, .. } = def {
            *t = threshold;
            sampler.window_len = window_len;
            sampler.period = Duration::from_millis(sample_ms);
        }
    }

    println!();
    cfg
}

fn read_line(prompt: &str) -> String {
    print!("{}", prompt);
    io::stdout().flush().ok();
    let mut buf = String::new();
    io::stdin().read_line(&mut buf).ok();
    buf
}
