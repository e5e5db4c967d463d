//! # shake_kbd
//!
//! A USB keyboard made of pushbuttons and shakes. Buttons live on GPIO
//! pins of the local machine or of remote nodes (reached through their
//! `pigpiod` daemons); shakes are detected by an accelerometer through the
//! `impulse_stream` pipeline. Everything funnels into one scan loop that
//! writes HID boot-keyboard reports to a USB gadget device, so the host on
//! the other end of the OTG cable just sees key presses.
//!
//! ## Default keymap
//!
//! | Key | Source | Node | Input pin | Indicator pin |
//! |---|---|---|---|---|
//! | Right Arrow | button | localhost | 21 | 4 |
//! | Left Arrow | button | pizero-left.local | 12 | 4 |
//! | Up Arrow | button | pi3-updown.local | 12 | 4 |
//! | Down Arrow | button | pi3-updown.local | 21 | 17 |
//! | Space | shake > 2 g | local accelerometer | — | — |
//!
//! A node that cannot be reached at startup just leaves its keys out of
//! the scan; the controller keeps running with whatever is available.
//!
//! ## Feature flags
//!
//! * (default) — **Simulation mode**: the shake key runs against a
//!   zero-reading sensor and never fires; buttons still work wherever a
//!   `pigpiod` is reachable.
//! * `hw` — read a real MPU-6050 on the local I2C bus.

pub mod app;
pub mod gpio;
pub mod keys;

#[cfg(feature = "hw")]
pub mod sensor;
