//! Client for the pigpio daemon's TCP socket interface.
//!
//! Every GPIO operation — local node or remote — goes through a `pigpiod`
//! daemon, so a button on another machine is just a connection to another
//! hostname. The wire format is the daemon's documented one: 16-byte
//! little-endian frames of four `u32` words (`cmd`, `p1`, `p2`, `p3`), with
//! the reply echoing the frame and carrying the signed result in the last
//! word.

use std::io::{self, Read, Write};
use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;

use thiserror::Error;

/// Default listening port of `pigpiod`.
pub const PIGPIOD_PORT: u16 = 8888;

// ── command numbers (pigpiod socket interface) ──────────────────────────────
const CMD_MODES: u32 = 0;
const CMD_PUD:   u32 = 2;
const CMD_READ:  u32 = 3;
const CMD_PWM:   u32 = 5;

const MODE_INPUT: u32 = 0;
const PUD_UP:     u32 = 2;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(3);
const IO_TIMEOUT: Duration = Duration::from_secs(2);

// ════════════════════════════════════════════════════════════════════════════
// GpioError
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Error)]
pub enum GpioError {
    /// The daemon was unreachable at connect time.
    #[error("cannot reach pigpiod on {node}: {source}")]
    Connect {
        node: String,
        #[source]
        source: io::Error,
    },

    /// A transfer on an established connection failed.
    #[error("pigpiod transfer failed: {0}")]
    Io(#[from] io::Error),

    /// The daemon answered with a negative status.
    #[error("pigpiod rejected command {cmd} (status {status})")]
    Rejected { cmd: u32, status: i32 },
}

// ════════════════════════════════════════════════════════════════════════════
// Frame encoding
// ════════════════════════════════════════════════════════════════════════════

fn encode_command(cmd: u32, p1: u32, p2: u32) -> [u8; 16] {
    let mut frame = [0u8; 16];
    frame[0..4].copy_from_slice(&cmd.to_le_bytes());
    frame[4..8].copy_from_slice(&p1.to_le_bytes());
    frame[8..12].copy_from_slice(&p2.to_le_bytes());
    // p3 stays 0; none of the commands we issue carry extension data.
    frame
}

fn decode_status(reply: &[u8; 16]) -> i32 {
    i32::from_le_bytes([reply[12], reply[13], reply[14], reply[15]])
}

// ════════════════════════════════════════════════════════════════════════════
// GpioLink
// ════════════════════════════════════════════════════════════════════════════

/// One connection to a `pigpiod` daemon, local or remote.
#[derive(Debug)]
pub struct GpioLink {
    stream: TcpStream,
    node: String,
}

impl GpioLink {
    /// Connect to the daemon on `node` at the standard port.
    pub fn connect(node: &str) -> Result<Self, GpioError> {
        Self::connect_with_port(node, PIGPIOD_PORT)
    }

    pub fn connect_with_port(node: &str, port: u16) -> Result<Self, GpioError> {
        let wrap = |source| GpioError::Connect { node: node.to_string(), source };

        let addr = (node, port)
            .to_socket_addrs()
            .map_err(wrap)?
            .next()
            .ok_or_else(|| {
                wrap(io::Error::new(io::ErrorKind::NotFound, "hostname did not resolve"))
            })?;

        let stream = TcpStream::connect_timeout(&addr, CONNECT_TIMEOUT).map_err(wrap)?;
        stream.set_read_timeout(Some(IO_TIMEOUT))?;
        stream.set_write_timeout(Some(IO_TIMEOUT))?;

        Ok(GpioLink { stream, node: node.to_string() })
    }

    pub fn node(&self) -> &str {
        &self.node
    }

    fn command(&mut self, cmd: u32, p1: u32, p2: u32) -> Result<i32, GpioError> {
        self.stream.write_all(&encode_command(cmd, p1, p2))?;

        let mut reply = [0u8; 16];
        self.stream.read_exact(&mut reply)?;

        let status = decode_status(&reply);
        if status < 0 {
            return Err(GpioError::Rejected { cmd, status });
        }
        Ok(status)
    }

    /// Configure `pin` as an input with the internal pull-up enabled
    /// (buttons short the pin to ground, so idle reads high).
    pub fn setup_button_pin(&mut self, pin: u8) -> Result<(), GpioError> {
        self.command(CMD_MODES, pin as u32, MODE_INPUT)?;
        self.command(CMD_PUD, pin as u32, PUD_UP)?;
        Ok(())
    }

    /// Current level of `pin`: `true` = high.
    pub fn read_pin(&mut self, pin: u8) -> Result<bool, GpioError> {
        Ok(self.command(CMD_READ, pin as u32, 0)? != 0)
    }

    /// Set the PWM duty cycle on `pin`, 0–255. The daemon switches the pin
    /// to output mode on first use.
    pub fn set_pwm_duty(&mut self, pin: u8, duty: u8) -> Result<(), GpioError> {
        self.command(CMD_PWM, pin as u32, duty as u32)?;
        Ok(())
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Test support — a scripted stand-in for pigpiod
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::collections::VecDeque;
    use std::net::TcpListener;
    use std::thread::{self, JoinHandle};

    /// A fake daemon: answers every command with status 0, except READ,
    /// which pops levels from the script (defaulting to high — button not
    /// pressed — once the script runs out).
    ///
    /// Serves one client; the join handle yields every `(cmd, p1, p2)`
    /// received, in order, once the client disconnects.
    pub(crate) fn spawn_fake_daemon(
        read_levels: Vec<u32>,
    ) -> (u16, JoinHandle<Vec<(u32, u32, u32)>>) {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind fake daemon");
        let port = listener.local_addr().unwrap().port();

        let handle = thread::spawn(move || {
            let mut levels: VecDeque<u32> = read_levels.into();
            let mut seen = Vec::new();
            let (mut stream, _) = listener.accept().expect("accept client");

            let mut frame = [0u8; 16];
            while stream.read_exact(&mut frame).is_ok() {
                let cmd = u32::from_le_bytes([frame[0], frame[1], frame[2], frame[3]]);
                let p1 = u32::from_le_bytes([frame[4], frame[5], frame[6], frame[7]]);
                let p2 = u32::from_le_bytes([frame[8], frame[9], frame[10], frame[11]]);
                seen.push((cmd, p1, p2));

                let status: u32 = if cmd == CMD_READ {
                    levels.pop_front().unwrap_or(1)
                } else {
                    0
                };
                frame[12..16].copy_from_slice(&status.to_le_bytes());
                stream.write_all(&frame).expect("reply");
            }
            seen
        });

        (port, handle)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::testing::spawn_fake_daemon;
    use super::*;

    #[test]
    fn command_frame_is_little_endian_words() {
        let frame = encode_command(CMD_PWM, 17, 255);
        assert_eq!(&frame[0..4], &[5, 0, 0, 0]);
        assert_eq!(&frame[4..8], &[17, 0, 0, 0]);
        assert_eq!(&frame[8..12], &[255, 0, 0, 0]);
        assert_eq!(&frame[12..16], &[0, 0, 0, 0]);
    }

    #[test]
    fn status_is_signed() {
        let mut reply = [0u8; 16];
        reply[12..16].copy_from_slice(&(-42i32).to_le_bytes());
        assert_eq!(decode_status(&reply), -42);
    }

    #[test]
    fn connect_failure_is_an_init_error() {
        // Port 1 on localhost is not listening.
        let err = GpioLink::connect_with_port("127.0.0.1", 1).unwrap_err();
        assert!(matches!(err, GpioError::Connect { .. }));
    }

    #[test]
    fn button_setup_sends_mode_then_pull_up() {
        let (port, daemon) = spawn_fake_daemon(vec![]);
        {
            let mut link = GpioLink::connect_with_port("127.0.0.1", port).unwrap();
            link.setup_button_pin(21).unwrap();
        }
        let seen = daemon.join().unwrap();
        assert_eq!(seen, vec![(CMD_MODES, 21, MODE_INPUT), (CMD_PUD, 21, PUD_UP)]);
    }

    #[test]
    fn read_pin_maps_levels() {
        let (port, daemon) = spawn_fake_daemon(vec![0, 1]);
        {
            let mut link = GpioLink::connect_with_port("127.0.0.1", port).unwrap();
            assert_eq!(link.read_pin(21).unwrap(), false);
            assert_eq!(link.read_pin(21).unwrap(), true);
        }
        daemon.join().unwrap();
    }

    #[test]
    fn pwm_duty_goes_out_verbatim() {
        let (port, daemon) = spawn_fake_daemon(vec![]);
        {
            let mut link = GpioLink::connect_with_port("127.0.0.1", port).unwrap();
            link.set_pwm_duty(4, 128).unwrap();
        }
        let seen = daemon.join().unwrap();
        assert_eq!(seen, vec![(CMD_PWM, 4, 128)]);
    }
}
