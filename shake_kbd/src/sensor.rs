//! MPU-6050 accelerometer on the local I2C bus.
//!
//! Only compiled with the `hw` feature. Register ritual: wake the part out
//! of its power-on sleep, select the ±16 g range, then burst-read the six
//! acceleration bytes per sample.

use impulse_stream::{AccelSample, Sensor, SensorError};
use rppal::i2c::I2c;

const I2C_ADDR: u16 = 0x68;

const REG_PWR_MGMT_1: u8 = 0x6B;
const REG_ACCEL_CONFIG: u8 = 0x1C;
const REG_ACCEL_XOUT_H: u8 = 0x3B; // AX_H .. AZ_L, big-endian words

/// AFS_SEL = 3 → ±16 g full scale (2048 LSB per g).
const ACCEL_RANGE_16G: u8 = 0b0001_1000;

pub struct Mpu6050 {
    i2c: I2c,
}

impl Mpu6050 {
    /// Open the default I2C bus and bring the part up.
    pub fn open() -> Result<Self, SensorError> {
        let mut i2c = I2c::new().map_err(bus_err)?;
        i2c.set_slave_address(I2C_ADDR).map_err(bus_err)?;

        let mut dev = Mpu6050 { i2c };
        dev.write_reg(REG_PWR_MGMT_1, 0x00)?; // the 6050 powers up asleep
        dev.write_reg(REG_ACCEL_CONFIG, ACCEL_RANGE_16G)?;
        Ok(dev)
    }

    fn write_reg(&mut self, reg: u8, value: u8) -> Result<(), SensorError> {
        self.i2c.write(&[reg, value]).map(|_| ()).map_err(bus_err)
    }
}

fn bus_err(e: rppal::i2c::Error) -> SensorError {
    SensorError::Bus(e.to_string())
}

impl Sensor for Mpu6050 {
    fn read_sample(&mut self) -> Result<AccelSample, SensorError> {
        let mut raw = [0u8; 6];
        self.i2c
            .write_read(&[REG_ACCEL_XOUT_H], &mut raw)
            .map_err(bus_err)?;

        // Two's-complement big-endian words, scaled to g at ±16 g range.
        let axis = |hi: u8, lo: u8| i16::from_be_bytes([hi, lo]) as f64 / 16384.0 * 8.0;
        Ok(AccelSample::new(
            axis(raw[0], raw[1]),
            axis(raw[2], raw[3]),
            axis(raw[4], raw[5]),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scaling_matches_16g_range() {
        // 2048 LSB per g at AFS_SEL = 3.
        let axis = |hi: u8, lo: u8| i16::from_be_bytes([hi, lo]) as f64 / 16384.0 * 8.0;
        assert_eq!(axis(0x08, 0x00), 1.0); // 2048 raw = 1 g
        assert_eq!(axis(0xF8, 0x00), -1.0); // -2048 raw = -1 g
    }
}
