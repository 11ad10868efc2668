//! BME680 data block decoding.
//!
//! Raw values are 20-bit (pressure, temperature) or 16-bit (humidity)
//! big-endian fields at the start of the data block, scaled linearly
//! without the chip's calibration coefficients.

use hwbridge_domain::measurement::Reading;

use crate::error::Bme680Error;

/// Humidity control register.
pub const REG_CTRL_HUM: u8 = 0x72;
/// Temperature/pressure oversampling and mode register.
pub const REG_CTRL_MEAS: u8 = 0x74;
/// Filter and standby configuration register.
pub const REG_CONFIG: u8 = 0x75;
/// First register of the measurement data block.
pub const REG_DATA: u8 = 0x1F;
/// Length of the data block read on every poll.
pub const DATA_LEN: u8 = 15;

/// One decoded sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    /// Degrees Celsius.
    pub temperature: f64,
    /// Relative humidity, percent.
    pub humidity: f64,
    /// Hectopascal.
    pub pressure: f64,
}

impl Sample {
    #[must_use]
    pub fn into_readings(self) -> Vec<Reading> {
        vec![
            Reading::new("temperature", self.temperature),
            Reading::new("humidity", self.humidity),
            Reading::new("pressure", self.pressure),
        ]
    }
}

fn raw20(msb: u8, lsb: u8, xlsb: u8) -> u32 {
    (u32::from(msb) << 12) | (u32::from(lsb) << 4) | (u32::from(xlsb) >> 4)
}

/// Decode the first eight bytes of a data block.
///
/// # Errors
///
/// Returns [`Bme680Error::ShortBlock`] when fewer than eight bytes were read.
pub fn decode(data: &[u8]) -> Result<Sample, Bme680Error> {
    let &[p0, p1, p2, t0, t1, t2, h0, h1, ..] = data else {
        return Err(Bme680Error::ShortBlock { len: data.len() });
    };

    Ok(Sample {
        temperature: f64::from(raw20(t0, t1, t2)) / 100.0,
        humidity: f64::from(u16::from_be_bytes([h0, h1])) / 1024.0,
        pressure: f64::from(raw20(p0, p1, p2)) / 100.0,
    })
}
