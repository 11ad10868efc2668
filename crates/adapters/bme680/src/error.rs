//! BME680 adapter error types.

use hwbridge_domain::error::{BridgeError, DriverError};

use crate::bus::BusError;

/// Errors specific to the BME680 adapter.
#[derive(Debug, thiserror::Error)]
pub enum Bme680Error {
    /// The I2C device node could not be opened.
    #[error("failed to open {path} at address {address:#04x}")]
    Open {
        path: String,
        address: u16,
        #[source]
        source: BusError,
    },

    #[error("failed to write register {register:#04x}")]
    Write {
        register: u8,
        #[source]
        source: BusError,
    },

    #[error("failed to read register {register:#04x}")]
    Read {
        register: u8,
        #[source]
        source: BusError,
    },

    /// The data block was too short to decode.
    #[error("data block too short: {len} bytes")]
    ShortBlock { len: usize },

    /// The blocking task running the bus access panicked or was cancelled.
    #[error("register access task failed")]
    Join(#[from] tokio::task::JoinError),
}

impl Bme680Error {
    /// Convert into a [`DriverError::Sensor`] for the sensor called `sensor`.
    #[must_use]
    pub fn into_domain(self, sensor: &str) -> BridgeError {
        DriverError::Sensor {
            sensor: sensor.to_string(),
            source: Box::new(self),
        }
        .into()
    }
}
