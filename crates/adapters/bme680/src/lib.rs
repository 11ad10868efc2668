//! # hwbridge-adapter-bme680
//!
//! BME680 environmental sensor adapter — reads temperature, humidity and
//! pressure over an I2C register bus.
//!
//! ## Register usage
//!
//! | Register | Name | Value written at init |
//! |----------|------|-----------------------|
//! | `0x72` | `ctrl_hum` | `0x01` (humidity oversampling x1) |
//! | `0x74` | `ctrl_meas` | `0x27` (temperature/pressure x1, forced mode) |
//! | `0x75` | `config` | `0x10` (filter) |
//! | `0x1F` | data block | read, 15 bytes |
//!
//! Register access is blocking and runs on the Tokio blocking pool.
//!
//! ## Dependency rule
//!
//! Same as other adapters: depends on `hwbridge-app` and `hwbridge-domain`.

mod bus;
mod error;
pub mod parser;

pub use bus::{BusError, LinuxI2cBus, RegisterBus};
pub use error::Bme680Error;

use std::sync::{Arc, Mutex, PoisonError};

use hwbridge_app::ports::SensorDriver;
use hwbridge_domain::error::BridgeError;
use hwbridge_domain::measurement::Reading;

use crate::parser::{DATA_LEN, REG_CONFIG, REG_CTRL_HUM, REG_CTRL_MEAS, REG_DATA};

/// One BME680 chip on a register bus.
pub struct Bme680<B> {
    name: String,
    bus: Arc<Mutex<B>>,
}

impl<B: RegisterBus> Bme680<B> {
    #[must_use]
    pub fn new(name: impl Into<String>, bus: B) -> Self {
        Self {
            name: name.into(),
            bus: Arc::new(Mutex::new(bus)),
        }
    }

    /// Run `op` against the bus on the blocking pool.
    async fn with_bus<T, F>(&self, op: F) -> Result<T, Bme680Error>
    where
        T: Send + 'static,
        F: FnOnce(&mut B) -> Result<T, Bme680Error> + Send + 'static,
    {
        let bus = Arc::clone(&self.bus);
        tokio::task::spawn_blocking(move || {
            let mut bus = bus.lock().unwrap_or_else(PoisonError::into_inner);
            op(&mut bus)
        })
        .await?
    }
}

impl<B: RegisterBus> SensorDriver for Bme680<B> {
    fn name(&self) -> &str {
        &self.name
    }

    async fn init(&mut self) -> Result<(), BridgeError> {
        self.with_bus(|bus| {
            let settings = [(REG_CTRL_HUM, 0x01), (REG_CTRL_MEAS, 0x27), (REG_CONFIG, 0x10)];
            for (register, value) in settings {
                bus.write_byte(register, value)
                    .map_err(|source| Bme680Error::Write { register, source })?;
            }
            Ok(())
        })
        .await
        .map_err(|err| err.into_domain(&self.name))?;

        tracing::debug!(sensor = %self.name, "BME680 configured");
        Ok(())
    }

    async fn read(&mut self) -> Result<Vec<Reading>, BridgeError> {
        let data = self
            .with_bus(|bus| {
                bus.read_block(REG_DATA, DATA_LEN)
                    .map_err(|source| Bme680Error::Read {
                        register: REG_DATA,
                        source,
                    })
            })
            .await
            .map_err(|err| err.into_domain(&self.name))?;

        let sample = parser::decode(&data).map_err(|err| err.into_domain(&self.name))?;
        tracing::trace!(
            sensor = %self.name,
            temperature = sample.temperature,
            humidity = sample.humidity,
            pressure = sample.pressure,
            "BME680 sample"
        );

        Ok(sample.into_readings())
    }
}
