//! Register-level access to an I2C peripheral.

use i2cdev::core::I2CDevice as _;
use i2cdev::linux::LinuxI2CDevice;

use crate::error::Bme680Error;

/// Error returned by a [`RegisterBus`] implementation.
pub type BusError = Box<dyn std::error::Error + Send + Sync>;

/// Blocking byte-register access to one device.
pub trait RegisterBus: Send + 'static {
    /// Write `value` into `register`.
    fn write_byte(&mut self, register: u8, value: u8) -> Result<(), BusError>;

    /// Read `len` consecutive bytes starting at `register`.
    fn read_block(&mut self, register: u8, len: u8) -> Result<Vec<u8>, BusError>;
}

/// A device on a Linux `/dev/i2c-*` character device.
pub struct LinuxI2cBus {
    device: LinuxI2CDevice,
}

impl LinuxI2cBus {
    /// Open `path` and bind to the slave at `address`.
    ///
    /// # Errors
    ///
    /// Returns [`Bme680Error::Open`] if the device node cannot be opened or
    /// the address cannot be selected.
    pub fn open(path: &str, address: u16) -> Result<Self, Bme680Error> {
        let device = LinuxI2CDevice::new(path, address).map_err(|source| Bme680Error::Open {
            path: path.to_string(),
            address,
            source: Box::new(source),
        })?;
        Ok(Self { device })
    }
}

impl RegisterBus for LinuxI2cBus {
    fn write_byte(&mut self, register: u8, value: u8) -> Result<(), BusError> {
        self.device
            .smbus_write_byte_data(register, value)
            .map_err(Into::into)
    }

    fn read_block(&mut self, register: u8, len: u8) -> Result<Vec<u8>, BusError> {
        self.device
            .smbus_read_i2c_block_data(register, len)
            .map_err(Into::into)
    }
}
