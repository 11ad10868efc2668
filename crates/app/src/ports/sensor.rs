//! Sensor port — a source of periodic scalar readings.

use std::future::Future;

use hwbridge_domain::error::BridgeError;
use hwbridge_domain::measurement::Reading;

/// A sensor the poller reads on every tick.
pub trait SensorDriver: Send + 'static {
    /// Human-readable name used in logs.
    fn name(&self) -> &str;

    /// Prepare the hardware. Called once before the first read.
    fn init(&mut self) -> impl Future<Output = Result<(), BridgeError>> + Send;

    /// Take one set of readings.
    fn read(&mut self) -> impl Future<Output = Result<Vec<Reading>, BridgeError>> + Send;
}
