//! Fixed-value sensor.

use hwbridge_app::ports::SensorDriver;
use hwbridge_domain::error::BridgeError;
use hwbridge_domain::measurement::Reading;

/// Sensor returning the same readings on every poll.
#[derive(Debug, Clone)]
pub struct VirtualSensor {
    name: String,
    readings: Vec<Reading>,
}

impl VirtualSensor {
    #[must_use]
    pub fn new(name: impl Into<String>, readings: Vec<Reading>) -> Self {
        Self {
            name: name.into(),
            readings,
        }
    }
}

impl Default for VirtualSensor {
    fn default() -> Self {
        Self::new(
            "virtual",
            vec![
                Reading::new("temperature", 21.5),
                Reading::new("humidity", 48.0),
                Reading::new("pressure", 1013.25),
            ],
        )
    }
}

impl SensorDriver for VirtualSensor {
    fn name(&self) -> &str {
        &self.name
    }

    async fn init(&mut self) -> Result<(), BridgeError> {
        Ok(())
    }

    async fn read(&mut self) -> Result<Vec<Reading>, BridgeError> {
        Ok(self.readings.clone())
    }
}
