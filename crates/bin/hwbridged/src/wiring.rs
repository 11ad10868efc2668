//! Adapter selection — turns configuration into concrete port implementations.

use hwbridge_adapter_bme680::{Bme680, LinuxI2cBus};
use hwbridge_adapter_pinctrl::PinctrlDriver;
use hwbridge_adapter_virtual::{VirtualOutputs, VirtualSensor};
use hwbridge_app::ports::{OutputDriver, SensorDriver};
use hwbridge_domain::channel::ChannelId;
use hwbridge_domain::error::BridgeError;
use hwbridge_domain::measurement::Reading;

use crate::config::{OutputDriverKind, OutputsConfig, SensorsConfig};

/// The output driver selected by configuration.
pub enum ConfiguredOutputs {
    Pinctrl(PinctrlDriver),
    Virtual(VirtualOutputs),
}

impl OutputDriver for ConfiguredOutputs {
    async fn set_channel(&self, channel: &ChannelId, active: bool) -> Result<(), BridgeError> {
        match self {
            Self::Pinctrl(driver) => driver.set_channel(channel, active).await,
            Self::Virtual(driver) => driver.set_channel(channel, active).await,
        }
    }
}

/// A sensor selected by configuration.
pub enum ConfiguredSensor {
    Bme680(Bme680<LinuxI2cBus>),
    Virtual(VirtualSensor),
}

impl SensorDriver for ConfiguredSensor {
    fn name(&self) -> &str {
        match self {
            Self::Bme680(sensor) => sensor.name(),
            Self::Virtual(sensor) => sensor.name(),
        }
    }

    async fn init(&mut self) -> Result<(), BridgeError> {
        match self {
            Self::Bme680(sensor) => sensor.init().await,
            Self::Virtual(sensor) => sensor.init().await,
        }
    }

    async fn read(&mut self) -> Result<Vec<Reading>, BridgeError> {
        match self {
            Self::Bme680(sensor) => sensor.read().await,
            Self::Virtual(sensor) => sensor.read().await,
        }
    }
}

#[must_use]
pub fn outputs(config: &OutputsConfig) -> ConfiguredOutputs {
    match config.driver {
        OutputDriverKind::Pinctrl => {
            ConfiguredOutputs::Pinctrl(PinctrlDriver::new(config.pinctrl_program.clone()))
        }
        OutputDriverKind::Virtual => ConfiguredOutputs::Virtual(VirtualOutputs::new()),
    }
}

/// Open every configured sensor. Devices that cannot be opened are logged
/// and left out.
#[must_use]
pub fn sensors(config: &SensorsConfig) -> Vec<ConfiguredSensor> {
    let mut sensors = Vec::new();

    for chip in &config.bme680 {
        let name = format!("bme680@{}:{:#04x}", chip.device, chip.address);
        match LinuxI2cBus::open(&chip.device, chip.address) {
            Ok(bus) => sensors.push(ConfiguredSensor::Bme680(Bme680::new(name, bus))),
            Err(err) => tracing::warn!(%err, sensor = %name, "skipping sensor"),
        }
    }

    if config.virtual_enabled {
        sensors.push(ConfiguredSensor::Virtual(VirtualSensor::default()));
    }

    sensors
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Bme680Config;

    #[test]
    fn should_select_virtual_outputs() {
        let config = OutputsConfig {
            driver: OutputDriverKind::Virtual,
            ..OutputsConfig::default()
        };
        assert!(matches!(outputs(&config), ConfiguredOutputs::Virtual(_)));
    }

    #[test]
    fn should_select_pinctrl_by_default() {
        assert!(matches!(
            outputs(&OutputsConfig::default()),
            ConfiguredOutputs::Pinctrl(_)
        ));
    }

    #[test]
    fn should_skip_sensor_whose_device_cannot_be_opened() {
        let config = SensorsConfig {
            bme680: vec![Bme680Config {
                device: "/nonexistent/i2c-9".to_string(),
                address: 0x77,
            }],
            virtual_enabled: true,
            ..SensorsConfig::default()
        };

        let sensors = sensors(&config);

        assert_eq!(sensors.len(), 1);
        assert_eq!(sensors[0].name(), "virtual");
    }

    #[tokio::test]
    async fn should_forward_to_selected_output_driver() {
        let recorder = VirtualOutputs::new();
        let outputs = ConfiguredOutputs::Virtual(recorder.clone());

        outputs
            .set_channel(&ChannelId::from("21"), true)
            .await
            .unwrap();

        assert_eq!(recorder.history(), vec![(ChannelId::from("21"), true)]);
    }
}
