//! Output controller — applies actuator commands to physical channels.

use hwbridge_domain::actuator::ActuatorCommand;
use hwbridge_domain::channel::OutputChannelMap;
use hwbridge_domain::error::{BridgeError, DriverError};

use crate::ports::OutputDriver;

/// Maps actuators to channels through a fixed table and drives them.
pub struct OutputController<O> {
    driver: O,
    channels: OutputChannelMap,
}

impl<O: OutputDriver> OutputController<O> {
    pub fn new(driver: O, channels: OutputChannelMap) -> Self {
        Self { driver, channels }
    }

    /// Apply one command: exactly one driver call for a wired actuator.
    ///
    /// Failures are logged here and returned for the caller's bookkeeping;
    /// nothing is retried.
    ///
    /// # Errors
    ///
    /// Returns [`DriverError::UnmappedActuator`] when the actuator has no
    /// channel, or the driver's error when setting the channel fails.
    pub async fn apply(&self, command: &ActuatorCommand) -> Result<(), BridgeError> {
        let Some(channel) = self.channels.channel_for(command.actuator) else {
            let err = DriverError::UnmappedActuator(command.actuator);
            tracing::warn!(%err, value = %command.value, "actuator command not applied");
            return Err(err.into());
        };

        let active = command.value.is_active();
        if let Err(err) = self.driver.set_channel(channel, active).await {
            tracing::warn!(
                %err,
                actuator = %command.actuator,
                %channel,
                active,
                "failed to set output channel"
            );
            return Err(err);
        }

        tracing::info!(actuator = %command.actuator, %channel, active, "output applied");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::RecordingOutputs;
    use hwbridge_domain::actuator::{Actuator, OutputValue};
    use hwbridge_domain::channel::ChannelId;

    #[tokio::test]
    async fn should_drive_heater_channel_active_high() {
        let outputs = RecordingOutputs::default();
        let controller = OutputController::new(outputs.clone(), OutputChannelMap::default());

        controller
            .apply(&ActuatorCommand::new(Actuator::Heater, OutputValue::On))
            .await
            .unwrap();

        assert_eq!(outputs.applied(), vec![(ChannelId::from("20"), true)]);
    }

    #[tokio::test]
    async fn should_drive_channel_inactive_for_off() {
        let outputs = RecordingOutputs::default();
        let controller = OutputController::new(outputs.clone(), OutputChannelMap::default());

        controller
            .apply(&ActuatorCommand::new(Actuator::Lights, OutputValue::Off))
            .await
            .unwrap();

        assert_eq!(outputs.applied(), vec![(ChannelId::from("21"), false)]);
    }

    #[tokio::test]
    async fn should_report_unmapped_actuator_without_driver_call() {
        let outputs = RecordingOutputs::default();
        let controller = OutputController::new(outputs.clone(), OutputChannelMap::default());

        let result = controller
            .apply(&ActuatorCommand::new(Actuator::Translights, OutputValue::On))
            .await;

        assert!(matches!(
            result,
            Err(BridgeError::Driver(DriverError::UnmappedActuator(
                Actuator::Translights
            )))
        ));
        assert!(outputs.applied().is_empty());
    }

    #[tokio::test]
    async fn should_return_driver_failure_after_single_attempt() {
        let outputs = RecordingOutputs::failing();
        let controller = OutputController::new(outputs.clone(), OutputChannelMap::default());

        let result = controller
            .apply(&ActuatorCommand::new(Actuator::Rain, OutputValue::On))
            .await;

        assert!(matches!(result, Err(BridgeError::Driver(_))));
        assert_eq!(outputs.applied().len(), 1);
    }

    #[tokio::test]
    async fn should_use_custom_channel_table() {
        let outputs = RecordingOutputs::default();
        let channels: OutputChannelMap = [(Actuator::Translights, ChannelId::from("12"))]
            .into_iter()
            .collect();
        let controller = OutputController::new(outputs.clone(), channels);

        controller
            .apply(&ActuatorCommand::new(Actuator::Translights, OutputValue::On))
            .await
            .unwrap();

        assert_eq!(outputs.applied(), vec![(ChannelId::from("12"), true)]);
    }
}
