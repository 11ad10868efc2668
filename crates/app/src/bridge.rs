//! Bridge — wires the services together and runs them as two tasks.
//!
//! The subscription task owns the [`SubscriptionManager`] and therefore the
//! remote service handle. The polling task owns the sensors and reads the
//! handle through a [`HandleView`](crate::subscription::HandleView).

use std::time::Duration;

use tokio::task::JoinHandle;

use hwbridge_domain::channel::OutputChannelMap;
use hwbridge_domain::target::ServiceTarget;

use crate::ports::{BusTransport, OutputDriver, SensorDriver};
use crate::services::command_router::CommandRouter;
use crate::services::output_controller::OutputController;
use crate::services::publisher::MeasurementPublisher;
use crate::services::sensor_poller::SensorPoller;
use crate::subscription::SubscriptionManager;

/// Runtime parameters of the bridge.
#[derive(Debug, Clone)]
pub struct BridgeSettings {
    pub target: ServiceTarget,
    pub channels: OutputChannelMap,
    pub poll_interval: Duration,
    /// Delay before retrying a failed subscription; `None` waits for the
    /// next presence event instead.
    pub resubscribe_retry: Option<Duration>,
}

impl Default for BridgeSettings {
    fn default() -> Self {
        Self {
            target: ServiceTarget::default(),
            channels: OutputChannelMap::default(),
            poll_interval: Duration::from_secs(5),
            resubscribe_retry: None,
        }
    }
}

/// Handles on the running bridge tasks.
pub struct Bridge {
    subscription: JoinHandle<()>,
    poller: JoinHandle<()>,
}

impl Bridge {
    /// Start watching presence, subscribe, and begin polling `sensors`.
    ///
    /// Presence monitoring is set up before the first subscription attempt
    /// so that a service starting in between is not missed. If it cannot be
    /// set up, the bridge still runs with whatever the first attempt yields.
    pub async fn start<T, O, S>(
        transport: T,
        outputs: O,
        sensors: Vec<S>,
        settings: BridgeSettings,
    ) -> Self
    where
        T: BusTransport,
        O: OutputDriver,
        S: SensorDriver,
    {
        let presence = match transport.watch_presence().await {
            Ok(events) => Some(events),
            Err(err) => {
                tracing::error!(
                    %err,
                    "unable to watch service presence, restarts will not be detected"
                );
                None
            }
        };

        let router = CommandRouter::new(OutputController::new(outputs, settings.channels));
        let method = settings.target.measurement_method.clone();
        let manager = SubscriptionManager::new(transport, settings.target, router)
            .with_retry(settings.resubscribe_retry);
        let publisher = MeasurementPublisher::new(manager.handle_view(), method);
        let poller = SensorPoller::new(sensors, publisher, settings.poll_interval);

        tracing::info!(
            sensors = poller.source_count(),
            interval = ?settings.poll_interval,
            "starting bridge"
        );

        Self {
            subscription: tokio::spawn(manager.run(presence)),
            poller: tokio::spawn(poller.run()),
        }
    }

    /// Whether the subscription task is still alive.
    #[must_use]
    pub fn is_running(&self) -> bool {
        !self.subscription.is_finished()
    }

    /// Stop both tasks.
    pub async fn shutdown(self) {
        self.subscription.abort();
        self.poller.abort();
        let _ = self.subscription.await;
        let _ = self.poller.await;
        tracing::info!("bridge stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeBus, RecordingOutputs, ScriptedSensor};
    use hwbridge_domain::channel::ChannelId;
    use hwbridge_domain::measurement::Reading;
    use hwbridge_domain::presence::ServicePresenceEvent;

    #[tokio::test(start_paused = true)]
    async fn should_route_commands_and_publish_measurements() {
        let bus = FakeBus::present();
        let outputs = RecordingOutputs::default();
        let sensor = ScriptedSensor::new("bme680")
            .then_read(vec![Reading::new("temperature", 21.25)])
            .then_read(vec![Reading::new("temperature", 21.25)]);

        let bridge = Bridge::start(
            bus.clone(),
            outputs.clone(),
            vec![sensor],
            BridgeSettings::default(),
        )
        .await;
        tokio::time::sleep(Duration::from_millis(10)).await;

        bus.broadcast("updateActuator", r#"{"actuator":"rain","value":"on"}"#);
        tokio::time::sleep(Duration::from_secs(6)).await;

        assert!(bridge.is_running());
        assert_eq!(outputs.applied(), vec![(ChannelId::from("16"), true)]);
        let calls = bus.interfaces().remove(0).calls();
        assert!(!calls.is_empty());
        for (method, payload) in calls {
            assert_eq!(method, "setMeasurement");
            let json: serde_json::Value = serde_json::from_str(&payload).unwrap();
            assert_eq!(
                json,
                serde_json::json!({"variable": "temperature", "value": "21.3"})
            );
        }

        bridge.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn should_subscribe_once_service_appears() {
        let bus = FakeBus::default();
        let outputs = RecordingOutputs::default();
        let bridge = Bridge::start(
            bus.clone(),
            outputs.clone(),
            Vec::<ScriptedSensor>::new(),
            BridgeSettings::default(),
        )
        .await;
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(bus.listener_total("updateActuator"), 0);

        bus.set_present(true);
        bus.announce(ServicePresenceEvent::appeared("io.freya.Core", ":1.7"));
        tokio::time::sleep(Duration::from_millis(10)).await;

        assert_eq!(bus.listener_total("updateActuator"), 1);
        bridge.shutdown().await;
    }
}
