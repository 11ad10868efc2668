//! Sensor poller — reads every sensor on a fixed period and publishes the
//! results.
//!
//! A sensor whose initialisation fails is excluded for the lifetime of the
//! poller. A failed read only costs that sensor's readings for the current
//! tick.

use std::time::Duration;

use tokio::time::MissedTickBehavior;

use hwbridge_domain::measurement::Measurement;

use crate::ports::{RemoteInterface, SensorDriver};
use crate::services::publisher::{MeasurementPublisher, PublishOutcome};

/// Counters for one polling tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PollSummary {
    pub sent: usize,
    pub skipped: usize,
    pub failed_publishes: usize,
    pub failed_reads: usize,
    pub invalid_readings: usize,
}

/// Periodic reader of a set of sensors.
pub struct SensorPoller<S, I> {
    sources: Vec<S>,
    publisher: MeasurementPublisher<I>,
    interval: Duration,
}

impl<S, I> SensorPoller<S, I>
where
    S: SensorDriver,
    I: RemoteInterface,
{
    pub fn new(sources: Vec<S>, publisher: MeasurementPublisher<I>, interval: Duration) -> Self {
        Self {
            sources,
            publisher,
            interval,
        }
    }

    /// Number of sensors currently polled.
    #[must_use]
    pub fn source_count(&self) -> usize {
        self.sources.len()
    }

    /// Initialise every sensor, keeping only those that succeed.
    pub async fn init_sources(&mut self) {
        let mut ready = Vec::with_capacity(self.sources.len());
        for mut source in std::mem::take(&mut self.sources) {
            match source.init().await {
                Ok(()) => {
                    tracing::info!(sensor = source.name(), "sensor initialised");
                    ready.push(source);
                }
                Err(err) => {
                    tracing::warn!(
                        %err,
                        sensor = source.name(),
                        "sensor initialisation failed, excluding it from polling"
                    );
                }
            }
        }
        self.sources = ready;
    }

    /// Read every sensor once and publish what was read.
    pub async fn poll_once(&mut self) -> PollSummary {
        let mut summary = PollSummary::default();

        for source in &mut self.sources {
            let readings = match source.read().await {
                Ok(readings) => readings,
                Err(err) => {
                    tracing::warn!(%err, sensor = source.name(), "sensor read failed");
                    summary.failed_reads += 1;
                    continue;
                }
            };

            for reading in &readings {
                let Some(measurement) = Measurement::from_reading(reading) else {
                    tracing::warn!(
                        variable = %reading.variable,
                        value = reading.value,
                        "discarding non-finite reading"
                    );
                    summary.invalid_readings += 1;
                    continue;
                };
                match self.publisher.publish(&measurement).await {
                    PublishOutcome::Sent => summary.sent += 1,
                    PublishOutcome::Skipped => summary.skipped += 1,
                    PublishOutcome::Failed => summary.failed_publishes += 1,
                }
            }
        }

        summary
    }

    /// Initialise the sensors, then poll them forever.
    pub async fn run(mut self) {
        self.init_sources().await;
        if self.sources.is_empty() {
            tracing::warn!("no sensor available, polling disabled");
            return;
        }

        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            let summary = self.poll_once().await;
            tracing::debug!(?summary, "sensor poll complete");
        }
    }
}
