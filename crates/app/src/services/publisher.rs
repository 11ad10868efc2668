//! Measurement publisher — forwards measurements to the control service.
//!
//! Publishing is fire-and-forget: when no handle is active the measurement
//! is dropped, never queued.

use hwbridge_domain::measurement::Measurement;

use crate::ports::RemoteInterface;
use crate::subscription::HandleView;

/// What happened to one measurement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishOutcome {
    /// The remote call succeeded.
    Sent,
    /// No handle was active; nothing was sent.
    Skipped,
    /// The remote call failed.
    Failed,
}

/// Sends measurements through whichever handle the subscription manager
/// currently holds.
pub struct MeasurementPublisher<I> {
    handle: HandleView<I>,
    method: String,
}

impl<I: RemoteInterface> MeasurementPublisher<I> {
    /// Create a publisher calling `method` on the handle observed by `handle`.
    pub fn new(handle: HandleView<I>, method: impl Into<String>) -> Self {
        Self {
            handle,
            method: method.into(),
        }
    }

    pub async fn publish(&self, measurement: &Measurement) -> PublishOutcome {
        let Some(remote) = self.handle.current() else {
            tracing::debug!(
                variable = %measurement.variable,
                "control service unreachable, measurement dropped"
            );
            return PublishOutcome::Skipped;
        };

        match remote.invoke(&self.method, measurement.to_payload()).await {
            Ok(()) => {
                tracing::trace!(
                    variable = %measurement.variable,
                    value = %measurement.value,
                    "measurement published"
                );
                PublishOutcome::Sent
            }
            Err(err) => {
                tracing::warn!(
                    %err,
                    variable = %measurement.variable,
                    method = %self.method,
                    "failed to publish measurement"
                );
                PublishOutcome::Failed
            }
        }
    }
}

impl<I> Clone for MeasurementPublisher<I> {
    fn clone(&self) -> Self {
        Self {
            handle: self.handle.clone(),
            method: self.method.clone(),
        }
    }
}
