//! Common error types used across the workspace.
//!
//! Every failure in the bridge falls into one of three families, each
//! recovered locally by the component that hits it:
//!
//! - [`TransportError`] — the bus or the remote service is unreachable
//! - [`PayloadError`] — an inbound payload cannot be decoded
//! - [`DriverError`] — a sensor or output driver failed
//!
//! Adapters wrap their own error types into [`BridgeError`] via
//! `into_domain` / `From` so they can cross port boundaries.

use crate::actuator::Actuator;

/// Boxed error produced by an adapter.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Top-level error crossing port boundaries.
#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    #[error("transport error")]
    Transport(#[from] TransportError),

    #[error("payload error")]
    Payload(#[from] PayloadError),

    #[error("driver error")]
    Driver(#[from] DriverError),
}

/// Failures talking to the bus or the remote service.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// No process currently owns the requested bus name.
    #[error("service {service} not found on the bus")]
    ServiceNotFound { service: String },

    /// A name, path or member could not be used on this bus.
    #[error("invalid bus address {value:?}")]
    InvalidAddress { value: String },

    /// Any other failure reported by the bus implementation.
    #[error("bus failure")]
    Bus(#[source] BoxError),
}

/// Reasons an inbound actuator payload is rejected.
#[derive(Debug, thiserror::Error)]
pub enum PayloadError {
    #[error("payload is not valid JSON")]
    Malformed(#[source] serde_json::Error),

    #[error("payload is not a JSON object")]
    NotAnObject,

    #[error("payload is missing the {0:?} field")]
    MissingField(&'static str),

    #[error("payload field {0:?} must be a string")]
    InvalidField(&'static str),
}

/// Failures reported by sensor or output drivers.
#[derive(Debug, thiserror::Error)]
pub enum DriverError {
    /// The actuator has no physical channel in the output map.
    #[error("actuator {0} has no output channel")]
    UnmappedActuator(Actuator),

    #[error("sensor {sensor} failed")]
    Sensor {
        sensor: String,
        #[source]
        source: BoxError,
    },

    #[error("output channel {channel} failed")]
    Output {
        channel: String,
        #[source]
        source: BoxError,
    },
}
