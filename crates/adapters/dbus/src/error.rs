//! D-Bus adapter error types.

use hwbridge_domain::error::{BridgeError, TransportError};

/// Errors specific to the D-Bus adapter.
#[derive(Debug, thiserror::Error)]
pub enum DbusError {
    /// Could not open a connection to the message bus.
    #[error("failed to connect to the {bus} bus")]
    Connect {
        bus: &'static str,
        #[source]
        source: zbus::Error,
    },

    /// The requested name has no owner.
    #[error("name {0} has no owner on the bus")]
    NameNotOwned(String),

    /// A name, path or member is not valid D-Bus syntax.
    #[error("invalid D-Bus address {value:?}")]
    InvalidAddress {
        value: String,
        #[source]
        source: zbus::Error,
    },

    /// A signal argument did not decode as a single string.
    #[error("unexpected body for signal {signal}")]
    SignalBody {
        signal: String,
        #[source]
        source: zbus::Error,
    },

    /// Any other failure reported by zbus.
    #[error("D-Bus call failed")]
    Call(#[source] zbus::Error),
}

impl DbusError {
    /// Convert into a [`TransportError`] wrapped in a [`BridgeError`] for
    /// propagation across port boundaries.
    #[must_use]
    pub fn into_domain(self) -> BridgeError {
        match self {
            Self::NameNotOwned(service) => TransportError::ServiceNotFound { service }.into(),
            Self::InvalidAddress { value, .. } => TransportError::InvalidAddress { value }.into(),
            other => TransportError::Bus(Box::new(other)).into(),
        }
    }
}

impl From<DbusError> for BridgeError {
    fn from(err: DbusError) -> Self {
        err.into_domain()
    }
}
