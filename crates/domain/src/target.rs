//! Coordinates of the remote control service on the bus.

use serde::Deserialize;

/// Where the control service lives and which members the bridge uses.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ServiceTarget {
    /// Well-known bus name of the service.
    pub service_name: String,
    /// Object path exporting the interface.
    pub object_path: String,
    /// Interface name.
    pub interface: String,
    /// Signal carrying actuator commands.
    pub signal: String,
    /// Method receiving measurements.
    pub measurement_method: String,
}

impl Default for ServiceTarget {
    fn default() -> Self {
        Self {
            service_name: "io.freya.Core".to_string(),
            object_path: "/io/freya/Core".to_string(),
            interface: "io.freya.Core".to_string(),
            signal: "updateActuator".to_string(),
            measurement_method: "setMeasurement".to_string(),
        }
    }
}

/// Opaque reference to a service found on the bus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceRef {
    /// Well-known name used for the lookup.
    pub name: String,
    /// Unique connection name currently owning `name`.
    pub owner: String,
}
