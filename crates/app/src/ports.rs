//! Port definitions — traits that adapters implement.
//!
//! Ports are the boundaries between the bridge core and the outside world.
//! They are defined here (in `app`) so that both the core and the adapter
//! layer can depend on them without creating circular dependencies.

pub mod bus;
pub mod output;
pub mod sensor;

pub use bus::{BusTransport, PresenceEvents, RemoteInterface, SignalListener};
pub use output::OutputDriver;
pub use sensor::SensorDriver;
