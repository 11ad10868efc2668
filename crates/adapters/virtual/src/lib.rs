//! # hwbridge-adapter-virtual
//!
//! Virtual/demo adapters that stand in for the hardware and the message bus,
//! for running the bridge on a development machine and for end-to-end tests.
//!
//! ## Provided adapters
//!
//! | Adapter | Port | Behaviour |
//! |---------|------|-----------|
//! | [`VirtualBus`] | `BusTransport` | Services started/stopped on demand, presence events, listener accounting |
//! | [`VirtualOutputs`] | `OutputDriver` | Records every channel change |
//! | [`VirtualSensor`] | `SensorDriver` | Returns the same readings on every poll |
//!
//! ## Dependency rule
//!
//! Depends on `hwbridge-app` (port traits) and `hwbridge-domain` only.

mod bus;
mod outputs;
mod sensor;

pub use bus::{VirtualBus, VirtualInterface};
pub use outputs::VirtualOutputs;
pub use sensor::VirtualSensor;
