//! # hwbridge-app
//!
//! Application layer — the bridge core and **port definitions** (traits).
//!
//! ## Responsibilities
//! - Define **port traits** that adapters must implement:
//!   - `BusTransport` / `RemoteInterface` — service lookup, signals, method calls, presence
//!   - `OutputDriver` — switch a physical output channel
//!   - `SensorDriver` — initialise and read a sensor
//! - Own the **subscription lifecycle** (`SubscriptionManager`) — the only
//!   stateful component
//! - Provide the stateless services around it:
//!   - `CommandRouter` — decode actuator payloads and dispatch them
//!   - `OutputController` — map actuators to channels and apply them
//!   - `MeasurementPublisher` — forward measurements while the service is reachable
//!   - `SensorPoller` — periodic, failure-isolated sensor reads
//! - Wire everything together at start-up (`Bridge`)
//!
//! ## Dependency rule
//! Depends on `hwbridge-domain` only (plus `tokio` for tasks, channels and timers).
//! Never imports adapter crates. Adapters depend on *this* crate, not the reverse.

pub mod bridge;
pub mod ports;
pub mod services;
pub mod subscription;

#[cfg(test)]
mod testing;
