//! Application services — the stateless components around the subscription.
//!
//! Each service struct accepts port trait implementations via generic parameters
//! (constructor injection), keeping this layer decoupled from concrete adapters.

pub mod command_router;
pub mod output_controller;
pub mod publisher;
pub mod sensor_poller;
