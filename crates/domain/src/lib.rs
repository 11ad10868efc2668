//! # hwbridge-domain
//!
//! Pure domain model for the hwbridge hardware bridge.
//!
//! ## Responsibilities
//! - Foundational types: error taxonomy, remote service coordinates
//! - Define **actuator commands** (what the control service asks us to switch)
//! - Define **measurements** (what we report back, in wire format)
//! - Define **output channel maps** (actuator → physical channel)
//! - Define **presence events** (bus service ownership changes)
//! - Contain all parsing, formatting and invariant enforcement
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod error;
pub mod target;

pub mod actuator;
pub mod channel;
pub mod measurement;
pub mod presence;
