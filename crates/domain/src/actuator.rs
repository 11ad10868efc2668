//! Actuator commands — decoded instructions from the control service.
//!
//! The control service broadcasts payloads shaped like
//! `{"actuator": "heater", "value": "on"}`. Decoding distinguishes three
//! outcomes: a known command, an actuator name we do not drive (inert), and
//! a payload that cannot be decoded at all.

use serde::{Deserialize, Serialize};

use crate::error::PayloadError;

/// Physical actuators the bridge can drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Actuator {
    Lights,
    Translights,
    Rain,
    Heater,
}

impl Actuator {
    /// Every known actuator, in declaration order.
    pub const ALL: [Self; 4] = [Self::Lights, Self::Translights, Self::Rain, Self::Heater];

    /// Look up an actuator by its wire name. Matching is exact.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "lights" => Some(Self::Lights),
            "translights" => Some(Self::Translights),
            "rain" => Some(Self::Rain),
            "heater" => Some(Self::Heater),
            _ => None,
        }
    }

    /// Wire name of this actuator.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Lights => "lights",
            Self::Translights => "translights",
            Self::Rain => "rain",
            Self::Heater => "heater",
        }
    }
}

impl std::fmt::Display for Actuator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Requested binary state of an actuator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputValue {
    On,
    Off,
}

impl OutputValue {
    /// Decode a wire value: `"on"` is on, anything else is off.
    #[must_use]
    pub fn from_wire(value: &str) -> Self {
        if value == "on" { Self::On } else { Self::Off }
    }

    /// Whether the output should be driven active-high.
    #[must_use]
    pub fn is_active(self) -> bool {
        matches!(self, Self::On)
    }
}

impl std::fmt::Display for OutputValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::On => f.write_str("on"),
            Self::Off => f.write_str("off"),
        }
    }
}

/// A decoded instruction for one actuator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActuatorCommand {
    pub actuator: Actuator,
    pub value: OutputValue,
}

impl ActuatorCommand {
    #[must_use]
    pub fn new(actuator: Actuator, value: OutputValue) -> Self {
        Self { actuator, value }
    }
}

/// Result of decoding a well-formed actuator payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedCommand {
    /// The payload names an actuator we drive.
    Known(ActuatorCommand),
    /// The payload is well-formed but names an actuator we do not drive.
    Unknown { actuator: String },
}

/// Decode an inbound actuator payload.
///
/// Extra fields are ignored.
///
/// # Errors
///
/// Returns a [`PayloadError`] when the text is not JSON, is not an object,
/// or lacks a string `actuator` / `value` field.
pub fn parse_command(payload: &str) -> Result<ParsedCommand, PayloadError> {
    let json: serde_json::Value = serde_json::from_str(payload).map_err(PayloadError::Malformed)?;
    let object = json.as_object().ok_or(PayloadError::NotAnObject)?;

    let actuator = string_field(object, "actuator")?;
    let value = string_field(object, "value")?;

    Ok(match Actuator::from_name(actuator) {
        Some(actuator) => {
            ParsedCommand::Known(ActuatorCommand::new(actuator, OutputValue::from_wire(value)))
        }
        None => ParsedCommand::Unknown {
            actuator: actuator.to_string(),
        },
    })
}

fn string_field<'a>(
    object: &'a serde_json::Map<String, serde_json::Value>,
    field: &'static str,
) -> Result<&'a str, PayloadError> {
    object
        .get(field)
        .ok_or(PayloadError::MissingField(field))?
        .as_str()
        .ok_or(PayloadError::InvalidField(field))
}
