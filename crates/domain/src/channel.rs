//! Output channels — where each actuator is physically wired.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::actuator::Actuator;

/// Identifier of a physical output channel (a GPIO line number, for
/// pinctrl-driven outputs).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChannelId(String);

impl ChannelId {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ChannelId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ChannelId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Immutable actuator → channel table, fixed at process start.
///
/// Actuators absent from the table are not wired; commands for them are
/// reported by the output controller and otherwise ignored.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "BTreeMap<String, ChannelId>")]
pub struct OutputChannelMap {
    channels: BTreeMap<Actuator, ChannelId>,
}

impl OutputChannelMap {
    /// Channel wired to `actuator`, if any.
    #[must_use]
    pub fn channel_for(&self, actuator: Actuator) -> Option<&ChannelId> {
        self.channels.get(&actuator)
    }
}

/// Digital outputs of the Sense'n'Drive cartridge.
///
/// `translights` is deliberately left unwired.
impl Default for OutputChannelMap {
    fn default() -> Self {
        [
            (Actuator::Lights, ChannelId::from("21")),
            (Actuator::Heater, ChannelId::from("20")),
            (Actuator::Rain, ChannelId::from("16")),
        ]
        .into_iter()
        .collect()
    }
}

impl TryFrom<BTreeMap<String, ChannelId>> for OutputChannelMap {
    type Error = String;

    fn try_from(table: BTreeMap<String, ChannelId>) -> Result<Self, Self::Error> {
        table
            .into_iter()
            .map(|(name, channel)| {
                Actuator::from_name(&name)
                    .map(|actuator| (actuator, channel))
                    .ok_or_else(|| format!("unknown actuator {name:?}"))
            })
            .collect()
    }
}

impl FromIterator<(Actuator, ChannelId)> for OutputChannelMap {
    fn from_iter<T: IntoIterator<Item = (Actuator, ChannelId)>>(iter: T) -> Self {
        Self {
            channels: iter.into_iter().collect(),
        }
    }
}
