//! Recording output driver.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use hwbridge_app::ports::OutputDriver;
use hwbridge_domain::channel::ChannelId;
use hwbridge_domain::error::BridgeError;

#[derive(Default)]
struct OutputState {
    history: Vec<(ChannelId, bool)>,
    levels: BTreeMap<ChannelId, bool>,
}

/// Output driver that only remembers what it was asked to do.
#[derive(Clone, Default)]
pub struct VirtualOutputs {
    state: Arc<Mutex<OutputState>>,
}

impl VirtualOutputs {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, OutputState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Every channel change, oldest first.
    #[must_use]
    pub fn history(&self) -> Vec<(ChannelId, bool)> {
        self.lock().history.clone()
    }

    /// Last level applied to `channel`, if any.
    #[must_use]
    pub fn level(&self, channel: &ChannelId) -> Option<bool> {
        self.lock().levels.get(channel).copied()
    }
}

impl OutputDriver for VirtualOutputs {
    async fn set_channel(&self, channel: &ChannelId, active: bool) -> Result<(), BridgeError> {
        let mut state = self.lock();
        state.history.push((channel.clone(), active));
        state.levels.insert(channel.clone(), active);
        tracing::info!(%channel, active, "virtual output switched");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn should_record_history_and_last_level() {
        let outputs = VirtualOutputs::new();
        let heater = ChannelId::from("20");

        outputs.set_channel(&heater, true).await.unwrap();
        outputs.set_channel(&heater, false).await.unwrap();

        assert_eq!(
            outputs.history(),
            vec![(heater.clone(), true), (heater.clone(), false)]
        );
        assert_eq!(outputs.level(&heater), Some(false));
        assert_eq!(outputs.level(&ChannelId::from("21")), None);
    }

    #[tokio::test]
    async fn should_share_state_between_clones() {
        let outputs = VirtualOutputs::new();
        let observer = outputs.clone();

        outputs.set_channel(&ChannelId::from("16"), true).await.unwrap();

        assert_eq!(observer.history().len(), 1);
    }
}
