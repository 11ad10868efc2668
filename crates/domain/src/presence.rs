//! Service presence — ownership changes of named bus services.

use serde::{Deserialize, Serialize};

/// A change of ownership of a named bus service.
///
/// An empty owner string is normalised to `None` by [`new`](Self::new).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServicePresenceEvent {
    pub name: String,
    pub old_owner: Option<String>,
    pub new_owner: Option<String>,
}

/// What a presence event means for one watched service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresenceTransition {
    /// The service went from no owner to an owner.
    Appeared,
    /// The service lost its owner.
    Vanished,
    /// Ownership moved directly from one owner to another.
    Replaced,
}

impl ServicePresenceEvent {
    pub fn new(
        name: impl Into<String>,
        old_owner: Option<String>,
        new_owner: Option<String>,
    ) -> Self {
        Self {
            name: name.into(),
            old_owner: old_owner.filter(|owner| !owner.is_empty()),
            new_owner: new_owner.filter(|owner| !owner.is_empty()),
        }
    }

    /// The service started and is now owned by `owner`.
    pub fn appeared(name: impl Into<String>, owner: impl Into<String>) -> Self {
        Self::new(name, None, Some(owner.into()))
    }

    /// The service previously owned by `owner` stopped.
    pub fn vanished(name: impl Into<String>, owner: impl Into<String>) -> Self {
        Self::new(name, Some(owner.into()), None)
    }

    /// Interpret this event for the service called `watched`.
    ///
    /// Returns `None` for other services and for events without any owner.
    #[must_use]
    pub fn transition_for(&self, watched: &str) -> Option<PresenceTransition> {
        if self.name != watched {
            return None;
        }
        match (&self.old_owner, &self.new_owner) {
            (None, Some(_)) => Some(PresenceTransition::Appeared),
            (Some(_), None) => Some(PresenceTransition::Vanished),
            (Some(old), Some(new)) if old != new => Some(PresenceTransition::Replaced),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SERVICE: &str = "io.freya.Core";

    #[test]
    fn should_detect_appearance() {
        let event = ServicePresenceEvent::appeared(SERVICE, ":1.42");
        assert_eq!(
            event.transition_for(SERVICE),
            Some(PresenceTransition::Appeared)
        );
    }

    #[test]
    fn should_detect_disappearance() {
        let event = ServicePresenceEvent::vanished(SERVICE, ":1.42");
        assert_eq!(
            event.transition_for(SERVICE),
            Some(PresenceTransition::Vanished)
        );
    }

    #[test]
    fn should_ignore_other_services() {
        let event = ServicePresenceEvent::appeared("org.example.Other", ":1.7");
        assert_eq!(event.transition_for(SERVICE), None);
    }

    #[test]
    fn should_detect_owner_handover() {
        let event =
            ServicePresenceEvent::new(SERVICE, Some(":1.1".to_string()), Some(":1.2".to_string()));
        assert_eq!(
            event.transition_for(SERVICE),
            Some(PresenceTransition::Replaced)
        );
    }

    #[test]
    fn should_ignore_event_with_unchanged_owner() {
        let event =
            ServicePresenceEvent::new(SERVICE, Some(":1.1".to_string()), Some(":1.1".to_string()));
        assert_eq!(event.transition_for(SERVICE), None);
    }

    #[test]
    fn should_normalise_empty_owner_strings() {
        let event =
            ServicePresenceEvent::new(SERVICE, Some(String::new()), Some(":1.3".to_string()));
        assert_eq!(event.old_owner, None);
        assert_eq!(
            event.transition_for(SERVICE),
            Some(PresenceTransition::Appeared)
        );
    }

    #[test]
    fn should_ignore_event_without_any_owner() {
        let event = ServicePresenceEvent::new(SERVICE, Some(String::new()), None);
        assert_eq!(event.transition_for(SERVICE), None);
    }
}
