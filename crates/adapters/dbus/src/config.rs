//! Bus selection.

use serde::Deserialize;

/// Which message bus to connect to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BusKind {
    #[default]
    System,
    Session,
}

impl BusKind {
    /// Parse `system` or `session`, ignoring case.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "system" => Some(Self::System),
            "session" => Some(Self::Session),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::System => "system",
            Self::Session => "session",
        }
    }
}

impl std::fmt::Display for BusKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct Wrapper {
        kind: BusKind,
    }

    #[test]
    fn should_default_to_system_bus() {
        assert_eq!(BusKind::default(), BusKind::System);
    }

    #[test]
    fn should_deserialize_lowercase_names() {
        let wrapper: Wrapper = toml::from_str(r#"kind = "session""#).unwrap();
        assert_eq!(wrapper.kind, BusKind::Session);
    }

    #[test]
    fn should_reject_unknown_bus_name() {
        assert!(toml::from_str::<Wrapper>(r#"kind = "starter""#).is_err());
    }

    #[test]
    fn should_parse_names_case_insensitively() {
        assert_eq!(BusKind::from_name(" Session "), Some(BusKind::Session));
        assert_eq!(BusKind::from_name("SYSTEM"), Some(BusKind::System));
        assert_eq!(BusKind::from_name("user"), None);
    }
}
