//! Common types used across CLI modules

use uuid::Uuid;

/// Pipeline id as typed by the user: a full UUID or a prefix
///
/// Ids assigned by `pipeline publish` are UUIDs, so a full UUID never needs
/// a lookup. Anything else is matched against the published ids.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdOrPrefix {
    /// Full UUID
    Full(Uuid),
    /// Prefix (or complete non-UUID id) that should match one pipeline
    Prefix(String),
}

impl IdOrPrefix {
    /// Attempts to parse as a full UUID first, otherwise treats as a prefix
    pub fn parse(input: &str) -> Self {
        match Uuid::parse_str(input) {
            Ok(uuid) => IdOrPrefix::Full(uuid),
            Err(_) => IdOrPrefix::Prefix(input.to_string()),
        }
    }

    pub fn as_full(&self) -> Option<String> {
        match self {
            IdOrPrefix::Full(uuid) => Some(uuid.to_string()),
            IdOrPrefix::Prefix(_) => None,
        }
    }

    pub fn as_str(&self) -> String {
        match self {
            IdOrPrefix::Full(uuid) => uuid.to_string(),
            IdOrPrefix::Prefix(prefix) => prefix.clone(),
        }
    }
}

impl std::fmt::Display for IdOrPrefix {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IdOrPrefix::Full(uuid) => write!(f, "{}", uuid),
            IdOrPrefix::Prefix(prefix) => write!(f, "{}", prefix),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_uuid() {
        let id = "3f2c1a4e-8b9d-4c7e-a1b2-c3d4e5f60718";
        let parsed = IdOrPrefix::parse(id);
        assert_eq!(parsed.as_full().as_deref(), Some(id));
        assert_eq!(parsed.to_string(), id);
    }

    #[test]
    fn test_parse_prefix() {
        let parsed = IdOrPrefix::parse("3f2c");
        assert_eq!(parsed, IdOrPrefix::Prefix("3f2c".to_string()));
        assert_eq!(parsed.as_full(), None);
        assert_eq!(parsed.as_str(), "3f2c");
    }
}
