//! Result of a single-entity lookup.

use serde::{Deserialize, Serialize};

/// Outcome of looking up one entity.
///
/// `NotFound` is a regular outcome, not an error: it carries no entity, so
/// callers cannot read default or stale fields from a missing record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "entity", rename_all = "snake_case")]
pub enum Lookup<T> {
    /// Exactly one matching record was found and fully populated.
    Found(T),
    /// No record matched.
    NotFound,
}

impl<T> Lookup<T> {
    /// Returns `true` if the lookup found a record.
    #[must_use]
    pub const fn exists(&self) -> bool {
        matches!(self, Self::Found(_))
    }

    /// Borrows the found entity, if any.
    #[must_use]
    pub const fn found(&self) -> Option<&T> {
        match self {
            Self::Found(entity) => Some(entity),
            Self::NotFound => None,
        }
    }

    /// Converts into an `Option`.
    #[must_use]
    pub fn into_option(self) -> Option<T> {
        match self {
            Self::Found(entity) => Some(entity),
            Self::NotFound => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_does_not_exist() {
        let lookup: Lookup<String> = Lookup::NotFound;
        assert!(!lookup.exists());
        assert!(lookup.found().is_none());
        assert_eq!(lookup.into_option(), None);
    }

    #[test]
    fn found_exposes_entity() {
        let lookup = Lookup::Found("policy1".to_string());
        assert!(lookup.exists());
        assert_eq!(lookup.found().map(String::as_str), Some("policy1"));
        assert_eq!(lookup.into_option().as_deref(), Some("policy1"));
    }

    #[test]
    fn serializes_with_status_tag() {
        let json = serde_json::to_string(&Lookup::<u32>::NotFound).unwrap();
        assert_eq!(json, r#"{"status":"not_found"}"#);
    }
}
