//! Account domain model.
//!
//! An account groups users and policies. Its ID is immutable once assigned
//! and its name is unique across the directory.

use serde::{Deserialize, Serialize};

use crate::ids;

/// An IAM account.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Unique, immutable identifier.
    pub id: String,
    /// Account name (unique in the directory).
    pub name: String,
    /// Canonical ID used in S3 ACL grants.
    pub canonical_id: Option<String>,
    /// Contact email.
    pub email: Option<String>,
}

impl Account {
    /// Creates a new account with a generated ID.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: ids::new_account_id(),
            name: name.into(),
            canonical_id: None,
            email: None,
        }
    }

    /// Sets the ID.
    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    /// Sets the name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the canonical ID.
    #[must_use]
    pub fn with_canonical_id(mut self, canonical_id: impl Into<String>) -> Self {
        self.canonical_id = Some(canonical_id.into());
        self
    }

    /// Sets the contact email.
    #[must_use]
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_account_has_generated_id() {
        let account = Account::new("account1");

        assert_eq!(account.name, "account1");
        assert_eq!(account.id.len(), 12);
        assert!(account.email.is_none());
    }

    #[test]
    fn template_only_carries_set_fields() {
        let template = Account::default().with_name("account1");

        assert!(template.id.is_empty());
        assert_eq!(template.name, "account1");
    }
}
