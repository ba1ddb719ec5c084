//! User domain model.
//!
//! IAM users belong to exactly one account. The user name is unique within
//! that account.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{arn, ids, truncate_to_seconds, Account, DEFAULT_PATH};

/// ARN resource type for users.
pub const USER_RESOURCE_TYPE: &str = "user";

/// An IAM user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Unique user identifier.
    pub id: String,
    /// User name (unique within the account).
    pub name: String,
    /// Hierarchical path, `/` by default.
    pub path: String,
    /// Owning account ID.
    pub account_id: String,
    /// Amazon Resource Name.
    pub arn: String,
    /// When the user was created.
    pub created_at: DateTime<Utc>,
    /// Last time the user's password was used to sign in.
    pub password_last_used: Option<DateTime<Utc>>,
}

impl User {
    /// Creates a new user in `account`.
    #[must_use]
    pub fn new(account: &Account, path: impl Into<String>, name: impl Into<String>) -> Self {
        let mut path = path.into();
        if path.is_empty() {
            path = DEFAULT_PATH.to_string();
        }
        let name = name.into();

        Self {
            id: ids::new_user_id(),
            arn: arn::format_arn(&account.id, USER_RESOURCE_TYPE, &path, &name),
            name,
            path,
            account_id: account.id.clone(),
            created_at: truncate_to_seconds(Utc::now()),
            password_last_used: None,
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

    /// Sets the path.
    #[must_use]
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    /// Sets the owning account.
    #[must_use]
    pub fn with_account(mut self, account: &Account) -> Self {
        self.account_id.clone_from(&account.id);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_creation() {
        let account = Account::default().with_id("123456789012");
        let user = User::new(&account, "/dev/", "alice");

        assert_eq!(user.arn, "arn:aws:iam::123456789012:user/dev/alice");
        assert!(user.id.starts_with(ids::USER_PREFIX));
        assert!(user.password_last_used.is_none());
    }

    #[test]
    fn template_defaults_are_empty() {
        let template = User::default().with_name("alice");

        assert!(template.id.is_empty());
        assert!(template.account_id.is_empty());
        assert!(template.path.is_empty());
    }
}
