//! Policy domain model.
//!
//! A managed policy is an access-control document owned by an account.
//! The policy references its account by ID; it does not own it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{arn, ids, truncate_to_seconds, Account, DEFAULT_PATH};

/// ARN resource type for policies.
pub const POLICY_RESOURCE_TYPE: &str = "policy";

/// Initial default version of a newly created policy.
pub const INITIAL_VERSION_ID: &str = "v1";

/// A managed IAM policy.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Policy {
    // === Identity ===
    /// Unique policy identifier.
    pub id: String,
    /// Hierarchical path, `/` by default.
    pub path: String,
    /// Policy name (unique within account and path).
    pub name: String,
    /// Owning account ID.
    pub account_id: String,
    /// Amazon Resource Name, derived from account, path and name.
    pub arn: String,

    // === Timestamps ===
    /// When the policy was created.
    pub created_at: DateTime<Utc>,
    /// When the policy was last updated.
    pub updated_at: DateTime<Utc>,

    // === Versioning and usage ===
    /// ID of the default policy version.
    pub default_version_id: String,
    /// Number of principals the policy is attached to.
    pub attachment_count: u32,
    /// Number of principals using the policy as permissions boundary.
    pub permissions_boundary_usage_count: u32,
    /// Whether the policy can be attached.
    pub is_attachable: bool,

    // === Content ===
    /// Policy document (JSON text, not validated here).
    pub document: String,
    /// Free-form description.
    pub description: Option<String>,
}

impl Policy {
    /// Creates a new attachable policy owned by `account`.
    ///
    /// An empty `path` becomes the root path.
    #[must_use]
    pub fn new(
        account: &Account,
        path: impl Into<String>,
        name: impl Into<String>,
        document: impl Into<String>,
    ) -> Self {
        let mut path = path.into();
        if path.is_empty() {
            path = DEFAULT_PATH.to_string();
        }
        let name = name.into();
        let now = truncate_to_seconds(Utc::now());

        Self {
            id: ids::new_policy_id(),
            arn: arn::format_arn(&account.id, POLICY_RESOURCE_TYPE, &path, &name),
            path,
            name,
            account_id: account.id.clone(),
            created_at: now,
            updated_at: now,
            default_version_id: INITIAL_VERSION_ID.to_string(),
            attachment_count: 0,
            permissions_boundary_usage_count: 0,
            is_attachable: true,
            document: document.into(),
            description: None,
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

    /// Sets the owning account ID.
    #[must_use]
    pub fn with_account_id(mut self, account_id: impl Into<String>) -> Self {
        self.account_id = account_id.into();
        self
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Returns the path, or the root path when unset.
    #[must_use]
    pub fn effective_path(&self) -> &str {
        if self.path.is_empty() {
            DEFAULT_PATH
        } else {
            &self.path
        }
    }

    /// Computes the ARN from the current account, path and name.
    #[must_use]
    pub fn expected_arn(&self) -> String {
        arn::format_arn(
            &self.account_id,
            POLICY_RESOURCE_TYPE,
            self.effective_path(),
            &self.name,
        )
    }

    /// Records that the policy changed now.
    pub fn touch(&mut self) {
        self.updated_at = truncate_to_seconds(Utc::now());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account() -> Account {
        Account::default().with_id("A1234").with_name("account1")
    }

    #[test]
    fn new_policy_derives_arn() {
        let policy = Policy::new(&account(), "/", "policy1", "{}");

        assert_eq!(policy.arn, "arn:aws:iam::A1234:policy/policy1");
        assert_eq!(policy.account_id, "A1234");
        assert!(policy.id.starts_with(ids::POLICY_PREFIX));
        assert!(policy.is_attachable);
        assert_eq!(policy.attachment_count, 0);
        assert_eq!(policy.created_at, policy.updated_at);
    }

    #[test]
    fn empty_path_defaults_to_root() {
        let policy = Policy::new(&account(), "", "policy1", "{}");
        assert_eq!(policy.path, "/");
    }

    #[test]
    fn timestamps_have_second_precision() {
        let policy = Policy::new(&account(), "/", "policy1", "{}");
        assert_eq!(policy.created_at.timestamp_subsec_nanos(), 0);
    }

    #[test]
    fn template_leaves_path_unset() {
        let template = Policy::default().with_name("policy1").with_account(&account());

        assert!(template.path.is_empty());
        assert_eq!(template.effective_path(), "/");
        assert_eq!(template.expected_arn(), "arn:aws:iam::A1234:policy/policy1");
    }
}
