//! Common test utilities and fixtures.

use std::sync::Arc;

use iam_ldap::{DirectoryLayout, InMemoryDirectory, LdapStore};
use iam_model::{Account, Policy};

/// Store over a shared in-memory directory.
pub type TestStore = LdapStore<Arc<InMemoryDirectory>>;

/// Creates a store over an empty in-memory directory.
pub fn store() -> TestStore {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("iam_ldap=debug")
        .with_test_writer()
        .try_init();

    LdapStore::new(Arc::new(InMemoryDirectory::new()), DirectoryLayout::default())
}

/// Account `A1234` named `account1`.
pub fn account() -> Account {
    Account::new("account1").with_id("A1234")
}

/// Policy `P1234` named `policy1` at the root path of [`account`].
pub fn policy() -> Policy {
    Policy::new(&account(), "/", "policy1", POLICY_DOCUMENT).with_id("P1234")
}

/// Minimal policy document.
pub const POLICY_DOCUMENT: &str =
    r#"{"Version":"2012-10-17","Statement":[{"Effect":"Allow","Action":"s3:*","Resource":"*"}]}"#;
