//! Distinguished name construction and comparison.
//!
//! Directory layout (suffix defaults to `dc=s3,dc=seagate,dc=com`):
//!
//! ```text
//! ou=accounts,<suffix>
//! └── accountid=<id>
//!     ├── ou=policies
//!     │   └── policyname=<name>+path=<path>
//!     └── ou=users
//!         └── s3username=<name>
//! ```

use ldap3::dn_escape;

use crate::config::SearchScope;

/// Default directory suffix.
pub const DEFAULT_SUFFIX: &str = "dc=s3,dc=seagate,dc=com";

/// RDN of the accounts container.
pub const ACCOUNTS_OU: &str = "ou=accounts";

/// RDN of an account's policies container.
pub const POLICIES_OU: &str = "ou=policies";

/// RDN of an account's users container.
pub const USERS_OU: &str = "ou=users";

/// Builds a single-valued RDN, escaping the value.
#[must_use]
pub fn rdn(attribute: &str, value: &str) -> String {
    format!("{attribute}={}", dn_escape(value))
}

/// Builds a multi-valued RDN (`a=1+b=2`), escaping every value.
#[must_use]
pub fn multi_rdn(parts: &[(&str, &str)]) -> String {
    parts
        .iter()
        .map(|(attribute, value)| rdn(attribute, value))
        .collect::<Vec<_>>()
        .join("+")
}

/// Appends `rdn` to `parent`.
#[must_use]
pub fn child(rdn: &str, parent: &str) -> String {
    if parent.is_empty() {
        rdn.to_string()
    } else {
        format!("{rdn},{parent}")
    }
}

/// DN layout of the IAM tree under a suffix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryLayout {
    suffix: String,
}

impl Default for DirectoryLayout {
    fn default() -> Self {
        Self::new(DEFAULT_SUFFIX)
    }
}

impl DirectoryLayout {
    /// Creates a layout rooted at `suffix`.
    #[must_use]
    pub fn new(suffix: impl Into<String>) -> Self {
        Self {
            suffix: suffix.into(),
        }
    }

    /// Returns the suffix.
    #[must_use]
    pub fn suffix(&self) -> &str {
        &self.suffix
    }

    /// DN of the accounts container.
    #[must_use]
    pub fn accounts_dn(&self) -> String {
        child(ACCOUNTS_OU, &self.suffix)
    }

    /// DN of an account entry.
    #[must_use]
    pub fn account_dn(&self, account_id: &str) -> String {
        child(&rdn("accountid", account_id), &self.accounts_dn())
    }

    /// DN of an account's policies container.
    #[must_use]
    pub fn policies_dn(&self, account_id: &str) -> String {
        child(POLICIES_OU, &self.account_dn(account_id))
    }

    /// DN of an account's users container.
    #[must_use]
    pub fn users_dn(&self, account_id: &str) -> String {
        child(USERS_OU, &self.account_dn(account_id))
    }
}

/// Splits a DN into its RDNs, honoring backslash escapes.
#[must_use]
pub fn split_rdns(dn: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut start = 0;
    let mut escaped = false;

    for (i, c) in dn.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' => escaped = true,
            ',' => {
                parts.push(dn[start..i].trim());
                start = i + 1;
            }
            _ => {}
        }
    }

    let last = dn[start..].trim();
    if !last.is_empty() || !parts.is_empty() {
        parts.push(last);
    }
    parts
}

/// Normalizes a DN for comparison.
///
/// Whitespace around RDN separators is dropped and the DN is lower-cased;
/// all attributes in the IAM schema use case-insensitive matching.
#[must_use]
pub fn normalize(dn: &str) -> String {
    split_rdns(dn).join(",").to_lowercase()
}

/// Returns the parent DN, or `None` for a single-RDN DN.
#[must_use]
pub fn parent(dn: &str) -> Option<String> {
    let rdns = split_rdns(dn);
    if rdns.len() < 2 {
        return None;
    }
    Some(rdns[1..].join(","))
}

/// Checks whether `dn` falls inside a search rooted at `base` with `scope`.
#[must_use]
pub fn in_scope(dn: &str, base: &str, scope: SearchScope) -> bool {
    let dn = normalize(dn);
    let base = normalize(base);

    match scope {
        SearchScope::Base => dn == base,
        SearchScope::OneLevel => match parent(&dn) {
            Some(p) => p == base,
            None => base.is_empty(),
        },
        SearchScope::Subtree => {
            base.is_empty() || dn == base || dn.ends_with(&format!(",{base}"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_builds_account_tree() {
        let layout = DirectoryLayout::default();

        assert_eq!(layout.accounts_dn(), "ou=accounts,dc=s3,dc=seagate,dc=com");
        assert_eq!(
            layout.account_dn("A1234"),
            "accountid=A1234,ou=accounts,dc=s3,dc=seagate,dc=com"
        );
        assert_eq!(
            layout.policies_dn("A1234"),
            "ou=policies,accountid=A1234,ou=accounts,dc=s3,dc=seagate,dc=com"
        );
        assert_eq!(
            layout.users_dn("A1234"),
            "ou=users,accountid=A1234,ou=accounts,dc=s3,dc=seagate,dc=com"
        );
    }

    #[test]
    fn rdn_escapes_special_characters() {
        let value = rdn("cn", "Smith, John");
        assert_eq!(split_rdns(&value).len(), 1);
        assert!(value.starts_with("cn=Smith"));
        assert_ne!(value, "cn=Smith, John");
    }

    #[test]
    fn multi_valued_rdn() {
        assert_eq!(
            multi_rdn(&[("policyname", "policy1"), ("path", "/")]),
            "policyname=policy1+path=/"
        );
    }

    #[test]
    fn split_honors_escapes() {
        let rdns = split_rdns(r"cn=a\,b, ou=x ,dc=com");
        assert_eq!(rdns, vec![r"cn=a\,b", "ou=x", "dc=com"]);
        assert!(split_rdns("").is_empty());
    }

    #[test]
    fn parent_of_dn() {
        assert_eq!(parent("cn=a,ou=x,dc=com").as_deref(), Some("ou=x,dc=com"));
        assert_eq!(parent("dc=com"), None);
    }

    #[test]
    fn scope_checks() {
        let base = "ou=accounts,dc=com";
        let account = "accountid=A1,ou=accounts,dc=com";
        let policy = "policyname=p+path=/,ou=policies,accountid=A1,ou=accounts,dc=com";

        assert!(in_scope(account, base, SearchScope::OneLevel));
        assert!(!in_scope(policy, base, SearchScope::OneLevel));
        assert!(in_scope(policy, base, SearchScope::Subtree));
        assert!(in_scope(base, base, SearchScope::Base));
        assert!(!in_scope(account, base, SearchScope::Base));
        assert!(in_scope("AccountId=A1, OU=Accounts,dc=com", base, SearchScope::OneLevel));
        assert!(!in_scope("accountid=A1,ou=xaccounts,dc=com", base, SearchScope::Subtree));
    }
}
