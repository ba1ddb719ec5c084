//! Search filter construction (RFC 4515).
//!
//! Filters are built structurally and rendered to the wire format only at
//! the transport boundary, so the in-memory directory can evaluate them
//! without parsing.

use std::fmt;

use ldap3::ldap_escape;

use crate::codec::DnBuildable;
use crate::entry::{DirectoryEntry, OBJECT_CLASS};

/// A directory search filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Filter {
    /// `(attr=value)`
    Equality(String, String),
    /// `(attr=*)`
    Present(String),
    /// `(&...)`
    And(Vec<Filter>),
}

impl Filter {
    /// Creates an equality filter.
    #[must_use]
    pub fn equals(attribute: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Equality(attribute.into(), value.into())
    }

    /// Creates a presence filter.
    #[must_use]
    pub fn present(attribute: impl Into<String>) -> Self {
        Self::Present(attribute.into())
    }

    /// Combines filters with AND. A single filter is returned unwrapped.
    #[must_use]
    pub fn and(mut filters: Vec<Self>) -> Self {
        if filters.len() == 1 {
            return filters.remove(0);
        }
        Self::And(filters)
    }

    /// Evaluates the filter against an entry.
    ///
    /// Attribute names and values compare case-insensitively, matching the
    /// `caseIgnoreMatch` rule used by every attribute in the IAM schema.
    #[must_use]
    pub fn matches(&self, entry: &DirectoryEntry) -> bool {
        match self {
            Self::Equality(attr, value) => entry
                .get_attrs(attr)
                .is_some_and(|values| values.iter().any(|v| v.eq_ignore_ascii_case(value))),
            Self::Present(attr) => entry.has_attr(attr),
            Self::And(filters) => filters.iter().all(|f| f.matches(entry)),
        }
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Equality(attr, value) => write!(f, "({attr}={})", ldap_escape(value.as_str())),
            Self::Present(attr) => write!(f, "({attr}=*)"),
            Self::And(filters) => {
                f.write_str("(&")?;
                for filter in filters {
                    write!(f, "{filter}")?;
                }
                f.write_str(")")
            }
        }
    }
}

/// Builds the search filter for a template entity.
///
/// The filter always restricts the object class and adds one equality term
/// per non-empty identifying field. Terms are combined with AND; empty
/// fields are omitted rather than matched against the empty string.
#[must_use]
pub fn search_filter<T: DnBuildable>(template: &T) -> Filter {
    let mut terms = vec![Filter::equals(OBJECT_CLASS, T::KIND.object_class())];
    terms.extend(
        template
            .identity_terms()
            .into_iter()
            .filter(|(_, value)| !value.is_empty())
            .map(|(attr, value)| Filter::equals(attr, value)),
    );
    Filter::and(terms)
}

#[cfg(test)]
mod tests {
    use iam_model::{Account, Policy};

    use super::*;
    use crate::entry::AttributeMap;

    #[test]
    fn renders_rfc4515() {
        let filter = Filter::and(vec![
            Filter::equals("objectclass", "policy"),
            Filter::equals("path", "/"),
            Filter::present("description"),
        ]);

        assert_eq!(
            filter.to_string(),
            "(&(objectclass=policy)(path=/)(description=*))"
        );
    }

    #[test]
    fn escapes_values() {
        let filter = Filter::equals("policyname", "a*(b)");
        assert_eq!(filter.to_string(), r"(policyname=a\2a\28b\29)");
    }

    #[test]
    fn single_term_is_not_wrapped() {
        assert_eq!(
            Filter::and(vec![Filter::present("o")]).to_string(),
            "(o=*)"
        );
    }

    #[test]
    fn name_only_template_filters_on_name() {
        let template = Policy::default().with_name("policy1");
        let filter = search_filter(&template);

        assert_eq!(filter.to_string(), "(&(objectclass=policy)(policyname=policy1))");
    }

    #[test]
    fn populated_fields_are_all_required() {
        let template = Policy::default().with_name("policy1").with_path("/team/");
        let filter = search_filter(&template);

        assert_eq!(
            filter.to_string(),
            "(&(objectclass=policy)(policyname=policy1)(path=/team/))"
        );
        assert!(matches!(filter, Filter::And(_)));
    }

    #[test]
    fn empty_template_matches_object_class_only() {
        let filter = search_filter(&Account::default());
        assert_eq!(filter.to_string(), "(objectclass=account)");
    }

    #[test]
    fn evaluates_against_entry() {
        let entry = DirectoryEntry::new("accountid=A1,ou=accounts,dc=com", AttributeMap::new())
            .with_attr("objectClass", "Account")
            .with_attr("o", "Account1");

        assert!(Filter::equals("objectclass", "account").matches(&entry));
        assert!(Filter::equals("O", "account1").matches(&entry));
        assert!(!Filter::equals("o", "account2").matches(&entry));
        assert!(Filter::present("o").matches(&entry));
        assert!(!Filter::present("mail").matches(&entry));
        assert!(!Filter::and(vec![Filter::present("mail"), Filter::present("o")]).matches(&entry));
        assert!(Filter::And(Vec::new()).matches(&entry));
    }
}
