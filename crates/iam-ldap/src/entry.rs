//! Directory entries and attribute sets.

use std::collections::BTreeMap;

use ldap3::SearchEntry;

/// Attribute name to values. Every attribute is multi-valued on the wire.
pub type AttributeMap = BTreeMap<String, Vec<String>>;

/// Attribute name (case-insensitive) that lists an entry's object classes.
pub const OBJECT_CLASS: &str = "objectclass";

/// A directory entry: a DN plus its attributes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirectoryEntry {
    /// Distinguished Name.
    pub dn: String,

    /// Attributes (all values are multi-valued).
    pub attributes: AttributeMap,
}

impl DirectoryEntry {
    /// Creates an entry.
    #[must_use]
    pub fn new(dn: impl Into<String>, attributes: AttributeMap) -> Self {
        Self {
            dn: dn.into(),
            attributes,
        }
    }

    /// Creates an entry from an ldap3 search result.
    ///
    /// Binary attributes are dropped; the IAM schema is text-only.
    #[must_use]
    pub fn from_search_entry(entry: SearchEntry) -> Self {
        Self {
            dn: entry.dn,
            attributes: entry.attrs.into_iter().collect(),
        }
    }

    /// Adds a single-valued attribute.
    #[must_use]
    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes
            .entry(name.into())
            .or_default()
            .push(value.into());
        self
    }

    /// Gets all values of an attribute. Names match case-insensitively.
    #[must_use]
    pub fn get_attrs(&self, name: &str) -> Option<&Vec<String>> {
        find_attr(&self.attributes, name).map(|(_, values)| values)
    }

    /// Gets the first value of an attribute.
    #[must_use]
    pub fn get_attr(&self, name: &str) -> Option<&str> {
        self.get_attrs(name)
            .and_then(|v| v.first())
            .map(String::as_str)
    }

    /// Checks if the entry has an attribute.
    #[must_use]
    pub fn has_attr(&self, name: &str) -> bool {
        self.get_attrs(name).is_some()
    }

    /// Checks if the entry carries `object_class`.
    #[must_use]
    pub fn has_object_class(&self, object_class: &str) -> bool {
        self.get_attrs(OBJECT_CLASS)
            .is_some_and(|classes| classes.iter().any(|c| c.eq_ignore_ascii_case(object_class)))
    }

    /// Keeps only the requested attributes.
    ///
    /// An empty list or `*` returns every attribute, as LDAP servers do.
    #[must_use]
    pub fn project(&self, requested: &[&str]) -> Self {
        if requested.is_empty() || requested.contains(&"*") {
            return self.clone();
        }

        let attributes = self
            .attributes
            .iter()
            .filter(|(name, _)| requested.iter().any(|r| r.eq_ignore_ascii_case(name)))
            .map(|(name, values)| (name.clone(), values.clone()))
            .collect();

        Self {
            dn: self.dn.clone(),
            attributes,
        }
    }
}

/// Finds an attribute by case-insensitive name.
pub(crate) fn find_attr<'a>(
    attributes: &'a AttributeMap,
    name: &str,
) -> Option<(&'a String, &'a Vec<String>)> {
    attributes
        .get_key_value(name)
        .or_else(|| attributes.iter().find(|(k, _)| k.eq_ignore_ascii_case(name)))
}

/// Removes every key matching `name` case-insensitively.
pub(crate) fn remove_attr(attributes: &mut AttributeMap, name: &str) {
    attributes.retain(|k, _| !k.eq_ignore_ascii_case(name));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry() -> DirectoryEntry {
        DirectoryEntry::new("accountid=A1,ou=accounts,dc=com", AttributeMap::new())
            .with_attr("objectClass", "account")
            .with_attr("o", "account1")
            .with_attr("mail", "ops@example.com")
    }

    #[test]
    fn get_attr_is_case_insensitive() {
        let entry = entry();

        assert_eq!(entry.get_attr("o"), Some("account1"));
        assert_eq!(entry.get_attr("MAIL"), Some("ops@example.com"));
        assert_eq!(entry.get_attr("missing"), None);
        assert!(entry.has_attr("objectclass"));
        assert!(entry.has_object_class("Account"));
        assert!(!entry.has_object_class("policy"));
    }

    #[test]
    fn multi_valued_attribute() {
        let entry = entry().with_attr("objectClass", "top");
        assert_eq!(entry.get_attrs("objectclass").map(Vec::len), Some(2));
    }

    #[test]
    fn projection_keeps_requested_attributes() {
        let projected = entry().project(&["O"]);

        assert_eq!(projected.get_attr("o"), Some("account1"));
        assert!(!projected.has_attr("mail"));
        assert_eq!(entry().project(&[]), entry());
        assert_eq!(entry().project(&["*"]), entry());
    }

    #[test]
    fn remove_attr_ignores_case() {
        let mut attrs = entry().attributes;
        remove_attr(&mut attrs, "OBJECTCLASS");
        assert!(find_attr(&attrs, "objectClass").is_none());
    }
}
