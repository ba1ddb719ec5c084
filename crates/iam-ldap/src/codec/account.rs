//! Account schema.

use iam_model::Account;

use super::{
    require, AttributeWriter, Decodable, DirectoryObject, DnBuildable, Encodable, EntityKind,
    EntryReader,
};
use crate::config::SearchScope;
use crate::dn::{self, DirectoryLayout};
use crate::entry::{AttributeMap, DirectoryEntry};
use crate::error::DirectoryResult;

const ACCOUNT_ID: &str = "accountid";
const NAME: &str = "o";
const CANONICAL_ID: &str = "canonicalid";
const EMAIL: &str = "mail";

impl DirectoryObject for Account {
    const KIND: EntityKind = EntityKind::Account;
    const ATTRIBUTES: &'static [&'static str] = &[ACCOUNT_ID, NAME, CANONICAL_ID, EMAIL];
}

impl Encodable for Account {
    fn encode(&self) -> DirectoryResult<AttributeMap> {
        Ok(AttributeWriter::new(Self::KIND)
            .put(ACCOUNT_ID, require(Self::KIND, "id", &self.id)?)
            .put(NAME, require(Self::KIND, "name", &self.name)?)
            .put_opt(CANONICAL_ID, self.canonical_id.as_deref())
            .put_opt(EMAIL, self.email.as_deref())
            .finish())
    }
}

impl Decodable for Account {
    fn decode(entry: &DirectoryEntry) -> DirectoryResult<Self> {
        let reader = EntryReader::new(entry, Self::KIND);

        Ok(Self {
            id: reader.required(ACCOUNT_ID)?,
            name: reader.required(NAME)?,
            canonical_id: reader.optional(CANONICAL_ID),
            email: reader.optional(EMAIL),
        })
    }
}

impl DnBuildable for Account {
    const SEARCH_SCOPE: SearchScope = SearchScope::OneLevel;

    fn rdn(&self) -> DirectoryResult<String> {
        Ok(dn::rdn(ACCOUNT_ID, require(Self::KIND, "id", &self.id)?))
    }

    fn parent_dn(&self, layout: &DirectoryLayout) -> DirectoryResult<String> {
        Ok(layout.accounts_dn())
    }

    fn search_base(&self, layout: &DirectoryLayout) -> String {
        layout.accounts_dn()
    }

    fn identity_terms(&self) -> Vec<(&'static str, &str)> {
        vec![(ACCOUNT_ID, self.id.as_str()), (NAME, self.name.as_str())]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account() -> Account {
        Account::default()
            .with_id("A1234")
            .with_name("account1")
            .with_email("root@example.com")
    }

    #[test]
    fn round_trip() {
        let account = account();
        let entry = DirectoryEntry::new(
            account.dn(&DirectoryLayout::default()).unwrap(),
            account.encode().unwrap(),
        );

        assert_eq!(Account::decode(&entry).unwrap(), account);
    }

    #[test]
    fn encode_writes_object_class_and_skips_absent_options() {
        let attrs = account().encode().unwrap();

        assert_eq!(attrs["objectclass"], vec!["account"]);
        assert_eq!(attrs["o"], vec!["account1"]);
        assert!(!attrs.contains_key(CANONICAL_ID));
    }

    #[test]
    fn encode_requires_identity() {
        let err = Account::default().with_name("account1").encode().unwrap_err();
        assert!(err.is_invalid_entity());
    }

    #[test]
    fn decode_requires_name() {
        let entry = DirectoryEntry::default().with_attr("accountid", "A1234");
        assert!(Account::decode(&entry).unwrap_err().is_invalid_entity());
    }

    #[test]
    fn dn_uses_account_id() {
        assert_eq!(
            account().dn(&DirectoryLayout::new("dc=example,dc=com")).unwrap(),
            "accountid=A1234,ou=accounts,dc=example,dc=com"
        );
    }
}
