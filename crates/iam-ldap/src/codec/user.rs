//! User schema.

use iam_model::User;

use super::{
    format_timestamp, require, AttributeWriter, Decodable, DirectoryObject, DnBuildable,
    Encodable, EntityKind, EntryReader,
};
use crate::config::SearchScope;
use crate::dn::{self, DirectoryLayout};
use crate::entry::{AttributeMap, DirectoryEntry};
use crate::error::DirectoryResult;

const USER_ID: &str = "s3userid";
const NAME: &str = "s3username";
const PATH: &str = "path";
const ARN: &str = "arn";
const ACCOUNT_ID: &str = "accountid";
const CREATED_AT: &str = "createtimestamp";
const PASSWORD_LAST_USED: &str = "passwordlastused";

impl DirectoryObject for User {
    const KIND: EntityKind = EntityKind::User;
    const ATTRIBUTES: &'static [&'static str] = &[
        USER_ID,
        NAME,
        PATH,
        ARN,
        ACCOUNT_ID,
        CREATED_AT,
        PASSWORD_LAST_USED,
    ];
}

impl Encodable for User {
    fn encode(&self) -> DirectoryResult<AttributeMap> {
        let kind = Self::KIND;

        Ok(AttributeWriter::new(kind)
            .put(USER_ID, require(kind, "id", &self.id)?)
            .put(NAME, require(kind, "name", &self.name)?)
            .put(PATH, require(kind, "path", &self.path)?)
            .put(ACCOUNT_ID, require(kind, "account_id", &self.account_id)?)
            .put(ARN, require(kind, "arn", &self.arn)?)
            .put(CREATED_AT, format_timestamp(&self.created_at))
            .put_opt(
                PASSWORD_LAST_USED,
                self.password_last_used.as_ref().map(format_timestamp),
            )
            .finish())
    }
}

impl Decodable for User {
    fn decode(entry: &DirectoryEntry) -> DirectoryResult<Self> {
        let reader = EntryReader::new(entry, Self::KIND);

        Ok(Self {
            id: reader.required(USER_ID)?,
            name: reader.required(NAME)?,
            path: reader.required(PATH)?,
            account_id: reader.required(ACCOUNT_ID)?,
            arn: reader.required(ARN)?,
            created_at: reader.timestamp(CREATED_AT)?,
            password_last_used: reader.optional_timestamp(PASSWORD_LAST_USED)?,
        })
    }
}

impl DnBuildable for User {
    const SEARCH_SCOPE: SearchScope = SearchScope::Subtree;

    fn rdn(&self) -> DirectoryResult<String> {
        Ok(dn::rdn(NAME, require(Self::KIND, "name", &self.name)?))
    }

    fn parent_dn(&self, layout: &DirectoryLayout) -> DirectoryResult<String> {
        let account_id = require(Self::KIND, "account_id", &self.account_id)?;
        Ok(layout.users_dn(account_id))
    }

    fn search_base(&self, layout: &DirectoryLayout) -> String {
        if self.account_id.is_empty() {
            layout.accounts_dn()
        } else {
            layout.users_dn(&self.account_id)
        }
    }

    fn identity_terms(&self) -> Vec<(&'static str, &str)> {
        vec![
            (USER_ID, self.id.as_str()),
            (NAME, self.name.as_str()),
            (PATH, self.path.as_str()),
            (ACCOUNT_ID, self.account_id.as_str()),
        ]
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use iam_model::Account;

    use super::*;

    fn user() -> User {
        let account = Account::default().with_id("123456789012");
        let mut user = User::new(&account, "/dev/", "alice").with_id("AIDA1");
        user.created_at = Utc.with_ymd_and_hms(2022, 3, 1, 8, 0, 0).unwrap();
        user
    }

    #[test]
    fn round_trip_with_and_without_last_login() {
        let mut user = user();
        let layout = DirectoryLayout::default();

        let entry = DirectoryEntry::new(user.dn(&layout).unwrap(), user.encode().unwrap());
        assert_eq!(User::decode(&entry).unwrap(), user);

        user.password_last_used = Some(Utc.with_ymd_and_hms(2022, 3, 2, 9, 30, 0).unwrap());
        let entry = DirectoryEntry::new(user.dn(&layout).unwrap(), user.encode().unwrap());
        assert_eq!(User::decode(&entry).unwrap(), user);
    }

    #[test]
    fn encode_rejects_empty_path() {
        let user = user().with_path("");

        assert!(user.encode().unwrap_err().is_invalid_entity());
        assert_eq!(
            user.dn(&DirectoryLayout::default()).unwrap(),
            "s3username=alice,ou=users,accountid=123456789012,ou=accounts,dc=s3,dc=seagate,dc=com"
        );
    }

    #[test]
    fn dn_lives_under_account_users() {
        assert_eq!(
            user().dn(&DirectoryLayout::new("dc=example,dc=com")).unwrap(),
            "s3username=alice,ou=users,accountid=123456789012,ou=accounts,dc=example,dc=com"
        );
    }

    #[test]
    fn decode_rejects_malformed_timestamp() {
        let mut attrs = user().encode().unwrap();
        attrs.insert(CREATED_AT.to_string(), vec!["yesterday".to_string()]);

        let err = User::decode(&DirectoryEntry::new("s3username=alice", attrs)).unwrap_err();
        assert!(err.is_invalid_entity());
    }
}
