//! Policy schema.
//!
//! Policies are named by `policyname` and `path` under their account's
//! `ou=policies` container, so the directory itself rejects a second policy
//! with the same name and path in one account.

use iam_model::Policy;

use super::{
    format_timestamp, require, AttributeWriter, Decodable, DirectoryObject, DnBuildable,
    Encodable, EntityKind, EntryReader,
};
use crate::config::SearchScope;
use crate::dn::{self, DirectoryLayout};
use crate::entry::{AttributeMap, DirectoryEntry};
use crate::error::DirectoryResult;

const POLICY_ID: &str = "policyid";
const NAME: &str = "policyname";
const PATH: &str = "path";
const ARN: &str = "arn";
const ACCOUNT_ID: &str = "accountid";
const CREATED_AT: &str = "createtimestamp";
const UPDATED_AT: &str = "lastupdatedtimestamp";
const DEFAULT_VERSION_ID: &str = "defaultversionid";
const ATTACHMENT_COUNT: &str = "attachmentcount";
const BOUNDARY_USAGE_COUNT: &str = "permissionsboundaryusagecount";
const IS_ATTACHABLE: &str = "ispolicyattachable";
const DOCUMENT: &str = "policydoc";
const DESCRIPTION: &str = "description";

impl DirectoryObject for Policy {
    const KIND: EntityKind = EntityKind::Policy;
    const ATTRIBUTES: &'static [&'static str] = &[
        POLICY_ID,
        NAME,
        PATH,
        ARN,
        ACCOUNT_ID,
        CREATED_AT,
        UPDATED_AT,
        DEFAULT_VERSION_ID,
        ATTACHMENT_COUNT,
        BOUNDARY_USAGE_COUNT,
        IS_ATTACHABLE,
        DOCUMENT,
        DESCRIPTION,
    ];
}

impl Encodable for Policy {
    fn encode(&self) -> DirectoryResult<AttributeMap> {
        let kind = Self::KIND;
        let arn = if self.arn.is_empty() {
            self.expected_arn()
        } else {
            self.arn.clone()
        };

        Ok(AttributeWriter::new(kind)
            .put(POLICY_ID, require(kind, "id", &self.id)?)
            .put(NAME, require(kind, "name", &self.name)?)
            .put(PATH, require(kind, "path", &self.path)?)
            .put(ACCOUNT_ID, require(kind, "account_id", &self.account_id)?)
            .put(ARN, arn)
            .put(CREATED_AT, format_timestamp(&self.created_at))
            .put(UPDATED_AT, format_timestamp(&self.updated_at))
            .put(
                DEFAULT_VERSION_ID,
                require(kind, "default_version_id", &self.default_version_id)?,
            )
            .put(ATTACHMENT_COUNT, self.attachment_count.to_string())
            .put(
                BOUNDARY_USAGE_COUNT,
                self.permissions_boundary_usage_count.to_string(),
            )
            .put(IS_ATTACHABLE, self.is_attachable.to_string())
            .put(DOCUMENT, require(kind, "document", &self.document)?)
            .put_opt(DESCRIPTION, self.description.as_deref())
            .finish())
    }
}

impl Decodable for Policy {
    fn decode(entry: &DirectoryEntry) -> DirectoryResult<Self> {
        let reader = EntryReader::new(entry, Self::KIND);

        Ok(Self {
            id: reader.required(POLICY_ID)?,
            path: reader.required(PATH)?,
            name: reader.required(NAME)?,
            account_id: reader.required(ACCOUNT_ID)?,
            arn: reader.required(ARN)?,
            created_at: reader.timestamp(CREATED_AT)?,
            updated_at: reader.timestamp(UPDATED_AT)?,
            default_version_id: reader.required(DEFAULT_VERSION_ID)?,
            attachment_count: reader.count(ATTACHMENT_COUNT)?,
            permissions_boundary_usage_count: reader.count(BOUNDARY_USAGE_COUNT)?,
            is_attachable: reader.flag(IS_ATTACHABLE)?,
            document: reader.required(DOCUMENT)?,
            description: reader.optional(DESCRIPTION),
        })
    }
}

impl DnBuildable for Policy {
    const SEARCH_SCOPE: SearchScope = SearchScope::Subtree;

    fn rdn(&self) -> DirectoryResult<String> {
        let name = require(Self::KIND, "name", &self.name)?;
        Ok(dn::multi_rdn(&[(NAME, name), (PATH, self.effective_path())]))
    }

    fn parent_dn(&self, layout: &DirectoryLayout) -> DirectoryResult<String> {
        let account_id = require(Self::KIND, "account_id", &self.account_id)?;
        Ok(layout.policies_dn(account_id))
    }

    fn search_base(&self, layout: &DirectoryLayout) -> String {
        if self.account_id.is_empty() {
            layout.accounts_dn()
        } else {
            layout.policies_dn(&self.account_id)
        }
    }

    fn identity_terms(&self) -> Vec<(&'static str, &str)> {
        vec![
            (POLICY_ID, self.id.as_str()),
            (NAME, self.name.as_str()),
            (PATH, self.path.as_str()),
            (ACCOUNT_ID, self.account_id.as_str()),
        ]
    }
}
