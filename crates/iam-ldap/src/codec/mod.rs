//! Attribute codecs.
//!
//! Each supported entity type binds, through the traits below, its object
//! class, its attribute schema ([`Encodable`] / [`Decodable`]) and its DN
//! and search rules ([`DnBuildable`]). Supporting a new entity type means
//! adding one module here; [`LdapStore`](crate::store::LdapStore) is
//! generic over these traits and does not change.

mod account;
mod policy;
mod user;

use std::fmt;

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::config::SearchScope;
use crate::dn::{self, DirectoryLayout};
use crate::entry::{AttributeMap, DirectoryEntry, OBJECT_CLASS};
use crate::error::{DirectoryError, DirectoryResult};

/// LDAP `GeneralizedTime` format used for timestamps.
pub const TIMESTAMP_FORMAT: &str = "%Y%m%d%H%M%SZ";

/// `GeneralizedTime` with a fractional-seconds part.
const FRACTIONAL_TIMESTAMP_FORMAT: &str = "%Y%m%d%H%M%S%.fZ";

/// Closed set of entity types stored in the directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    /// [`iam_model::Account`]
    Account,
    /// [`iam_model::User`]
    User,
    /// [`iam_model::Policy`]
    Policy,
}

impl EntityKind {
    /// Returns the type name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Account => "Account",
            Self::User => "User",
            Self::Policy => "Policy",
        }
    }

    /// Returns the structural object class of entries of this type.
    #[must_use]
    pub const fn object_class(self) -> &'static str {
        match self {
            Self::Account => "account",
            Self::User => "iamuser",
            Self::Policy => "policy",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An entity type stored in the directory.
pub trait DirectoryObject: Sized + Send + Sync {
    /// Entity type tag.
    const KIND: EntityKind;

    /// Attributes requested when searching for this type.
    const ATTRIBUTES: &'static [&'static str];
}

/// Converts an entity into the attributes of a new entry.
pub trait Encodable: DirectoryObject {
    /// Encodes the entity.
    ///
    /// ## Errors
    ///
    /// Returns `InvalidEntity` if a required attribute is empty.
    fn encode(&self) -> DirectoryResult<AttributeMap>;
}

/// Converts a directory entry into an entity.
pub trait Decodable: DirectoryObject {
    /// Decodes an entry. Attributes outside the schema are ignored.
    ///
    /// ## Errors
    ///
    /// Returns `InvalidEntity` if a required attribute is missing or
    /// cannot be parsed.
    fn decode(entry: &DirectoryEntry) -> DirectoryResult<Self>;
}

/// Naming and search rules of an entity type.
pub trait DnBuildable: DirectoryObject {
    /// Scope used when searching for this type.
    const SEARCH_SCOPE: SearchScope;

    /// Relative DN of the entity's entry.
    fn rdn(&self) -> DirectoryResult<String>;

    /// DN of the container the entry lives in.
    fn parent_dn(&self, layout: &DirectoryLayout) -> DirectoryResult<String>;

    /// Full DN of the entity's entry.
    fn dn(&self, layout: &DirectoryLayout) -> DirectoryResult<String> {
        Ok(dn::child(&self.rdn()?, &self.parent_dn(layout)?))
    }

    /// Default search base for templates of this type.
    fn search_base(&self, layout: &DirectoryLayout) -> String;

    /// Identifying `(attribute, value)` pairs; empty values are "absent".
    fn identity_terms(&self) -> Vec<(&'static str, &str)>;
}

// ============================================================================
// Encoding helpers
// ============================================================================

/// Formats a timestamp as `GeneralizedTime`.
///
/// Sub-second precision is written as a fraction only when present.
#[must_use]
pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    if ts.timestamp_subsec_nanos() == 0 {
        ts.format(TIMESTAMP_FORMAT).to_string()
    } else {
        ts.format(FRACTIONAL_TIMESTAMP_FORMAT).to_string()
    }
}

/// Parses a `GeneralizedTime` value (fractional seconds accepted).
#[must_use]
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(value, TIMESTAMP_FORMAT)
        .or_else(|_| NaiveDateTime::parse_from_str(value, FRACTIONAL_TIMESTAMP_FORMAT))
        .ok()
        .map(|naive| Utc.from_utc_datetime(&naive))
}

/// Fails with `InvalidEntity` if a required field is empty.
pub(crate) fn require<'a>(kind: EntityKind, field: &str, value: &'a str) -> DirectoryResult<&'a str> {
    if value.is_empty() {
        return Err(DirectoryError::invalid(kind, format!("{field} is required")));
    }
    Ok(value)
}

/// Accumulates the attributes of a new entry.
pub(crate) struct AttributeWriter {
    attributes: AttributeMap,
}

impl AttributeWriter {
    pub(crate) fn new(kind: EntityKind) -> Self {
        let mut attributes = AttributeMap::new();
        attributes.insert(
            OBJECT_CLASS.to_string(),
            vec![kind.object_class().to_string()],
        );
        Self { attributes }
    }

    pub(crate) fn put(mut self, name: &str, value: impl Into<String>) -> Self {
        self.attributes.insert(name.to_string(), vec![value.into()]);
        self
    }

    pub(crate) fn put_opt(self, name: &str, value: Option<impl Into<String>>) -> Self {
        match value {
            Some(value) => self.put(name, value),
            None => self,
        }
    }

    pub(crate) fn finish(self) -> AttributeMap {
        self.attributes
    }
}

// ============================================================================
// Decoding helpers
// ============================================================================

/// Typed access to the attributes of an entry being decoded.
pub(crate) struct EntryReader<'a> {
    entry: &'a DirectoryEntry,
    kind: EntityKind,
}

impl<'a> EntryReader<'a> {
    pub(crate) const fn new(entry: &'a DirectoryEntry, kind: EntityKind) -> Self {
        Self { entry, kind }
    }

    pub(crate) fn optional(&self, name: &str) -> Option<String> {
        self.entry.get_attr(name).map(String::from)
    }

    pub(crate) fn required(&self, name: &str) -> DirectoryResult<String> {
        self.optional(name)
            .ok_or_else(|| DirectoryError::missing_attribute(self.kind, name))
    }

    pub(crate) fn timestamp(&self, name: &str) -> DirectoryResult<DateTime<Utc>> {
        let value = self.required(name)?;
        parse_timestamp(&value).ok_or_else(|| self.malformed(name, &value))
    }

    pub(crate) fn optional_timestamp(&self, name: &str) -> DirectoryResult<Option<DateTime<Utc>>> {
        self.optional(name)
            .map(|value| parse_timestamp(&value).ok_or_else(|| self.malformed(name, &value)))
            .transpose()
    }

    pub(crate) fn count(&self, name: &str) -> DirectoryResult<u32> {
        let value = self.required(name)?;
        value.parse().map_err(|_| self.malformed(name, &value))
    }

    pub(crate) fn flag(&self, name: &str) -> DirectoryResult<bool> {
        let value = self.required(name)?;
        match value.to_ascii_lowercase().as_str() {
            "true" => Ok(true),
            "false" => Ok(false),
            _ => Err(self.malformed(name, &value)),
        }
    }

    fn malformed(&self, name: &str, value: &str) -> DirectoryError {
        DirectoryError::invalid(
            self.kind,
            format!("attribute '{name}' has malformed value '{value}'"),
        )
    }
}
