//! Directory error types.
//!
//! ## Security Note
//!
//! Error messages must not leak bind credentials.

use thiserror::Error;

use crate::codec::EntityKind;

/// Errors raised by the directory mapper and its transports.
#[derive(Debug, Error)]
pub enum DirectoryError {
    /// An entry with this DN already exists.
    #[error("Duplicate entry: {dn}")]
    DuplicateEntry {
        /// DN that collided.
        dn: String,
    },

    /// No entry exists at this DN.
    #[error("Entry not found: {dn}")]
    EntryNotFound {
        /// DN that was targeted.
        dn: String,
    },

    /// A search expected to match one entry matched several.
    #[error("Ambiguous {kind} lookup: {count} entries match {filter}")]
    AmbiguousResult {
        /// Entity type searched for.
        kind: EntityKind,
        /// Rendered search filter.
        filter: String,
        /// Number of entries that matched.
        count: usize,
    },

    /// The directory could not be reached or rejected the operation.
    #[error("Directory unavailable: {0}")]
    Unavailable(String),

    /// The operation did not complete within the configured timeout.
    #[error("Directory operation timed out")]
    Timeout,

    /// An entity or directory entry does not satisfy its type's schema.
    #[error("Invalid {kind}: {reason}")]
    InvalidEntity {
        /// Entity type being encoded or decoded.
        kind: EntityKind,
        /// What is missing or malformed.
        reason: String,
    },

    /// Invalid configuration.
    #[error("Directory configuration error: {0}")]
    Configuration(String),

    /// Connection URL must use LDAPS.
    #[error("Security error: Only LDAPS is supported. URL must start with 'ldaps://'. STARTTLS and plain LDAP are not allowed.")]
    InsecureProtocol,
}

impl DirectoryError {
    /// Creates a duplicate entry error.
    #[must_use]
    pub fn duplicate(dn: impl Into<String>) -> Self {
        Self::DuplicateEntry { dn: dn.into() }
    }

    /// Creates an entry not found error.
    #[must_use]
    pub fn not_found(dn: impl Into<String>) -> Self {
        Self::EntryNotFound { dn: dn.into() }
    }

    /// Creates an unavailable error.
    #[must_use]
    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::Unavailable(msg.into())
    }

    /// Creates an invalid entity error.
    #[must_use]
    pub fn invalid(kind: EntityKind, reason: impl Into<String>) -> Self {
        Self::InvalidEntity {
            kind,
            reason: reason.into(),
        }
    }

    /// Creates a missing attribute error.
    #[must_use]
    pub fn missing_attribute(kind: EntityKind, attribute: &str) -> Self {
        Self::invalid(kind, format!("missing required attribute '{attribute}'"))
    }

    /// Creates a configuration error.
    #[must_use]
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Checks if the directory could not serve the request.
    #[must_use]
    pub const fn is_unavailable(&self) -> bool {
        matches!(self, Self::Unavailable(_) | Self::Timeout)
    }

    /// Checks if this is a duplicate entry error.
    #[must_use]
    pub const fn is_duplicate(&self) -> bool {
        matches!(self, Self::DuplicateEntry { .. })
    }

    /// Checks if this is an entry not found error.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::EntryNotFound { .. })
    }

    /// Checks if this is an ambiguous result error.
    #[must_use]
    pub const fn is_ambiguous(&self) -> bool {
        matches!(self, Self::AmbiguousResult { .. })
    }

    /// Checks if this is an invalid entity error.
    #[must_use]
    pub const fn is_invalid_entity(&self) -> bool {
        matches!(self, Self::InvalidEntity { .. })
    }
}

impl From<ldap3::LdapError> for DirectoryError {
    fn from(err: ldap3::LdapError) -> Self {
        match err {
            ldap3::LdapError::Timeout { .. } => Self::Timeout,
            other => Self::Unavailable(other.to_string()),
        }
    }
}

/// Result type for directory operations.
pub type DirectoryResult<T> = Result<T, DirectoryError>;
