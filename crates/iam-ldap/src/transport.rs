//! Directory transport interface.
//!
//! The mapper only talks to the directory through [`DirectoryTransport`].
//! Transports are injected into [`LdapStore`](crate::store::LdapStore), so
//! the mapper can be exercised against [`InMemoryDirectory`](crate::memory::InMemoryDirectory)
//! without a live server.

use std::sync::Arc;

use async_trait::async_trait;

use crate::config::SearchScope;
use crate::entry::{AttributeMap, DirectoryEntry};
use crate::error::DirectoryResult;
use crate::filter::Filter;

/// Raw directory operations.
///
/// Implementations must be thread-safe; every call is one independent
/// request/response round trip.
#[async_trait]
pub trait DirectoryTransport: Send + Sync {
    /// Adds an entry.
    ///
    /// ## Errors
    ///
    /// Returns `DirectoryError::DuplicateEntry` if the DN already exists,
    /// `DirectoryError::Unavailable` on connectivity loss.
    async fn add(&self, dn: &str, attributes: &AttributeMap) -> DirectoryResult<()>;

    /// Searches for entries.
    ///
    /// Returns an empty vector when nothing matches, including when the
    /// base DN itself does not exist.
    async fn search(
        &self,
        base_dn: &str,
        scope: SearchScope,
        filter: &Filter,
        attributes: &[&str],
    ) -> DirectoryResult<Vec<DirectoryEntry>>;

    /// Deletes an entry.
    ///
    /// ## Errors
    ///
    /// Returns `DirectoryError::EntryNotFound` if the DN does not exist.
    async fn delete(&self, dn: &str) -> DirectoryResult<()>;
}

#[async_trait]
impl<T: DirectoryTransport + ?Sized> DirectoryTransport for Arc<T> {
    async fn add(&self, dn: &str, attributes: &AttributeMap) -> DirectoryResult<()> {
        (**self).add(dn, attributes).await
    }

    async fn search(
        &self,
        base_dn: &str,
        scope: SearchScope,
        filter: &Filter,
        attributes: &[&str],
    ) -> DirectoryResult<Vec<DirectoryEntry>> {
        (**self).search(base_dn, scope, filter, attributes).await
    }

    async fn delete(&self, dn: &str) -> DirectoryResult<()> {
        (**self).delete(dn).await
    }
}
