//! In-memory directory.
//!
//! A [`DirectoryTransport`] that keeps entries in process memory. It
//! evaluates filters and search scopes and enforces DN uniqueness, which is
//! enough to exercise [`LdapStore`](crate::store::LdapStore) without a
//! directory server. Parent entries are not required to exist.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use crate::config::SearchScope;
use crate::dn;
use crate::entry::{AttributeMap, DirectoryEntry};
use crate::error::{DirectoryError, DirectoryResult};
use crate::filter::Filter;
use crate::transport::DirectoryTransport;

/// In-memory directory keyed by normalized DN.
pub struct InMemoryDirectory {
    entries: RwLock<BTreeMap<String, DirectoryEntry>>,
    unavailable: AtomicBool,
}

impl InMemoryDirectory {
    /// Creates an empty directory.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(BTreeMap::new()),
            unavailable: AtomicBool::new(false),
        }
    }

    /// Simulates an outage. While set, every operation fails with
    /// `DirectoryError::Unavailable`.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Returns the stored entry for a DN, if any.
    pub async fn get(&self, dn: &str) -> Option<DirectoryEntry> {
        self.entries.read().await.get(&dn::normalize(dn)).cloned()
    }

    /// Returns the number of stored entries.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Returns `true` if no entries are stored.
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    fn check_available(&self) -> DirectoryResult<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(DirectoryError::unavailable("directory is offline"));
        }
        Ok(())
    }
}

impl Default for InMemoryDirectory {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DirectoryTransport for InMemoryDirectory {
    async fn add(&self, dn: &str, attributes: &AttributeMap) -> DirectoryResult<()> {
        self.check_available()?;

        let mut entries = self.entries.write().await;
        let key = dn::normalize(dn);
        if entries.contains_key(&key) {
            return Err(DirectoryError::duplicate(dn));
        }

        entries.insert(key, DirectoryEntry::new(dn, attributes.clone()));
        debug!(dn, "Entry added");
        Ok(())
    }

    async fn search(
        &self,
        base_dn: &str,
        scope: SearchScope,
        filter: &Filter,
        attributes: &[&str],
    ) -> DirectoryResult<Vec<DirectoryEntry>> {
        self.check_available()?;

        let entries = self.entries.read().await;
        Ok(entries
            .values()
            .filter(|entry| dn::in_scope(&entry.dn, base_dn, scope))
            .filter(|entry| filter.matches(entry))
            .map(|entry| entry.project(attributes))
            .collect())
    }

    async fn delete(&self, dn: &str) -> DirectoryResult<()> {
        self.check_available()?;

        match self.entries.write().await.remove(&dn::normalize(dn)) {
            Some(_) => {
                debug!(dn, "Entry deleted");
                Ok(())
            }
            None => Err(DirectoryError::not_found(dn)),
        }
    }
}
