//! Object-directory mapper.
//!
//! [`LdapStore`] persists typed entities as directory entries. The entity
//! type picks the schema: its [`DnBuildable`] impl names the entry and the
//! search, its [`Encodable`]/[`Decodable`] impls convert attributes. Every
//! operation is a single round trip through the injected
//! [`DirectoryTransport`]; nothing is cached or retried.
//!
//! ## Example
//!
//! ```rust,ignore
//! let store = LdapStore::new(InMemoryDirectory::new(), DirectoryLayout::default());
//!
//! store.save(&HashMap::new(), &policy).await?;
//!
//! let template = Policy::default()
//!     .with_name("policy1")
//!     .with_account_id("A1234");
//! assert!(store.find("", &template).await?.exists());
//! ```

use std::collections::HashMap;

use iam_model::Lookup;
use tracing::{debug, info, instrument, warn};

use crate::codec::{Decodable, DnBuildable, Encodable};
use crate::config::DirectoryConfig;
use crate::connection::LdapTransport;
use crate::dn::{self, DirectoryLayout};
use crate::entry::{self, DirectoryEntry, OBJECT_CLASS};
use crate::error::{DirectoryError, DirectoryResult};
use crate::filter::{search_filter, Filter};
use crate::transport::DirectoryTransport;

/// Maps entities to directory entries over a transport.
pub struct LdapStore<D> {
    transport: D,
    layout: DirectoryLayout,
}

impl LdapStore<LdapTransport> {
    /// Creates a store backed by an LDAPS transport.
    ///
    /// ## Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn connect(config: DirectoryConfig) -> DirectoryResult<Self> {
        let layout = config.layout();
        Ok(Self::new(LdapTransport::new(config)?, layout))
    }
}

impl<D: DirectoryTransport> LdapStore<D> {
    /// Creates a store over the given transport.
    #[must_use]
    pub const fn new(transport: D, layout: DirectoryLayout) -> Self {
        Self { transport, layout }
    }

    /// Returns the DN layout.
    #[must_use]
    pub const fn layout(&self) -> &DirectoryLayout {
        &self.layout
    }

    /// Returns the transport.
    #[must_use]
    pub const fn transport(&self) -> &D {
        &self.transport
    }

    /// Creates the entry for `entity`.
    ///
    /// `extra` attributes are written alongside the encoded ones. A key
    /// matching an encoded attribute (ignoring case) replaces its value,
    /// except `objectClass`, whose values are added to the type's own class.
    ///
    /// ## Errors
    ///
    /// - `InvalidEntity` if a required attribute is empty
    /// - `DuplicateEntry` if the entry already exists
    /// - `Unavailable`/`Timeout` if the directory cannot be reached
    #[instrument(skip_all, fields(kind = %T::KIND))]
    pub async fn save<T>(&self, extra: &HashMap<String, String>, entity: &T) -> DirectoryResult<()>
    where
        T: Encodable + DnBuildable,
    {
        let dn = entity.dn(&self.layout)?;
        let mut attributes = entity.encode()?;

        for (name, value) in extra {
            if name.eq_ignore_ascii_case(OBJECT_CLASS) {
                let classes = attributes.entry(OBJECT_CLASS.to_string()).or_default();
                if !classes.iter().any(|class| class.eq_ignore_ascii_case(value)) {
                    classes.push(value.clone());
                }
            } else {
                entry::remove_attr(&mut attributes, name);
                attributes.insert(name.clone(), vec![value.clone()]);
            }
        }

        debug!(%dn, attributes = attributes.len(), "Adding entry");

        self.transport
            .add(&dn, &attributes)
            .await
            .map_err(|e| rejected("save", e))?;

        info!(%dn, "Entry saved");
        Ok(())
    }

    /// Finds the single entity matching `template`.
    ///
    /// Non-empty fields of `template` form the search filter. An empty
    /// `base_dn` searches the type's default base.
    ///
    /// ## Errors
    ///
    /// - `AmbiguousResult` if more than one entry matches
    /// - `InvalidEntity` if the matching entry cannot be decoded
    /// - `Unavailable`/`Timeout` if the directory cannot be reached
    #[instrument(skip_all, fields(kind = %T::KIND))]
    pub async fn find<T>(&self, base_dn: &str, template: &T) -> DirectoryResult<Lookup<T>>
    where
        T: Decodable + DnBuildable,
    {
        let (filter, entries) = self.search(base_dn, template).await?;

        match entries.as_slice() {
            [] => {
                debug!(%filter, "No entry found");
                Ok(Lookup::NotFound)
            }
            [entry] => T::decode(entry).map(Lookup::Found),
            _ => {
                warn!(%filter, count = entries.len(), "Lookup matched more than one entry");
                Err(DirectoryError::AmbiguousResult {
                    kind: T::KIND,
                    filter: filter.to_string(),
                    count: entries.len(),
                })
            }
        }
    }

    /// Finds every entity matching `criteria`.
    ///
    /// The order is whatever the directory returns and is not stable
    /// across calls.
    ///
    /// ## Errors
    ///
    /// - `InvalidEntity` if a matching entry cannot be decoded
    /// - `Unavailable`/`Timeout` if the directory cannot be reached
    #[instrument(skip_all, fields(kind = %T::KIND))]
    pub async fn find_all<T>(&self, base_dn: &str, criteria: &T) -> DirectoryResult<Vec<T>>
    where
        T: Decodable + DnBuildable,
    {
        let (filter, entries) = self.search(base_dn, criteria).await?;
        debug!(%filter, count = entries.len(), "Search complete");

        entries.iter().map(T::decode).collect()
    }

    /// Deletes the entry for `entity`.
    ///
    /// The entry is looked for under `base_dn` when non-empty, else under
    /// the type's usual container.
    ///
    /// ## Errors
    ///
    /// - `EntryNotFound` if no entry exists
    /// - `Unavailable`/`Timeout` if the directory cannot be reached
    #[instrument(skip_all, fields(kind = %T::KIND))]
    pub async fn delete<T>(&self, base_dn: &str, entity: &T) -> DirectoryResult<()>
    where
        T: DnBuildable,
    {
        let dn = if base_dn.is_empty() {
            entity.dn(&self.layout)?
        } else {
            dn::child(&entity.rdn()?, base_dn)
        };

        debug!(%dn, "Deleting entry");

        self.transport
            .delete(&dn)
            .await
            .map_err(|e| rejected("delete", e))?;

        info!(%dn, "Entry deleted");
        Ok(())
    }

    async fn search<T>(
        &self,
        base_dn: &str,
        template: &T,
    ) -> DirectoryResult<(Filter, Vec<DirectoryEntry>)>
    where
        T: DnBuildable,
    {
        let base = if base_dn.is_empty() {
            template.search_base(&self.layout)
        } else {
            base_dn.to_string()
        };
        let filter = search_filter(template);

        debug!(%base, %filter, scope = ?T::SEARCH_SCOPE, "Searching");

        let entries = self
            .transport
            .search(&base, T::SEARCH_SCOPE, &filter, T::ATTRIBUTES)
            .await
            .map_err(|e| rejected("search", e))?;

        Ok((filter, entries))
    }
}

fn rejected(operation: &'static str, error: DirectoryError) -> DirectoryError {
    warn!(operation, error = %error, "Directory rejected request");
    error
}
