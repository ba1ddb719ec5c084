//! LDAPS transport backed by `ldap3`.
//!
//! ## Security Requirements
//!
//! All connections use LDAPS (TLS from connection start).
//! STARTTLS is NOT supported to prevent downgrade attacks.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use ldap3::{Ldap, LdapConnAsync, LdapConnSettings, SearchEntry, SearchResult};
use tokio::sync::{OwnedSemaphorePermit, RwLock, Semaphore};
use tracing::{debug, info, warn};

use crate::config::{DirectoryConfig, SearchScope};
use crate::entry::{AttributeMap, DirectoryEntry};
use crate::error::{DirectoryError, DirectoryResult};
use crate::filter::Filter;
use crate::transport::DirectoryTransport;

/// LDAP result code: success.
const RC_SUCCESS: u32 = 0;
/// LDAP result code: size limit exceeded (partial results returned).
const RC_SIZE_LIMIT_EXCEEDED: u32 = 4;
/// LDAP result code: referral.
const RC_REFERRAL: u32 = 10;
/// LDAP result code: no such object.
const RC_NO_SUCH_OBJECT: u32 = 32;
/// LDAP result code: entry already exists.
const RC_ALREADY_EXISTS: u32 = 68;

/// Connection pool for LDAPS connections.
///
/// `ldap3` handles multiplex requests over one connection, so the pool keeps
/// a single cached handle and bounds the number of in-flight operations with
/// a semaphore. The handle is dropped after a transport failure and
/// re-established on the next request.
pub struct LdapConnectionPool {
    config: Arc<DirectoryConfig>,
    semaphore: Arc<Semaphore>,
    connection: RwLock<Option<Ldap>>,
}

impl LdapConnectionPool {
    /// Creates a new connection pool.
    ///
    /// ## Errors
    ///
    /// Returns an error if the configuration is invalid or not LDAPS.
    pub fn new(config: DirectoryConfig) -> DirectoryResult<Self> {
        config.validate()?;
        let max_size = config.pool_max_size;
        Ok(Self {
            config: Arc::new(config),
            semaphore: Arc::new(Semaphore::new(max_size)),
            connection: RwLock::new(None),
        })
    }

    /// Gets a connection handle, connecting and binding if necessary.
    pub async fn get(&self) -> DirectoryResult<LdapConnection> {
        let permit = self
            .semaphore
            .clone()
            .acquire_owned()
            .await
            .map_err(|_| DirectoryError::unavailable("connection pool closed"))?;

        if let Some(ldap) = self.connection.read().await.as_ref() {
            return Ok(LdapConnection::new(ldap.clone(), permit, &self.config));
        }

        let mut guard = self.connection.write().await;
        let ldap = match guard.as_ref() {
            Some(ldap) => ldap.clone(),
            None => {
                let ldap = self.create_connection().await?;
                *guard = Some(ldap.clone());
                ldap
            }
        };

        Ok(LdapConnection::new(ldap, permit, &self.config))
    }

    /// Drops the cached connection so the next request reconnects.
    pub async fn invalidate(&self) {
        self.connection.write().await.take();
    }

    /// Creates a new LDAPS connection bound as the service account.
    async fn create_connection(&self) -> DirectoryResult<Ldap> {
        let settings = LdapConnSettings::new()
            .set_conn_timeout(self.config.connection_timeout)
            .set_no_tls_verify(!self.config.validate_certificates);

        debug!(url = %self.config.connection_url, "Connecting to LDAP server");

        let (conn, mut ldap) =
            LdapConnAsync::with_settings(settings, &self.config.connection_url)
                .await
                .map_err(|e| DirectoryError::unavailable(format!("connection failed: {e}")))?;

        tokio::spawn(async move {
            if let Err(e) = conn.drive().await {
                warn!(error = %e, "LDAP connection driver error");
            }
        });

        let result = ldap
            .with_timeout(self.config.operation_timeout)
            .simple_bind(&self.config.bind_dn, &self.config.bind_credential)
            .await?;

        if result.rc != RC_SUCCESS {
            return Err(DirectoryError::unavailable(format!(
                "bind as {} failed with code {}",
                self.config.bind_dn, result.rc
            )));
        }

        info!(url = %self.config.connection_url, "LDAP connection established");

        Ok(ldap)
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &DirectoryConfig {
        &self.config
    }
}

/// A connection handle checked out of the pool.
///
/// Holds a pool permit until dropped.
pub struct LdapConnection {
    ldap: Ldap,
    _permit: OwnedSemaphorePermit,
}

impl LdapConnection {
    fn new(mut ldap: Ldap, permit: OwnedSemaphorePermit, config: &DirectoryConfig) -> Self {
        ldap.with_timeout(config.operation_timeout);
        Self {
            ldap,
            _permit: permit,
        }
    }

    /// Returns a mutable reference to the LDAP handle.
    ///
    /// The configured operation timeout applies to the next request.
    #[must_use]
    pub fn ldap_mut(&mut self) -> &mut Ldap {
        &mut self.ldap
    }
}

// ============================================================================
// LDAP Transport
// ============================================================================

/// [`DirectoryTransport`] over LDAPS.
pub struct LdapTransport {
    pool: LdapConnectionPool,
}

impl LdapTransport {
    /// Creates a transport for the given configuration.
    ///
    /// No connection is opened until the first operation.
    pub fn new(config: DirectoryConfig) -> DirectoryResult<Self> {
        Ok(Self {
            pool: LdapConnectionPool::new(config)?,
        })
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &DirectoryConfig {
        self.pool.config()
    }

    /// Verifies connectivity with a base-scoped search of the suffix.
    pub async fn test_connection(&self) -> DirectoryResult<()> {
        let filter = Filter::present("objectClass");
        self.search(&self.config().base_dn, SearchScope::Base, &filter, &["1.1"])
            .await
            .map(|_| ())
    }

    /// Maps a transport-level failure, dropping the cached connection.
    async fn checked<T>(&self, outcome: Result<T, ldap3::LdapError>) -> DirectoryResult<T> {
        match outcome {
            Ok(value) => Ok(value),
            Err(e) => {
                warn!(error = %e, "LDAP operation failed, resetting connection");
                self.pool.invalidate().await;
                Err(e.into())
            }
        }
    }
}

fn rejected(operation: &str, dn: &str, rc: u32, text: &str) -> DirectoryError {
    DirectoryError::unavailable(format!("{operation} of {dn} failed with code {rc}: {text}"))
}

#[async_trait]
impl DirectoryTransport for LdapTransport {
    async fn add(&self, dn: &str, attributes: &AttributeMap) -> DirectoryResult<()> {
        let mut conn = self.pool.get().await?;

        let attrs: Vec<(&str, HashSet<&str>)> = attributes
            .iter()
            .map(|(name, values)| (name.as_str(), values.iter().map(String::as_str).collect()))
            .collect();

        let result = self.checked(conn.ldap_mut().add(dn, attrs).await).await?;

        match result.rc {
            RC_SUCCESS => Ok(()),
            RC_ALREADY_EXISTS => Err(DirectoryError::duplicate(dn)),
            rc => Err(rejected("add", dn, rc, &result.text)),
        }
    }

    async fn search(
        &self,
        base_dn: &str,
        scope: SearchScope,
        filter: &Filter,
        attributes: &[&str],
    ) -> DirectoryResult<Vec<DirectoryEntry>> {
        let mut conn = self.pool.get().await?;
        let filter = filter.to_string();

        let SearchResult(entries, result) = self
            .checked(
                conn.ldap_mut()
                    .search(base_dn, scope.to_ldap3(), &filter, attributes.to_vec())
                    .await,
            )
            .await?;

        match result.rc {
            RC_SUCCESS => {}
            RC_NO_SUCH_OBJECT => {
                debug!(base_dn, "Search base does not exist");
                return Ok(Vec::new());
            }
            RC_SIZE_LIMIT_EXCEEDED | RC_REFERRAL => {
                warn!(base_dn, %filter, rc = result.rc, "Search returned partial results");
            }
            rc => return Err(rejected("search", base_dn, rc, &result.text)),
        }

        Ok(entries
            .into_iter()
            .filter(|entry| {
                if entry.is_ref() {
                    debug!(base_dn, "Skipping search referral");
                    return false;
                }
                !entry.is_intermediate()
            })
            .map(SearchEntry::construct)
            .map(DirectoryEntry::from_search_entry)
            .collect())
    }

    async fn delete(&self, dn: &str) -> DirectoryResult<()> {
        let mut conn = self.pool.get().await?;
        let result = self.checked(conn.ldap_mut().delete(dn).await).await?;

        match result.rc {
            RC_SUCCESS => Ok(()),
            RC_NO_SUCH_OBJECT => Err(DirectoryError::not_found(dn)),
            rc => Err(rejected("delete", dn, rc, &result.text)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> DirectoryConfig {
        DirectoryConfig::builder()
            .connection_url("ldaps://ldap.example.com:636")
            .bind_dn("cn=admin,dc=seagate,dc=com")
            .bind_credential("password")
            .pool_max_size(5)
            .build()
            .unwrap()
    }

    #[test]
    fn pool_creation() {
        let pool = LdapConnectionPool::new(config()).unwrap();
        assert_eq!(pool.config().pool_max_size, 5);
    }

    #[test]
    fn pool_rejects_plain_ldap() {
        let mut config = config();
        config.connection_url = "ldap://ldap.example.com:389".to_string();

        assert!(matches!(
            LdapTransport::new(config),
            Err(DirectoryError::InsecureProtocol)
        ));
    }

    #[test]
    fn rejected_message_has_code_and_dn() {
        let err = rejected("add", "o=x", 65, "objectClass violation");
        let msg = err.to_string();

        assert!(err.is_unavailable());
        assert!(msg.contains("65"));
        assert!(msg.contains("o=x"));
    }
}
