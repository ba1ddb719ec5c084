//! # iam-ldap
//!
//! Directory persistence for IAM entities.
//!
//! [`LdapStore`] maps accounts, users and policies to LDAP entries through a
//! [`DirectoryTransport`]. Two transports ship with the crate:
//!
//! - [`LdapTransport`]: LDAPS via `ldap3`, with a bounded connection pool
//! - [`InMemoryDirectory`]: process-local directory for tests and development
//!
//! ## Security
//!
//! Only LDAPS is supported. Plain LDAP and STARTTLS URLs are rejected at
//! configuration time.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod codec;
pub mod config;
pub mod connection;
pub mod dn;
pub mod entry;
pub mod error;
pub mod filter;
pub mod memory;
pub mod store;
pub mod transport;

pub use codec::{Decodable, DirectoryObject, DnBuildable, Encodable, EntityKind};
pub use config::{DirectoryConfig, DirectoryConfigBuilder, SearchScope};
pub use connection::{LdapConnectionPool, LdapTransport};
pub use dn::DirectoryLayout;
pub use entry::{AttributeMap, DirectoryEntry};
pub use error::{DirectoryError, DirectoryResult};
pub use filter::Filter;
pub use memory::InMemoryDirectory;
pub use store::LdapStore;
pub use transport::DirectoryTransport;
