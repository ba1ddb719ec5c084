//! # iam-model
//!
//! Domain entities for the IAM service (Account, User, Policy).
//!
//! Entities are plain attribute bags. Empty string fields are treated as
//! "absent" when an entity is used as a search template, so every entity
//! implements `Default` and exposes `with_*` setters for building templates.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod account;
pub mod arn;
pub mod ids;
pub mod lookup;
pub mod policy;
pub mod user;

pub use account::Account;
pub use lookup::Lookup;
pub use policy::Policy;
pub use user::User;

/// Default path for path-scoped entities (users, policies).
pub const DEFAULT_PATH: &str = "/";

/// Truncates a timestamp to whole seconds, the precision kept by the directory.
#[must_use]
pub fn truncate_to_seconds(ts: chrono::DateTime<chrono::Utc>) -> chrono::DateTime<chrono::Utc> {
    use chrono::SubsecRound;
    ts.trunc_subsecs(0)
}
