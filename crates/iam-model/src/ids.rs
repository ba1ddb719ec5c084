//! Identifier generation.
//!
//! User and policy IDs follow the AWS IAM convention of a four letter type
//! prefix followed by an upper-case alphanumeric body. Account IDs are
//! twelve digits.

use uuid::Uuid;

/// Prefix for user IDs.
pub const USER_PREFIX: &str = "AIDA";

/// Prefix for managed policy IDs.
pub const POLICY_PREFIX: &str = "ANPA";

fn generate(prefix: &str) -> String {
    let body = Uuid::now_v7().simple().to_string().to_uppercase();
    format!("{prefix}{body}")
}

/// Generates a new 12 digit account ID.
#[must_use]
pub fn new_account_id() -> String {
    let n = Uuid::now_v7().as_u128() % 1_000_000_000_000;
    format!("{n:012}")
}

/// Generates a new user ID.
#[must_use]
pub fn new_user_id() -> String {
    generate(USER_PREFIX)
}

/// Generates a new policy ID.
#[must_use]
pub fn new_policy_id() -> String {
    generate(POLICY_PREFIX)
}
