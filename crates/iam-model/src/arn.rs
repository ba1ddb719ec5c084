//! Amazon Resource Name formatting for IAM resources.

/// ARN partition and service prefix shared by all IAM resources.
pub const IAM_ARN_PREFIX: &str = "arn:aws:iam::";

/// Formats an IAM resource ARN.
///
/// `path` is expected to start and end with `/`; an empty path is treated
/// as the root path.
///
/// ```
/// use iam_model::arn::format_arn;
///
/// assert_eq!(
///     format_arn("A1234", "policy", "/", "policy1"),
///     "arn:aws:iam::A1234:policy/policy1"
/// );
/// ```
#[must_use]
pub fn format_arn(account_id: &str, resource_type: &str, path: &str, name: &str) -> String {
    let path = if path.is_empty() { crate::DEFAULT_PATH } else { path };
    format!("{IAM_ARN_PREFIX}{account_id}:{resource_type}{path}{name}")
}
