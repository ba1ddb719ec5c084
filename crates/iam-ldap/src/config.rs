//! Directory connection configuration.
//!
//! ## Security Requirements
//!
//! Only LDAPS (LDAP over TLS) is supported.
//!
//! - Connection URLs MUST start with `ldaps://`
//! - STARTTLS is NOT supported (vulnerable to downgrade attacks)
//! - Plain `ldap://` is NOT supported (credentials transmitted in cleartext)

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::dn::{DirectoryLayout, DEFAULT_SUFFIX};
use crate::error::{DirectoryError, DirectoryResult};

/// Environment variable prefix read by [`DirectoryConfig::from_env`].
pub const ENV_PREFIX: &str = "IAM_LDAP_";

// ============================================================================
// Search Scope
// ============================================================================

/// LDAP search scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SearchScope {
    /// Search only the base DN.
    Base,
    /// Search one level below the base DN.
    OneLevel,
    /// Search the entire subtree.
    #[default]
    Subtree,
}

impl SearchScope {
    /// Converts to ldap3 scope.
    #[must_use]
    pub const fn to_ldap3(self) -> ldap3::Scope {
        match self {
            Self::Base => ldap3::Scope::Base,
            Self::OneLevel => ldap3::Scope::OneLevel,
            Self::Subtree => ldap3::Scope::Subtree,
        }
    }
}

// ============================================================================
// Directory Configuration
// ============================================================================

/// Directory transport configuration.
///
/// ## Security Requirements
///
/// The `connection_url` MUST use the `ldaps://` scheme.
#[derive(Clone, Serialize, Deserialize)]
pub struct DirectoryConfig {
    // === Connection ===
    /// LDAP server URL (MUST be ldaps://).
    pub connection_url: String,

    /// Bind DN for the service account.
    pub bind_dn: String,

    /// Bind credential (password).
    #[serde(skip_serializing)]
    pub bind_credential: String,

    // === TLS ===
    /// Whether to validate server certificates.
    pub validate_certificates: bool,

    // === Directory Structure ===
    /// Suffix under which all IAM entries live.
    pub base_dn: String,

    // === Connection Pool ===
    /// Maximum concurrent operations on the shared connection.
    pub pool_max_size: usize,

    /// Connection timeout.
    #[serde(with = "duration_secs")]
    pub connection_timeout: Duration,

    /// Timeout applied to every add/search/delete.
    #[serde(with = "duration_secs")]
    pub operation_timeout: Duration,
}

impl fmt::Debug for DirectoryConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DirectoryConfig")
            .field("connection_url", &self.connection_url)
            .field("bind_dn", &self.bind_dn)
            .field("bind_credential", &"<redacted>")
            .field("validate_certificates", &self.validate_certificates)
            .field("base_dn", &self.base_dn)
            .field("pool_max_size", &self.pool_max_size)
            .field("connection_timeout", &self.connection_timeout)
            .field("operation_timeout", &self.operation_timeout)
            .finish()
    }
}

impl DirectoryConfig {
    /// Creates a new configuration builder.
    #[must_use]
    pub fn builder() -> DirectoryConfigBuilder {
        DirectoryConfigBuilder::new()
    }

    /// Loads configuration from `IAM_LDAP_*` environment variables.
    ///
    /// Required: `IAM_LDAP_URL`, `IAM_LDAP_BIND_DN`, `IAM_LDAP_BIND_PASSWORD`.
    /// Optional: `IAM_LDAP_BASE_DN`, `IAM_LDAP_POOL_MAX_SIZE`,
    /// `IAM_LDAP_CONNECT_TIMEOUT_SECS`, `IAM_LDAP_OPERATION_TIMEOUT_SECS`,
    /// `IAM_LDAP_VALIDATE_CERTIFICATES`.
    pub fn from_env() -> DirectoryResult<Self> {
        Self::from_lookup(|key| std::env::var(format!("{ENV_PREFIX}{key}")).ok())
    }

    /// Builds configuration from a key lookup (keys without the prefix).
    pub fn from_lookup<F>(lookup: F) -> DirectoryResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| {
            lookup(key).ok_or_else(|| DirectoryError::config(format!("{ENV_PREFIX}{key} is required")))
        };
        let parsed = |key: &str| -> DirectoryResult<Option<u64>> {
            lookup(key)
                .map(|v| {
                    v.parse::<u64>().map_err(|_| {
                        DirectoryError::config(format!("{ENV_PREFIX}{key} must be a number"))
                    })
                })
                .transpose()
        };

        let mut builder = DirectoryConfigBuilder::new()
            .connection_url(required("URL")?)
            .bind_dn(required("BIND_DN")?)
            .bind_credential(required("BIND_PASSWORD")?);

        if let Some(base_dn) = lookup("BASE_DN") {
            builder = builder.base_dn(base_dn);
        }
        if let Some(size) = parsed("POOL_MAX_SIZE")? {
            builder = builder.pool_max_size(usize::try_from(size).unwrap_or(usize::MAX));
        }
        if let Some(secs) = parsed("CONNECT_TIMEOUT_SECS")? {
            builder = builder.connection_timeout(Duration::from_secs(secs));
        }
        if let Some(secs) = parsed("OPERATION_TIMEOUT_SECS")? {
            builder = builder.operation_timeout(Duration::from_secs(secs));
        }
        if let Some(flag) = lookup("VALIDATE_CERTIFICATES") {
            builder = builder.validate_certificates(!matches!(
                flag.to_ascii_lowercase().as_str(),
                "false" | "0" | "no"
            ));
        }

        builder.build()
    }

    /// Validates the configuration.
    ///
    /// ## Security
    ///
    /// This method enforces LDAPS-only connections.
    pub fn validate(&self) -> DirectoryResult<()> {
        validate_ldaps_url(&self.connection_url)?;

        if self.bind_dn.is_empty() {
            return Err(DirectoryError::config("bind_dn cannot be empty"));
        }

        if self.base_dn.is_empty() {
            return Err(DirectoryError::config("base_dn cannot be empty"));
        }

        if self.pool_max_size == 0 {
            return Err(DirectoryError::config("pool_max_size must be at least 1"));
        }

        if self.operation_timeout.is_zero() {
            return Err(DirectoryError::config("operation_timeout must be positive"));
        }

        Ok(())
    }

    /// Returns the DN layout rooted at the configured base DN.
    #[must_use]
    pub fn layout(&self) -> DirectoryLayout {
        DirectoryLayout::new(self.base_dn.clone())
    }
}

/// Validates that a URL uses LDAPS.
fn validate_ldaps_url(url: &str) -> DirectoryResult<()> {
    let url_lower = url.to_lowercase();

    if !url_lower.starts_with("ldaps://") {
        return Err(DirectoryError::InsecureProtocol);
    }

    // "ldaps://" is 8 chars
    if url.len() <= 8 {
        return Err(DirectoryError::config("Invalid LDAPS URL: missing host"));
    }

    Ok(())
}

mod duration_secs {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_secs())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_secs)
    }
}

// ============================================================================
// Configuration Builder
// ============================================================================

/// Builder for directory configuration.
#[derive(Default)]
pub struct DirectoryConfigBuilder {
    connection_url: Option<String>,
    bind_dn: Option<String>,
    bind_credential: Option<String>,
    validate_certificates: bool,
    base_dn: String,
    pool_max_size: usize,
    connection_timeout: Duration,
    operation_timeout: Duration,
}

impl DirectoryConfigBuilder {
    /// Creates a new builder with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self {
            validate_certificates: true,
            base_dn: DEFAULT_SUFFIX.to_string(),
            pool_max_size: 10,
            connection_timeout: Duration::from_secs(5),
            operation_timeout: Duration::from_secs(30),
            ..Default::default()
        }
    }

    /// Sets the connection URL (must be ldaps://).
    #[must_use]
    pub fn connection_url(mut self, url: impl Into<String>) -> Self {
        self.connection_url = Some(url.into());
        self
    }

    /// Sets the bind DN.
    #[must_use]
    pub fn bind_dn(mut self, dn: impl Into<String>) -> Self {
        self.bind_dn = Some(dn.into());
        self
    }

    /// Sets the bind credential (password).
    #[must_use]
    pub fn bind_credential(mut self, credential: impl Into<String>) -> Self {
        self.bind_credential = Some(credential.into());
        self
    }

    /// Sets whether to validate certificates.
    #[must_use]
    pub const fn validate_certificates(mut self, validate: bool) -> Self {
        self.validate_certificates = validate;
        self
    }

    /// Sets the base DN (directory suffix).
    #[must_use]
    pub fn base_dn(mut self, dn: impl Into<String>) -> Self {
        self.base_dn = dn.into();
        self
    }

    /// Sets the maximum number of concurrent operations.
    #[must_use]
    pub const fn pool_max_size(mut self, max: usize) -> Self {
        self.pool_max_size = max;
        self
    }

    /// Sets the connection timeout.
    #[must_use]
    pub const fn connection_timeout(mut self, timeout: Duration) -> Self {
        self.connection_timeout = timeout;
        self
    }

    /// Sets the per-operation timeout.
    #[must_use]
    pub const fn operation_timeout(mut self, timeout: Duration) -> Self {
        self.operation_timeout = timeout;
        self
    }

    /// Builds and validates the configuration.
    ///
    /// ## Errors
    ///
    /// Returns an error if:
    /// - Required fields are missing
    /// - Connection URL does not use LDAPS
    pub fn build(self) -> DirectoryResult<DirectoryConfig> {
        let config = DirectoryConfig {
            connection_url: self
                .connection_url
                .ok_or_else(|| DirectoryError::config("connection_url is required"))?,
            bind_dn: self
                .bind_dn
                .ok_or_else(|| DirectoryError::config("bind_dn is required"))?,
            bind_credential: self
                .bind_credential
                .ok_or_else(|| DirectoryError::config("bind_credential is required"))?,
            validate_certificates: self.validate_certificates,
            base_dn: self.base_dn,
            pool_max_size: self.pool_max_size,
            connection_timeout: self.connection_timeout,
            operation_timeout: self.operation_timeout,
        };

        config.validate()?;

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn builder() -> DirectoryConfigBuilder {
        DirectoryConfig::builder()
            .connection_url("ldaps://ldap.example.com:636")
            .bind_dn("cn=admin,dc=seagate,dc=com")
            .bind_credential("password")
    }

    #[test]
    fn rejects_ldap_url() {
        let result = builder().connection_url("ldap://ldap.example.com:389").build();

        assert!(matches!(result, Err(DirectoryError::InsecureProtocol)));
    }

    #[test]
    fn debug_redacts_credential() {
        let config = builder().bind_credential("s3cr3t").build().unwrap();
        let rendered = format!("{config:?}");

        assert!(!rendered.contains("s3cr3t"));
        assert!(rendered.contains("cn=admin"));
    }

    #[test]
    fn rejects_url_without_host() {
        let result = builder().connection_url("ldaps://").build();
        assert!(matches!(result, Err(DirectoryError::Configuration(_))));
    }

    #[test]
    fn accepts_ldaps_url_with_defaults() {
        let config = builder().build().unwrap();

        assert_eq!(config.base_dn, DEFAULT_SUFFIX);
        assert_eq!(config.pool_max_size, 10);
        assert!(config.validate_certificates);
        assert_eq!(config.layout().suffix(), DEFAULT_SUFFIX);
    }

    #[test]
    fn missing_credential_is_rejected() {
        let result = DirectoryConfig::builder()
            .connection_url("ldaps://ldap.example.com")
            .bind_dn("cn=admin")
            .build();

        assert!(result.is_err());
    }

    #[test]
    fn zero_pool_size_is_rejected() {
        assert!(builder().pool_max_size(0).build().is_err());
    }

    #[test]
    fn loads_from_lookup() {
        let vars: HashMap<&str, &str> = [
            ("URL", "ldaps://ldap.example.com"),
            ("BIND_DN", "cn=admin,dc=example,dc=com"),
            ("BIND_PASSWORD", "secret"),
            ("BASE_DN", "dc=example,dc=com"),
            ("OPERATION_TIMEOUT_SECS", "7"),
            ("VALIDATE_CERTIFICATES", "false"),
        ]
        .into_iter()
        .collect();

        let config =
            DirectoryConfig::from_lookup(|k| vars.get(k).map(|v| (*v).to_string())).unwrap();

        assert_eq!(config.base_dn, "dc=example,dc=com");
        assert_eq!(config.operation_timeout, Duration::from_secs(7));
        assert!(!config.validate_certificates);
    }

    #[test]
    fn lookup_rejects_bad_numbers() {
        let result = DirectoryConfig::from_lookup(|k| match k {
            "URL" => Some("ldaps://ldap.example.com".to_string()),
            "BIND_DN" => Some("cn=admin".to_string()),
            "BIND_PASSWORD" => Some("secret".to_string()),
            "POOL_MAX_SIZE" => Some("lots".to_string()),
            _ => None,
        });

        assert!(matches!(result, Err(DirectoryError::Configuration(_))));
    }

    #[test]
    fn credential_is_not_serialized() {
        let config = builder().build().unwrap();
        let json = serde_json::to_string(&config).unwrap();

        assert!(!json.contains("password"));
        assert!(json.contains("operation_timeout"));
    }
}
