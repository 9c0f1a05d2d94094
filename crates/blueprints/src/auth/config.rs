//! Authentication configuration.

use std::collections::HashSet;
use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Token lifetime used when `token_ttl_seconds` is unset.
pub const DEFAULT_TOKEN_TTL_SECONDS: u64 = 3600;

/// Authentication configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Value of the `iss` claim on issued tokens. Verified tokens must match.
    pub issuer: String,

    /// Token lifetime in seconds. Falls back to one hour when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_ttl_seconds: Option<u64>,

    /// RSA private key used to sign tokens.
    /// A PEM file path, inline PEM, or `env:VAR_NAME`.
    pub private_key: String,

    /// RSA public key used to verify tokens.
    /// A PEM file path, inline PEM, or `env:VAR_NAME`.
    pub public_key: String,

    /// Users allowed to log in.
    pub users: Vec<UserCredential>,

    /// Allowed CORS origins. If empty, cross-origin requests are denied.
    pub allowed_origins: Vec<String>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            issuer: "blueprints-api".to_string(),
            token_ttl_seconds: None,
            private_key: "keys/private.pem".to_string(),
            public_key: "keys/public.pem".to_string(),
            users: vec![
                UserCredential::plaintext("student", "student123"),
                UserCredential::plaintext("assistant", "assistant123"),
            ],
            allowed_origins: vec![
                "http://localhost:3000".to_string(),
                "http://localhost:8080".to_string(),
            ],
        }
    }
}

impl AuthConfig {
    /// Effective token lifetime in seconds.
    pub fn ttl_seconds(&self) -> u64 {
        self.token_ttl_seconds.unwrap_or(DEFAULT_TOKEN_TTL_SECONDS)
    }

    /// Resolve the private key to PEM text.
    pub fn resolve_private_key(&self) -> Result<String, ConfigValidationError> {
        resolve_pem("private_key", &self.private_key)
    }

    /// Resolve the public key to PEM text.
    pub fn resolve_public_key(&self) -> Result<String, ConfigValidationError> {
        resolve_pem("public_key", &self.public_key)
    }

    /// Validate the configuration.
    ///
    /// Keys are only checked for presence here; parsing happens when the
    /// key pair is loaded.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.issuer.trim().is_empty() {
            return Err(ConfigValidationError::MissingIssuer);
        }

        if self.token_ttl_seconds == Some(0) {
            return Err(ConfigValidationError::InvalidTokenTtl);
        }

        if self.private_key.trim().is_empty() {
            return Err(ConfigValidationError::MissingKey("private_key".to_string()));
        }
        if self.public_key.trim().is_empty() {
            return Err(ConfigValidationError::MissingKey("public_key".to_string()));
        }

        if self.users.is_empty() {
            return Err(ConfigValidationError::NoUsers);
        }

        let mut seen = HashSet::new();
        for user in &self.users {
            if user.username.is_empty() {
                return Err(ConfigValidationError::EmptyUsername);
            }
            if !seen.insert(user.username.as_str()) {
                return Err(ConfigValidationError::DuplicateUser(user.username.clone()));
            }
            match (&user.password, &user.password_hash) {
                (Some(_), None) | (None, Some(_)) => {}
                _ => {
                    return Err(ConfigValidationError::AmbiguousSecret(
                        user.username.clone(),
                    ));
                }
            }
        }

        Ok(())
    }
}

/// Resolve a key setting to PEM text.
///
/// Inline PEM is returned as is, `env:VAR_NAME` reads the variable, anything
/// else is treated as a file path (with `~` and `$VAR` expansion).
fn resolve_pem(field: &str, value: &str) -> Result<String, ConfigValidationError> {
    let value = value.trim();

    if value.starts_with("-----BEGIN") {
        return Ok(value.to_string());
    }

    if let Some(var_name) = value.strip_prefix("env:") {
        return match std::env::var(var_name) {
            Ok(pem) if !pem.trim().is_empty() => Ok(pem),
            Ok(_) => Err(ConfigValidationError::EnvVarEmpty(var_name.to_string())),
            Err(_) => Err(ConfigValidationError::EnvVarNotFound(var_name.to_string())),
        };
    }

    let path = shellexpand::full(value)
        .map(|p| PathBuf::from(p.into_owned()))
        .unwrap_or_else(|_| PathBuf::from(value));

    std::fs::read_to_string(&path).map_err(|e| ConfigValidationError::KeyNotReadable {
        field: field.to_string(),
        path,
        reason: e.to_string(),
    })
}

/// Configuration validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigValidationError {
    /// Issuer must not be empty.
    MissingIssuer,
    /// Token TTL must be positive.
    InvalidTokenTtl,
    /// A key setting is empty.
    MissingKey(String),
    /// A key file could not be read.
    KeyNotReadable {
        field: String,
        path: PathBuf,
        reason: String,
    },
    /// A key could not be parsed as RSA PEM.
    InvalidKey { field: String, reason: String },
    /// The private key does not match the public key.
    KeyPairMismatch,
    /// At least one user is required.
    NoUsers,
    /// A user has an empty username.
    EmptyUsername,
    /// The same username appears twice.
    DuplicateUser(String),
    /// A user needs exactly one of `password` or `password_hash`.
    AmbiguousSecret(String),
    /// Environment variable not found (for `env:VAR_NAME` syntax).
    EnvVarNotFound(String),
    /// Environment variable is empty (for `env:VAR_NAME` syntax).
    EnvVarEmpty(String),
}

impl fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingIssuer => write!(f, "auth.issuer must not be empty."),
            Self::InvalidTokenTtl => {
                write!(f, "auth.token_ttl_seconds must be greater than zero.")
            }
            Self::MissingKey(field) => write!(f, "auth.{} must be configured.", field),
            Self::KeyNotReadable {
                field,
                path,
                reason,
            } => write!(
                f,
                "Cannot read auth.{} from '{}': {}",
                field,
                path.display(),
                reason
            ),
            Self::InvalidKey { field, reason } => {
                write!(f, "auth.{} is not a valid RSA PEM key: {}", field, reason)
            }
            Self::KeyPairMismatch => write!(
                f,
                "auth.private_key and auth.public_key do not belong to the same key pair."
            ),
            Self::NoUsers => write!(f, "auth.users must contain at least one user."),
            Self::EmptyUsername => write!(f, "auth.users contains an empty username."),
            Self::DuplicateUser(name) => {
                write!(f, "auth.users lists '{}' more than once.", name)
            }
            Self::AmbiguousSecret(name) => write!(
                f,
                "User '{}' must set exactly one of password or password_hash.",
                name
            ),
            Self::EnvVarNotFound(var) => write!(
                f,
                "Environment variable '{}' not found (referenced via env:{} in config).",
                var, var
            ),
            Self::EnvVarEmpty(var) => write!(
                f,
                "Environment variable '{}' is empty (referenced via env:{} in config).",
                var, var
            ),
        }
    }
}

impl std::error::Error for ConfigValidationError {}

/// A user allowed to log in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserCredential {
    /// Login name, also used as the token subject.
    pub username: String,
    /// Plaintext password.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    /// Password hash (bcrypt).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password_hash: Option<String>,
}

impl UserCredential {
    pub fn plaintext(username: &str, password: &str) -> Self {
        Self {
            username: username.to_string(),
            password: Some(password.to_string()),
            password_hash: None,
        }
    }

    pub fn hashed(username: &str, password_hash: &str) -> Self {
        Self {
            username: username.to_string(),
            password: None,
            password_hash: Some(password_hash.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_config_default() {
        let config = AuthConfig::default();
        assert_eq!(config.issuer, "blueprints-api");
        assert!(config.token_ttl_seconds.is_none());
        assert_eq!(config.ttl_seconds(), 3600);
        assert_eq!(config.users.len(), 2);
        assert_eq!(config.users[0].username, "student");
        assert_eq!(config.users[1].username, "assistant");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_configured_ttl_wins() {
        let config = AuthConfig {
            token_ttl_seconds: Some(60),
            ..AuthConfig::default()
        };
        assert_eq!(config.ttl_seconds(), 60);
    }

    #[test]
    fn test_validation_rejects_zero_ttl() {
        let config = AuthConfig {
            token_ttl_seconds: Some(0),
            ..AuthConfig::default()
        };
        assert_eq!(
            config.validate().unwrap_err(),
            ConfigValidationError::InvalidTokenTtl
        );
    }

    #[test]
    fn test_validation_rejects_empty_issuer() {
        let config = AuthConfig {
            issuer: "  ".to_string(),
            ..AuthConfig::default()
        };
        assert_eq!(
            config.validate().unwrap_err(),
            ConfigValidationError::MissingIssuer
        );
    }

    #[test]
    fn test_validation_rejects_duplicate_users() {
        let config = AuthConfig {
            users: vec![
                UserCredential::plaintext("student", "a"),
                UserCredential::plaintext("student", "b"),
            ],
            ..AuthConfig::default()
        };
        assert_eq!(
            config.validate().unwrap_err(),
            ConfigValidationError::DuplicateUser("student".to_string())
        );
    }

    #[test]
    fn test_validation_requires_exactly_one_secret() {
        let neither = UserCredential {
            username: "ghost".to_string(),
            password: None,
            password_hash: None,
        };
        let both = UserCredential {
            username: "twice".to_string(),
            password: Some("a".to_string()),
            password_hash: Some("$2b$04$abc".to_string()),
        };

        for user in [neither, both] {
            let name = user.username.clone();
            let config = AuthConfig {
                users: vec![user],
                ..AuthConfig::default()
            };
            assert_eq!(
                config.validate().unwrap_err(),
                ConfigValidationError::AmbiguousSecret(name)
            );
        }
    }

    #[test]
    fn test_validation_rejects_no_users() {
        let config = AuthConfig {
            users: Vec::new(),
            ..AuthConfig::default()
        };
        assert_eq!(config.validate().unwrap_err(), ConfigValidationError::NoUsers);
    }

    #[test]
    fn test_resolve_inline_pem() {
        let config = AuthConfig {
            public_key: "-----BEGIN PUBLIC KEY-----\nabc\n-----END PUBLIC KEY-----".to_string(),
            ..AuthConfig::default()
        };
        assert!(config.resolve_public_key().unwrap().contains("abc"));
    }

    #[test]
    fn test_resolve_key_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("public.pem");
        std::fs::write(&path, "-----BEGIN PUBLIC KEY-----\nxyz\n").unwrap();

        let config = AuthConfig {
            public_key: path.display().to_string(),
            ..AuthConfig::default()
        };
        assert!(config.resolve_public_key().unwrap().contains("xyz"));
    }

    #[test]
    fn test_resolve_missing_key_file() {
        let config = AuthConfig {
            private_key: "/nonexistent/blueprints/private.pem".to_string(),
            ..AuthConfig::default()
        };
        assert!(matches!(
            config.resolve_private_key().unwrap_err(),
            ConfigValidationError::KeyNotReadable { .. }
        ));
    }

    #[test]
    fn test_resolve_missing_env_var() {
        let config = AuthConfig {
            private_key: "env:BLUEPRINTS_TEST_KEY_THAT_IS_NEVER_SET".to_string(),
            ..AuthConfig::default()
        };
        assert_eq!(
            config.resolve_private_key().unwrap_err(),
            ConfigValidationError::EnvVarNotFound(
                "BLUEPRINTS_TEST_KEY_THAT_IS_NEVER_SET".to_string()
            )
        );
    }
}
