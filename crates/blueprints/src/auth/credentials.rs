//! Username/password verification.

use std::collections::HashMap;

use super::UserCredential;

/// Checks a submitted username/password pair.
///
/// Callers only see a yes/no answer, so the stored secret format can change
/// without touching them.
pub trait CredentialValidator: Send + Sync {
    fn is_valid(&self, username: &str, password: &str) -> bool;
}

#[derive(Debug, Clone)]
enum StoredSecret {
    /// Compared with plain string equality.
    Plaintext(String),
    /// Verified with bcrypt.
    Bcrypt(String),
}

impl StoredSecret {
    fn matches(&self, password: &str) -> bool {
        match self {
            StoredSecret::Plaintext(expected) => expected == password,
            StoredSecret::Bcrypt(hash) => bcrypt::verify(password, hash).unwrap_or(false),
        }
    }
}

/// Fixed user registry built once from configuration.
#[derive(Debug, Clone, Default)]
pub struct UserRegistry {
    users: HashMap<String, StoredSecret>,
}

impl UserRegistry {
    /// Build the registry. Entries without a secret are skipped; when both are
    /// set the hash wins. `AuthConfig::validate` rejects both cases upfront.
    pub fn new(users: &[UserCredential]) -> Self {
        let users = users
            .iter()
            .filter_map(|user| {
                let secret = match (&user.password_hash, &user.password) {
                    (Some(hash), _) => StoredSecret::Bcrypt(hash.clone()),
                    (None, Some(password)) => StoredSecret::Plaintext(password.clone()),
                    (None, None) => return None,
                };
                Some((user.username.clone(), secret))
            })
            .collect();

        Self { users }
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    pub fn contains(&self, username: &str) -> bool {
        self.users.contains_key(username)
    }
}

impl CredentialValidator for UserRegistry {
    fn is_valid(&self, username: &str, password: &str) -> bool {
        self.users
            .get(username)
            .is_some_and(|secret| secret.matches(password))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::AuthConfig;

    fn default_registry() -> UserRegistry {
        UserRegistry::new(&AuthConfig::default().users)
    }

    #[test]
    fn test_registered_users_accept_their_password() {
        let registry = default_registry();
        assert_eq!(registry.len(), 2);
        assert!(registry.is_valid("student", "student123"));
        assert!(registry.is_valid("assistant", "assistant123"));
    }

    #[test]
    fn test_wrong_password_is_rejected() {
        let registry = default_registry();
        assert!(!registry.is_valid("student", "wrongpass"));
        assert!(!registry.is_valid("student", "assistant123"));
        assert!(!registry.is_valid("assistant", ""));
        // Plain equality: no trimming or case folding.
        assert!(!registry.is_valid("student", "student123 "));
        assert!(!registry.is_valid("student", "STUDENT123"));
    }

    #[test]
    fn test_unknown_user_is_rejected() {
        let registry = default_registry();
        assert!(!registry.contains("architect"));
        assert!(!registry.is_valid("architect", "student123"));
        assert!(!registry.is_valid("", ""));
    }

    #[test]
    fn test_bcrypt_entries_verify() {
        let hash = bcrypt::hash("s3cret-pass", 4).expect("hash password");
        let registry = UserRegistry::new(&[UserCredential::hashed("auditor", &hash)]);

        assert!(registry.is_valid("auditor", "s3cret-pass"));
        assert!(!registry.is_valid("auditor", "wrong"));
        // The hash itself is not accepted as a password.
        assert!(!registry.is_valid("auditor", &hash));
    }

    #[test]
    fn test_entries_without_secret_are_skipped() {
        let registry = UserRegistry::new(&[UserCredential {
            username: "ghost".to_string(),
            password: None,
            password_hash: None,
        }]);
        assert!(registry.is_empty());
        assert!(!registry.is_valid("ghost", ""));
    }
}
