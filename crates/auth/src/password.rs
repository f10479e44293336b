//! Password hashing (argon2id, salted).

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString},
    Argon2,
};

use devplan_core::{DomainError, DomainResult};

/// Password hashing contract.
///
/// Verification is boolean on purpose: callers must not be able to tell a
/// malformed hash apart from a wrong password.
pub trait PasswordHasher: Send + Sync {
    /// Hash a plaintext password with a fresh random salt.
    fn hash(&self, password: &str) -> DomainResult<String>;

    /// Verify a plaintext password against a stored hash.
    fn verify(&self, password: &str, hash: &str) -> bool;
}

/// Argon2id-based hasher using library default parameters.
#[derive(Debug, Clone, Default)]
pub struct Argon2Hasher;

impl Argon2Hasher {
    pub fn new() -> Self {
        Self
    }
}

impl PasswordHasher for Argon2Hasher {
    fn hash(&self, password: &str) -> DomainResult<String> {
        if password.is_empty() {
            return Err(DomainError::validation("password cannot be empty"));
        }

        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| DomainError::validation(format!("failed to hash password: {e}")))
    }

    fn verify(&self, password: &str, hash: &str) -> bool {
        let Ok(parsed) = PasswordHash::new(hash) else {
            return false;
        };

        Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_and_verify() {
        let hasher = Argon2Hasher::new();
        let hash = hasher.hash("correct horse battery staple").unwrap();

        assert!(hasher.verify("correct horse battery staple", &hash));
        assert!(!hasher.verify("wrong password", &hash));
    }

    #[test]
    fn salts_are_unique() {
        let hasher = Argon2Hasher::new();
        let h1 = hasher.hash("password").unwrap();
        let h2 = hasher.hash("password").unwrap();

        assert_ne!(h1, h2);
        assert!(hasher.verify("password", &h1));
        assert!(hasher.verify("password", &h2));
    }

    #[test]
    fn malformed_hash_never_verifies() {
        let hasher = Argon2Hasher::new();
        assert!(!hasher.verify("password", "not-a-phc-string"));
        assert!(!hasher.verify("password", ""));
    }

    #[test]
    fn empty_password_rejected() {
        let err = Argon2Hasher::new().hash("").unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }
}
