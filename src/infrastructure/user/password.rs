//! Account password storage
//!
//! Stored hashes are PHC strings (`$argon2id$...`) so parameters travel
//! with the hash. Logins for unknown usernames still pay for one
//! verification, keeping response times from revealing which accounts
//! exist.

use std::fmt::Debug;

use argon2::{
    password_hash::{
        rand_core::OsRng, PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString,
    },
    Argon2,
};
use once_cell::sync::Lazy;

use crate::domain::DomainError;

/// Hash checked against when the username does not exist
static ABSENT_ACCOUNT_HASH: Lazy<Option<String>> =
    Lazy::new(|| Argon2Hasher::new().hash("absent-account").ok());

/// Hashes and checks account passwords
pub trait PasswordHasher: Send + Sync + Debug {
    /// PHC-encoded hash for a new or changed password
    fn hash(&self, password: &str) -> Result<String, DomainError>;

    /// Whether `password` matches a stored hash. Malformed hashes never match.
    fn verify(&self, password: &str, hash: &str) -> bool;

    /// Do the work of a failed `verify` for a login naming no account
    fn verify_absent(&self, password: &str) {
        if let Some(hash) = ABSENT_ACCOUNT_HASH.as_deref() {
            let _ = self.verify(password, hash);
        }
    }
}

/// Argon2id with the crate's default parameters
#[derive(Debug, Clone, Default)]
pub struct Argon2Hasher;

impl Argon2Hasher {
    pub fn new() -> Self {
        Self
    }
}

impl PasswordHasher for Argon2Hasher {
    fn hash(&self, password: &str) -> Result<String, DomainError> {
        let salt = SaltString::generate(&mut OsRng);

        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| DomainError::internal(format!("Failed to hash password: {}", e)))
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
