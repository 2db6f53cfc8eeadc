//! Argon2id password hashing.

use crate::error::{RecapError, Result};
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

/// Hashes and verifies passwords as PHC strings.
#[derive(Clone, Default)]
pub struct PasswordService {
    argon2: Argon2<'static>,
}

impl PasswordService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn hash(&self, password: &str) -> Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = self
            .argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| RecapError::PasswordHash(e.to_string()))?;
        Ok(hash.to_string())
    }

    /// [`hash`](Self::hash) on the blocking pool.
    pub async fn hash_off_thread(&self, password: &str) -> Result<String> {
        let service = self.clone();
        let password = password.to_string();
        tokio::task::spawn_blocking(move || service.hash(&password))
            .await
            .map_err(|e| RecapError::PasswordHash(format!("hashing aborted: {}", e)))?
    }

    /// [`verify`](Self::verify) on the blocking pool.
    pub async fn verify_off_thread(&self, password: &str, hash: &str) -> Result<bool> {
        let service = self.clone();
        let (password, hash) = (password.to_string(), hash.to_string());
        tokio::task::spawn_blocking(move || service.verify(&password, &hash))
            .await
            .map_err(|e| RecapError::PasswordHash(format!("verification aborted: {}", e)))?
    }

    /// Check `password` against a stored hash. A mismatch is `Ok(false)`.
    pub fn verify(&self, password: &str, hash: &str) -> Result<bool> {
        let parsed = PasswordHash::new(hash)
            .map_err(|e| RecapError::PasswordHash(format!("Invalid hash: {}", e)))?;

        match self.argon2.verify_password(password.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(e) => Err(RecapError::PasswordHash(e.to_string())),
        }
    }
}
