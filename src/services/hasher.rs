//! Password hashing.

use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{self, PasswordHash, PasswordVerifier, SaltString, rand_core::OsRng},
};
use async_trait::async_trait;
use thiserror::Error;
use tokio::task;

use crate::config::SecurityConfig;

#[derive(Debug, Error)]
pub enum HashError {
    #[error("Password does not match")]
    Mismatch,

    #[error("Invalid hasher parameters: {0}")]
    Params(String),

    #[error("Malformed password digest: {0}")]
    Digest(String),

    #[error("Hashing failed: {0}")]
    Failed(String),

    #[error("Hashing task panicked")]
    Join(#[from] task::JoinError),
}

#[async_trait]
pub trait Hasher: Send + Sync {
    /// Produces a salted digest of `password`.
    async fn hash(&self, password: &str) -> Result<String, HashError>;

    /// Checks `password` against `digest`.
    ///
    /// # Errors
    ///
    /// Returns [`HashError::Mismatch`] when the password is wrong.
    async fn compare(&self, digest: &str, password: &str) -> Result<(), HashError>;
}

/// Argon2id with configurable cost. Hashing is CPU-bound, so both
/// operations run on the blocking pool.
#[derive(Debug, Clone)]
pub struct Argon2Hasher {
    params: Params,
}

impl Argon2Hasher {
    pub fn new(config: &SecurityConfig) -> Result<Self, HashError> {
        let params = Params::new(
            config.argon2_memory_cost_kib,
            config.argon2_time_cost,
            config.argon2_parallelism,
            None,
        )
        .map_err(|e| HashError::Params(e.to_string()))?;

        Ok(Self { params })
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }
}

#[async_trait]
impl Hasher for Argon2Hasher {
    async fn hash(&self, password: &str) -> Result<String, HashError> {
        let argon2 = self.argon2();
        let password = password.to_string();

        task::spawn_blocking(move || {
            use argon2::password_hash::PasswordHasher as _;

            let salt = SaltString::generate(&mut OsRng);
            argon2
                .hash_password(password.as_bytes(), &salt)
                .map(|hash| hash.to_string())
                .map_err(|e| HashError::Failed(e.to_string()))
        })
        .await?
    }

    async fn compare(&self, digest: &str, password: &str) -> Result<(), HashError> {
        let argon2 = self.argon2();
        let digest = digest.to_string();
        let password = password.to_string();

        task::spawn_blocking(move || {
            // Parameters embedded in the digest win over ours.
            let parsed =
                PasswordHash::new(&digest).map_err(|e| HashError::Digest(e.to_string()))?;

            match argon2.verify_password(password.as_bytes(), &parsed) {
                Ok(()) => Ok(()),
                Err(password_hash::Error::Password) => Err(HashError::Mismatch),
                Err(e) => Err(HashError::Failed(e.to_string())),
            }
        })
        .await?
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cheap_hasher() -> Argon2Hasher {
        Argon2Hasher::new(&SecurityConfig {
            argon2_memory_cost_kib: 1024,
            argon2_time_cost: 1,
            argon2_parallelism: 1,
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_hash_then_compare() {
        let hasher = cheap_hasher();
        let digest = hasher.hash("Secr3t!pass").await.unwrap();

        assert!(digest.starts_with("$argon2id$"));
        assert!(hasher.compare(&digest, "Secr3t!pass").await.is_ok());
    }

    #[tokio::test]
    async fn test_wrong_password_is_mismatch() {
        let hasher = cheap_hasher();
        let digest = hasher.hash("Secr3t!pass").await.unwrap();

        let err = hasher.compare(&digest, "other").await.unwrap_err();
        assert!(matches!(err, HashError::Mismatch));
    }

    #[tokio::test]
    async fn test_garbage_digest_is_not_a_mismatch() {
        let hasher = cheap_hasher();
        let err = hasher.compare("not-a-digest", "pw").await.unwrap_err();
        assert!(matches!(err, HashError::Digest(_)));
    }

    #[test]
    fn test_rejects_bad_params() {
        let err = Argon2Hasher::new(&SecurityConfig {
            argon2_memory_cost_kib: 1,
            argon2_time_cost: 0,
            argon2_parallelism: 1,
        })
        .unwrap_err();
        assert!(matches!(err, HashError::Params(_)));
    }
}
