//! Argon2id implementation of the `PasswordHasher` port.
//!
//! Hashes are PHC strings (`$argon2id$v=19$m=...,t=...,p=...$salt$hash`), so
//! parameters and salt travel with each stored value. Hashing is CPU bound
//! and runs on the blocking pool; plaintext copies are zeroed on drop.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{
    self, PasswordHash as PhcString, PasswordHasher as _, PasswordVerifier as _, SaltString,
};
use argon2::{Algorithm, Argon2, Params, Version};
use async_trait::async_trait;
use tokio::task;
use zeroize::Zeroizing;

use crate::domain::PasswordHash;
use crate::domain::ports::{PasswordHashError, PasswordHasher};

/// Argon2id hasher with configurable cost parameters.
#[derive(Debug, Clone)]
pub struct Argon2PasswordHasher {
    params: Params,
}

impl Default for Argon2PasswordHasher {
    fn default() -> Self {
        Self {
            params: Params::default(),
        }
    }
}

impl Argon2PasswordHasher {
    /// Use explicit cost parameters (memory in KiB, iterations, lanes).
    ///
    /// # Errors
    /// Returns [`PasswordHashError::Hash`] when argon2 rejects the values.
    pub fn with_params(
        memory_kib: u32,
        iterations: u32,
        parallelism: u32,
    ) -> Result<Self, PasswordHashError> {
        let params = Params::new(memory_kib, iterations, parallelism, None)
            .map_err(|err| PasswordHashError::hash(err.to_string()))?;
        Ok(Self { params })
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }
}

async fn run_blocking<T, F>(work: F) -> Result<T, PasswordHashError>
where
    F: FnOnce() -> Result<T, PasswordHashError> + Send + 'static,
    T: Send + 'static,
{
    task::spawn_blocking(work)
        .await
        .map_err(|err| PasswordHashError::hash(format!("hashing task failed: {err}")))?
}

#[async_trait]
impl PasswordHasher for Argon2PasswordHasher {
    async fn hash_password(&self, plaintext: &str) -> Result<PasswordHash, PasswordHashError> {
        let argon2 = self.argon2();
        let plaintext = Zeroizing::new(plaintext.to_owned());
        let encoded = run_blocking(move || {
            let salt = SaltString::generate(&mut OsRng);
            argon2
                .hash_password(plaintext.as_bytes(), &salt)
                .map(|hash| hash.to_string())
                .map_err(|err| PasswordHashError::hash(err.to_string()))
        })
        .await?;
        PasswordHash::new(encoded).map_err(|err| PasswordHashError::hash(err.to_string()))
    }

    async fn verify_password(
        &self,
        hash: &PasswordHash,
        plaintext: &str,
    ) -> Result<bool, PasswordHashError> {
        let argon2 = self.argon2();
        let encoded = hash.as_str().to_owned();
        let plaintext = Zeroizing::new(plaintext.to_owned());
        run_blocking(move || {
            let parsed = PhcString::new(&encoded)
                .map_err(|err| PasswordHashError::malformed_hash(err.to_string()))?;
            match argon2.verify_password(plaintext.as_bytes(), &parsed) {
                Ok(()) => Ok(true),
                Err(password_hash::Error::Password) => Ok(false),
                Err(err) => Err(PasswordHashError::hash(err.to_string())),
            }
        })
        .await
    }
}
