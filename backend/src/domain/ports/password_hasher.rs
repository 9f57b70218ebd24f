//! Port for one-way password hashing.

use async_trait::async_trait;

use super::define_port_error;
use crate::domain::{Error, PasswordHash};

define_port_error! {
    /// Errors raised by password hashing adapters.
    pub enum PasswordHashError {
        /// Hashing failed.
        Hash { message: String } => "password hashing failed: {message}",
        /// The stored hash could not be parsed.
        MalformedHash { message: String } => "stored password hash is malformed: {message}",
    }
}

impl From<PasswordHashError> for Error {
    fn from(value: PasswordHashError) -> Self {
        Self::internal(value.to_string())
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PasswordHasher: Send + Sync {
    /// Hash `plaintext` into a self-describing encoded string.
    async fn hash_password(&self, plaintext: &str) -> Result<PasswordHash, PasswordHashError>;

    /// Check `plaintext` against a previously produced hash.
    async fn verify_password(
        &self,
        hash: &PasswordHash,
        plaintext: &str,
    ) -> Result<bool, PasswordHashError>;
}

/// Deterministic hasher for tests and local fixtures. Not for production.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixturePasswordHasher;

impl FixturePasswordHasher {
    const PREFIX: &'static str = "fixture$";
}

#[async_trait]
impl PasswordHasher for FixturePasswordHasher {
    async fn hash_password(&self, plaintext: &str) -> Result<PasswordHash, PasswordHashError> {
        let reversed: String = plaintext.chars().rev().collect();
        PasswordHash::new(format!("{}{reversed}", Self::PREFIX))
            .map_err(|err| PasswordHashError::hash(err.to_string()))
    }

    async fn verify_password(
        &self,
        hash: &PasswordHash,
        plaintext: &str,
    ) -> Result<bool, PasswordHashError> {
        let encoded = hash
            .as_str()
            .strip_prefix(Self::PREFIX)
            .ok_or_else(|| PasswordHashError::malformed_hash("missing fixture prefix"))?;
        Ok(encoded.chars().rev().eq(plaintext.chars()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[tokio::test]
    async fn fixture_hash_differs_from_plaintext() {
        let hash = FixturePasswordHasher
            .hash_password("secret")
            .await
            .expect("hash succeeds");
        assert_ne!(hash.as_str(), "secret");
    }

    #[rstest]
    #[case("secret", true)]
    #[case("Secret", false)]
    #[case("", false)]
    #[tokio::test]
    async fn fixture_verifies_only_the_original(#[case] attempt: &str, #[case] expected: bool) {
        let hasher = FixturePasswordHasher;
        let hash = hasher.hash_password("secret").await.expect("hash succeeds");
        let verified = hasher
            .verify_password(&hash, attempt)
            .await
            .expect("verify succeeds");
        assert_eq!(verified, expected);
    }

    #[rstest]
    #[tokio::test]
    async fn fixture_rejects_foreign_hashes() {
        let foreign = PasswordHash::new("$argon2id$v=19$...").expect("non-empty");
        let result = FixturePasswordHasher.verify_password(&foreign, "secret").await;
        assert!(matches!(result, Err(PasswordHashError::MalformedHash { .. })));
    }
}
