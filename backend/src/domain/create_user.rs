//! User registration.
//!
//! [`CreateUserValidator`] runs before any transaction opens.
//! [`CreateUserUseCase`] is the inner mutation that the pipeline wraps in a
//! unit of work; it delegates to [`CreateUserService`], which hashes the
//! password and stores the new user.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::ports::{CheapValidator, MutationUseCase, PasswordHasher, UserRepository};
use super::user::is_blank;
use super::validation::field_error;
use super::{
    Email, Error, MembershipTier, NewUser, User, UserId, UserValidationError, Username,
};

/// Registration payload.
#[derive(Clone, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    #[schema(example = "alice")]
    pub username: String,
    #[schema(example = "alice@example.com")]
    pub email: String,
    #[schema(example = "correct horse battery staple")]
    pub password: String,
    /// Defaults to `Basic` when omitted.
    #[serde(default)]
    pub membership_tier: Option<MembershipTier>,
}

impl fmt::Debug for CreateUserRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CreateUserRequest")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .field("membership_tier", &self.membership_tier)
            .finish()
    }
}

/// The stored user, without credentials.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserResponse {
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub membership_tier: MembershipTier,
}

impl From<&User> for CreateUserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id(),
            username: user.username().as_str().to_owned(),
            email: user.email().as_str().to_owned(),
            membership_tier: user.membership_tier(),
        }
    }
}

/// Rejects blank usernames, emails and passwords.
#[derive(Debug, Default, Clone, Copy)]
pub struct CreateUserValidator;

impl CheapValidator<CreateUserRequest> for CreateUserValidator {
    fn validate_cheap(&self, request: &CreateUserRequest) -> Result<(), Error> {
        let violation = if is_blank(&request.username) {
            Some(UserValidationError::EmptyUsername)
        } else if is_blank(&request.email) {
            Some(UserValidationError::EmptyEmail)
        } else if is_blank(&request.password) {
            Some(UserValidationError::EmptyPassword)
        } else {
            None
        };
        violation.map_or(Ok(()), |violation| Err(field_error(violation)))
    }
}

/// Hashes the password and stores the user.
#[derive(Clone)]
pub struct CreateUserService {
    users: Arc<dyn UserRepository>,
    hasher: Arc<dyn PasswordHasher>,
}

impl CreateUserService {
    pub fn new(users: Arc<dyn UserRepository>, hasher: Arc<dyn PasswordHasher>) -> Self {
        Self { users, hasher }
    }

    /// Store a new user. Must run inside a unit of work.
    pub async fn create_user(&self, request: CreateUserRequest) -> Result<User, Error> {
        let username = Username::new(request.username).map_err(field_error)?;
        let email = Email::new(request.email).map_err(field_error)?;
        let password_hash = self.hasher.hash_password(&request.password).await?;

        let user = self
            .users
            .create(NewUser {
                username,
                email,
                password_hash,
                membership_tier: request.membership_tier.unwrap_or_default(),
            })
            .await?;
        tracing::info!(user_id = %user.id(), "user created");
        Ok(user)
    }
}

/// Inner mutation for user registration.
#[derive(Clone)]
pub struct CreateUserUseCase {
    service: CreateUserService,
}

impl CreateUserUseCase {
    pub fn new(service: CreateUserService) -> Self {
        Self { service }
    }
}

#[async_trait]
impl MutationUseCase<CreateUserRequest, CreateUserResponse> for CreateUserUseCase {
    async fn execute(&self, request: CreateUserRequest) -> Result<CreateUserResponse, Error> {
        let user = self.service.create_user(request).await?;
        Ok(CreateUserResponse::from(&user))
    }
}

#[cfg(test)]
#[path = "create_user_tests.rs"]
mod tests;
