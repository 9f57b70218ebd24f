//! Account management: lookup, membership changes, removal and login.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use utoipa::ToSchema;

use super::ports::{
    BodyTrackRepository, CheapValidator, MutationUseCase, PasswordHasher, QueryUseCase,
    UserRepository, WorkoutPlanRepository, WorkoutSessionRepository,
};
use super::user::is_blank;
use super::validation::field_error;
use super::{Error, MembershipTier, UserId, UserSummary, UserValidationError, Username};

fn user_not_found(id: UserId) -> Error {
    Error::not_found(format!("user {id} does not exist"))
}

/// Read one user's summary.
#[derive(Clone)]
pub struct GetUser {
    users: Arc<dyn UserRepository>,
}

impl GetUser {
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        Self { users }
    }
}

#[async_trait]
impl QueryUseCase<UserId, UserSummary> for GetUser {
    async fn execute(&self, id: UserId) -> Result<UserSummary, Error> {
        let user = self
            .users
            .get_one_by_id(id)
            .await?
            .ok_or_else(|| user_not_found(id))?;
        Ok(UserSummary::from(&user))
    }
}

/// New membership tier for an existing user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChangeMembershipTierRequest {
    pub user_id: UserId,
    pub membership_tier: MembershipTier,
}

/// Moves a user to another membership tier.
#[derive(Clone)]
pub struct ChangeMembershipTier {
    users: Arc<dyn UserRepository>,
}

impl ChangeMembershipTier {
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        Self { users }
    }
}

#[async_trait]
impl MutationUseCase<ChangeMembershipTierRequest, UserSummary> for ChangeMembershipTier {
    async fn execute(&self, request: ChangeMembershipTierRequest) -> Result<UserSummary, Error> {
        let user = self
            .users
            .get_one_by_id(request.user_id)
            .await?
            .ok_or_else(|| user_not_found(request.user_id))?
            .with_membership_tier(request.membership_tier);
        self.users.update(&user).await?;
        Ok(UserSummary::from(&user))
    }
}

/// Removes a user together with their workout plans and body measurements.
///
/// Sessions recorded against those plans are kept and detached from the
/// plan, so logged sets survive the account. Body measurements cannot exist
/// without an owner and are deleted.
#[derive(Clone)]
pub struct DeleteUser {
    users: Arc<dyn UserRepository>,
    plans: Arc<dyn WorkoutPlanRepository>,
    sessions: Arc<dyn WorkoutSessionRepository>,
    body_tracks: Arc<dyn BodyTrackRepository>,
}

impl DeleteUser {
    pub fn new(
        users: Arc<dyn UserRepository>,
        plans: Arc<dyn WorkoutPlanRepository>,
        sessions: Arc<dyn WorkoutSessionRepository>,
        body_tracks: Arc<dyn BodyTrackRepository>,
    ) -> Self {
        Self {
            users,
            plans,
            sessions,
            body_tracks,
        }
    }
}

#[async_trait]
impl MutationUseCase<UserId, ()> for DeleteUser {
    async fn execute(&self, id: UserId) -> Result<(), Error> {
        if self.users.get_one_by_id(id).await?.is_none() {
            return Err(user_not_found(id));
        }

        for plan in self.plans.list_for_user(id).await? {
            for session in self.sessions.list_for_plan(plan.id).await? {
                self.sessions.update(&session.detached()).await?;
            }
            self.plans.delete(plan.id).await?;
        }
        for track in self.body_tracks.list_for_user(id).await? {
            self.body_tracks.delete(track.id).await?;
        }

        self.users
            .delete(id)
            .await?
            .ok_or_else(|| user_not_found(id))?;
        tracing::info!(user_id = %id, "user deleted");
        Ok(())
    }
}

/// Credentials presented at login.
#[derive(Clone, PartialEq, Eq, Deserialize, ToSchema)]
pub struct LoginRequest {
    #[schema(example = "alice")]
    pub username: String,
    #[schema(example = "correct horse battery staple")]
    pub password: String,
}

impl fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginRequest")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Rejects blank credentials.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoginValidator;

impl CheapValidator<LoginRequest> for LoginValidator {
    fn validate_cheap(&self, request: &LoginRequest) -> Result<(), Error> {
        if is_blank(&request.username) {
            return Err(field_error(UserValidationError::EmptyUsername));
        }
        if is_blank(&request.password) {
            return Err(field_error(UserValidationError::EmptyPassword));
        }
        Ok(())
    }
}

/// Checks a username and password against the stored hash.
///
/// Unknown users and wrong passwords yield the same `unauthorized` error.
#[derive(Clone)]
pub struct AuthenticateUser {
    users: Arc<dyn UserRepository>,
    hasher: Arc<dyn PasswordHasher>,
}

impl AuthenticateUser {
    pub fn new(users: Arc<dyn UserRepository>, hasher: Arc<dyn PasswordHasher>) -> Self {
        Self { users, hasher }
    }
}

#[async_trait]
impl QueryUseCase<LoginRequest, UserSummary> for AuthenticateUser {
    async fn execute(&self, request: LoginRequest) -> Result<UserSummary, Error> {
        LoginValidator.validate_cheap(&request)?;
        let rejected = || Error::unauthorized("invalid credentials");

        let username = Username::new(request.username).map_err(field_error)?;
        let Some(user) = self.users.find_by_username(&username).await? else {
            tracing::debug!("login for unknown user");
            return Err(rejected());
        };
        if !self
            .hasher
            .verify_password(user.password_hash(), &request.password)
            .await?
        {
            tracing::debug!(user_id = %user.id(), "login with wrong password");
            return Err(rejected());
        }
        Ok(UserSummary::from(&user))
    }
}

#[cfg(test)]
#[path = "user_account_service_tests.rs"]
mod tests;
