//! User listing.

use std::sync::Arc;

use async_trait::async_trait;

use super::ports::{QueryUseCase, UserRepository};
use super::{Error, UserSummary};

/// Request for every user. Carries no filters.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct GetUsersRequest;

/// Reads user summaries straight from the projection.
#[derive(Clone)]
pub struct GetUsersService {
    users: Arc<dyn UserRepository>,
}

impl GetUsersService {
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        Self { users }
    }

    /// Every user in insertion order.
    pub async fn list_users(&self) -> Result<Vec<UserSummary>, Error> {
        Ok(self.users.get_all_projected().await?)
    }
}

#[derive(Clone)]
pub struct GetUsersUseCase {
    service: GetUsersService,
}

impl GetUsersUseCase {
    pub fn new(service: GetUsersService) -> Self {
        Self { service }
    }
}

#[async_trait]
impl QueryUseCase<GetUsersRequest, Vec<UserSummary>> for GetUsersUseCase {
    async fn execute(&self, _request: GetUsersRequest) -> Result<Vec<UserSummary>, Error> {
        self.service.list_users().await
    }
}
