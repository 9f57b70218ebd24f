//! Recording and listing a user's body measurements.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;

use super::body_track::validate_measurements;
use super::ports::{
    BodyTrackRepository, CheapValidator, MutationUseCase, QueryUseCase, UserRepository,
};
use super::validation::field_error;
use super::{BodyTrack, Error, NewBodyTrack, UserId};

fn user_not_found(id: UserId) -> Error {
    Error::not_found(format!("user {id} does not exist"))
}

/// One measurement for an existing user.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RecordBodyTrackRequest {
    pub user_id: UserId,
    pub date: NaiveDate,
    pub weight: f64,
    pub height: f64,
}

#[derive(Debug, Default, Clone, Copy)]
pub struct RecordBodyTrackValidator;

impl CheapValidator<RecordBodyTrackRequest> for RecordBodyTrackValidator {
    fn validate_cheap(&self, request: &RecordBodyTrackRequest) -> Result<(), Error> {
        validate_measurements(request.weight, request.height).map_err(field_error)
    }
}

#[derive(Clone)]
pub struct RecordBodyTrack {
    users: Arc<dyn UserRepository>,
    body_tracks: Arc<dyn BodyTrackRepository>,
}

impl RecordBodyTrack {
    pub fn new(users: Arc<dyn UserRepository>, body_tracks: Arc<dyn BodyTrackRepository>) -> Self {
        Self { users, body_tracks }
    }
}

#[async_trait]
impl MutationUseCase<RecordBodyTrackRequest, BodyTrack> for RecordBodyTrack {
    async fn execute(&self, request: RecordBodyTrackRequest) -> Result<BodyTrack, Error> {
        if self.users.get_one_by_id(request.user_id).await?.is_none() {
            return Err(user_not_found(request.user_id));
        }
        let track = self
            .body_tracks
            .create(NewBodyTrack {
                user_id: request.user_id,
                date: request.date,
                weight: request.weight,
                height: request.height,
            })
            .await?;
        tracing::debug!(user_id = %track.user_id, body_track_id = %track.id, "body track recorded");
        Ok(track)
    }
}

/// Measurements of one user, oldest first.
#[derive(Clone)]
pub struct ListBodyTracks {
    users: Arc<dyn UserRepository>,
    body_tracks: Arc<dyn BodyTrackRepository>,
}

impl ListBodyTracks {
    pub fn new(users: Arc<dyn UserRepository>, body_tracks: Arc<dyn BodyTrackRepository>) -> Self {
        Self { users, body_tracks }
    }
}

#[async_trait]
impl QueryUseCase<UserId, Vec<BodyTrack>> for ListBodyTracks {
    async fn execute(&self, user_id: UserId) -> Result<Vec<BodyTrack>, Error> {
        if self.users.get_one_by_id(user_id).await?.is_none() {
            return Err(user_not_found(user_id));
        }
        Ok(self.body_tracks.list_for_user(user_id).await?)
    }
}
