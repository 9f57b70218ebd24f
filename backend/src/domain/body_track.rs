//! Body measurements recorded by users over time.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::entity::{Entity, Reference, define_entity_id};
use super::user::{User, UserId};

define_entity_id! {
    /// Body measurement identifier.
    BodyTrackId
}

/// Validation failures for body measurements.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BodyTrackValidationError {
    #[error("weight must be a non-negative number")]
    InvalidWeight,
    #[error("height must be a non-negative number")]
    InvalidHeight,
}

/// Check that `weight` and `height` are finite and not negative.
///
/// Zero is accepted for both.
pub fn validate_measurements(weight: f64, height: f64) -> Result<(), BodyTrackValidationError> {
    let acceptable = |value: f64| value.is_finite() && value >= 0.0;
    if !acceptable(weight) {
        return Err(BodyTrackValidationError::InvalidWeight);
    }
    if !acceptable(height) {
        return Err(BodyTrackValidationError::InvalidHeight);
    }
    Ok(())
}

/// A measurement before it is stored.
#[derive(Debug, Clone, PartialEq)]
pub struct NewBodyTrack {
    pub user_id: UserId,
    pub date: NaiveDate,
    pub weight: f64,
    pub height: f64,
}

/// Weight in kilograms and height in centimetres on one day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BodyTrack {
    pub id: BodyTrackId,
    pub user_id: UserId,
    #[schema(example = "2025-01-01")]
    pub date: NaiveDate,
    #[schema(example = 71.1)]
    pub weight: f64,
    #[schema(example = 186.0)]
    pub height: f64,
}

impl Entity for BodyTrack {
    type Id = BodyTrackId;
    type Draft = NewBodyTrack;

    const KIND: &'static str = "body track";

    fn id(&self) -> BodyTrackId {
        self.id
    }

    fn from_draft(id: BodyTrackId, draft: NewBodyTrack) -> Self {
        Self {
            id,
            user_id: draft.user_id,
            date: draft.date,
            weight: draft.weight,
            height: draft.height,
        }
    }

    fn references(&self) -> Vec<Reference> {
        vec![Reference::to::<User>(self.user_id)]
    }
}
