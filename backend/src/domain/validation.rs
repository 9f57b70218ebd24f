//! Field-level validation failures rendered as `invalid_request` errors.
//!
//! Every rejected field produces the same `details` shape so clients can
//! key on `details.code` without parsing messages:
//!
//! ```json
//! { "field": "username", "code": "empty_username" }
//! ```

use std::fmt::Display;

use serde_json::json;

use super::{BodyTrackValidationError, Error, UserValidationError, WorkoutValidationError};

/// A validation failure attributable to one request field.
pub(crate) trait FieldViolation: Display {
    /// Request field name as it appears on the wire.
    fn field(&self) -> &'static str;
    /// Stable machine-readable failure code.
    fn code(&self) -> &'static str;
}

impl FieldViolation for UserValidationError {
    fn field(&self) -> &'static str {
        match self {
            Self::EmptyUsername => "username",
            Self::EmptyEmail => "email",
            Self::EmptyPassword => "password",
        }
    }

    fn code(&self) -> &'static str {
        match self {
            Self::EmptyUsername => "empty_username",
            Self::EmptyEmail => "empty_email",
            Self::EmptyPassword => "empty_password",
        }
    }
}

impl FieldViolation for WorkoutValidationError {
    fn field(&self) -> &'static str {
        match self {
            Self::EmptyExerciseName | Self::EmptyPlanName => "name",
            Self::TooManyMuscles { .. } | Self::DuplicateMuscle(_) => "targetMuscles",
            Self::NonPositiveReps => "reps",
            Self::NegativeWeight => "weight",
            Self::NegativeRestTime => "restTime",
        }
    }

    fn code(&self) -> &'static str {
        match self {
            Self::EmptyExerciseName | Self::EmptyPlanName => "empty_name",
            Self::TooManyMuscles { .. } => "too_many_muscles",
            Self::DuplicateMuscle(_) => "duplicate_muscle",
            Self::NonPositiveReps => "non_positive_reps",
            Self::NegativeWeight => "negative_weight",
            Self::NegativeRestTime => "negative_rest_time",
        }
    }
}

impl FieldViolation for BodyTrackValidationError {
    fn field(&self) -> &'static str {
        match self {
            Self::InvalidWeight => "weight",
            Self::InvalidHeight => "height",
        }
    }

    fn code(&self) -> &'static str {
        match self {
            Self::InvalidWeight => "invalid_weight",
            Self::InvalidHeight => "invalid_height",
        }
    }
}

/// Convert a field violation into an `invalid_request` error with details.
pub(crate) fn field_error(violation: impl FieldViolation) -> Error {
    Error::invalid_request(violation.to_string()).with_details(json!({
        "field": violation.field(),
        "code": violation.code(),
    }))
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use serde_json::json;

    use super::*;
    use crate::domain::{ErrorCode, Muscle};

    #[rstest]
    #[case(UserValidationError::EmptyUsername, "username", "empty_username")]
    #[case(UserValidationError::EmptyEmail, "email", "empty_email")]
    #[case(UserValidationError::EmptyPassword, "password", "empty_password")]
    fn user_violations_name_their_field(
        #[case] violation: UserValidationError,
        #[case] field: &str,
        #[case] code: &str,
    ) {
        let error = field_error(violation);

        assert_eq!(error.code(), ErrorCode::InvalidRequest);
        assert_eq!(error.details(), Some(&json!({ "field": field, "code": code })));
    }

    #[rstest]
    fn workout_violations_keep_their_message() {
        let error = field_error(WorkoutValidationError::DuplicateMuscle(Muscle::Chest));

        assert_eq!(error.message(), "muscle Chest is listed more than once");
        assert_eq!(
            error.details(),
            Some(&json!({ "field": "targetMuscles", "code": "duplicate_muscle" }))
        );
    }
}
