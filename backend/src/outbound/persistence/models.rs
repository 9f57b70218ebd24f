//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain. Rows convert into entities through
//! `TryFrom`, re-running domain validation so a corrupted row surfaces as a
//! [`RepositoryError::Invariant`] instead of an invalid entity.

use chrono::NaiveDate;
use diesel::prelude::*;

use crate::domain::ports::RepositoryError;
use crate::domain::{
    BodyTrack, Email, EntityId, Exercise, ExerciseSet, MembershipTier, Muscle, NewBodyTrack,
    NewExercise, NewExerciseSet, NewUser, NewWorkoutPlan, NewWorkoutSession, PasswordHash, PlanId,
    TargetMuscles, User, UserId, UserSummary, Username, WorkoutPlan, WorkoutSession,
    validate_measurements,
};

use super::schema::{body_tracks, exercise_sets, exercises, users, workout_plans, workout_sessions};

fn corrupt(table: &str, id: i32, detail: impl std::fmt::Display) -> RepositoryError {
    RepositoryError::invariant(format!("{table} row {id} is invalid: {detail}"))
}

fn parse_tier(table: &str, id: i32, raw: &str) -> Result<MembershipTier, RepositoryError> {
    raw.parse().map_err(|err| corrupt(table, id, err))
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: i32,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub membership_tier: String,
}

#[derive(Debug, Clone, Insertable, AsChangeset)]
#[diesel(table_name = users)]
pub(crate) struct UserValues<'a> {
    pub username: &'a str,
    pub email: &'a str,
    pub password_hash: &'a str,
    pub membership_tier: &'static str,
}

/// Projection row for [`UserSummary`]; never selects the password hash.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserSummaryRow {
    pub id: i32,
    pub username: String,
    pub email: String,
    pub membership_tier: String,
}

impl TryFrom<UserRow> for User {
    type Error = RepositoryError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let id = row.id;
        let draft = NewUser {
            username: Username::new(row.username).map_err(|err| corrupt("users", id, err))?,
            email: Email::new(row.email).map_err(|err| corrupt("users", id, err))?,
            password_hash: PasswordHash::new(row.password_hash)
                .map_err(|err| corrupt("users", id, err))?,
            membership_tier: parse_tier("users", id, &row.membership_tier)?,
        };
        Ok(Self::new(UserId::from_raw(id), draft))
    }
}

impl TryFrom<UserSummaryRow> for UserSummary {
    type Error = RepositoryError;

    fn try_from(row: UserSummaryRow) -> Result<Self, Self::Error> {
        Ok(Self {
            membership_tier: parse_tier("users", row.id, &row.membership_tier)?,
            id: UserId::from_raw(row.id),
            username: row.username,
            email: row.email,
        })
    }
}

impl<'a> From<&'a NewUser> for UserValues<'a> {
    fn from(draft: &'a NewUser) -> Self {
        Self {
            username: draft.username.as_str(),
            email: draft.email.as_str(),
            password_hash: draft.password_hash.as_str(),
            membership_tier: draft.membership_tier.as_str(),
        }
    }
}

impl<'a> From<&'a User> for UserValues<'a> {
    fn from(user: &'a User) -> Self {
        Self {
            username: user.username().as_str(),
            email: user.email().as_str(),
            password_hash: user.password_hash().as_str(),
            membership_tier: user.membership_tier().as_str(),
        }
    }
}

// ---------------------------------------------------------------------------
// Exercises
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = exercises)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ExerciseRow {
    pub id: i32,
    pub name: String,
    pub image_url: Option<String>,
    pub target_muscle_1: Option<String>,
    pub target_muscle_2: Option<String>,
    pub target_muscle_3: Option<String>,
}

#[derive(Debug, Clone, Insertable, AsChangeset)]
#[diesel(table_name = exercises)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct ExerciseValues<'a> {
    pub name: &'a str,
    pub image_url: Option<&'a str>,
    pub target_muscle_1: Option<&'static str>,
    pub target_muscle_2: Option<&'static str>,
    pub target_muscle_3: Option<&'static str>,
}

impl<'a> ExerciseValues<'a> {
    fn new(name: &'a str, image_url: Option<&'a str>, muscles: &TargetMuscles) -> Self {
        let slot = |index| muscles.slot(index).map(Muscle::as_str);
        Self {
            name,
            image_url,
            target_muscle_1: slot(0),
            target_muscle_2: slot(1),
            target_muscle_3: slot(2),
        }
    }
}

impl TryFrom<ExerciseRow> for Exercise {
    type Error = RepositoryError;

    fn try_from(row: ExerciseRow) -> Result<Self, Self::Error> {
        let id = row.id;
        let muscles = [row.target_muscle_1, row.target_muscle_2, row.target_muscle_3]
            .into_iter()
            .flatten()
            .map(|raw| raw.parse::<Muscle>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|err| corrupt("exercises", id, err))?;
        Ok(Self {
            id: EntityId::from_raw(id),
            name: row.name,
            image_url: row.image_url,
            target_muscles: TargetMuscles::new(muscles)
                .map_err(|err| corrupt("exercises", id, err))?,
        })
    }
}

impl<'a> From<&'a NewExercise> for ExerciseValues<'a> {
    fn from(draft: &'a NewExercise) -> Self {
        ExerciseValues::new(&draft.name, draft.image_url.as_deref(), &draft.target_muscles)
    }
}

impl<'a> From<&'a Exercise> for ExerciseValues<'a> {
    fn from(exercise: &'a Exercise) -> Self {
        ExerciseValues::new(
            &exercise.name,
            exercise.image_url.as_deref(),
            &exercise.target_muscles,
        )
    }
}

// ---------------------------------------------------------------------------
// Workout plans
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = workout_plans)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct WorkoutPlanRow {
    pub id: i32,
    pub user_id: i32,
    pub name: String,
    pub membership_tier: String,
}

#[derive(Debug, Clone, Insertable, AsChangeset)]
#[diesel(table_name = workout_plans)]
pub(crate) struct WorkoutPlanValues<'a> {
    pub user_id: i32,
    pub name: &'a str,
    pub membership_tier: &'static str,
}

impl TryFrom<WorkoutPlanRow> for WorkoutPlan {
    type Error = RepositoryError;

    fn try_from(row: WorkoutPlanRow) -> Result<Self, Self::Error> {
        Ok(Self {
            membership_tier: parse_tier("workout_plans", row.id, &row.membership_tier)?,
            id: PlanId::from_raw(row.id),
            user_id: UserId::from_raw(row.user_id),
            name: row.name,
        })
    }
}

impl<'a> From<&'a NewWorkoutPlan> for WorkoutPlanValues<'a> {
    fn from(draft: &'a NewWorkoutPlan) -> Self {
        Self {
            user_id: draft.user_id.get(),
            name: &draft.name,
            membership_tier: draft.membership_tier.as_str(),
        }
    }
}

impl<'a> From<&'a WorkoutPlan> for WorkoutPlanValues<'a> {
    fn from(plan: &'a WorkoutPlan) -> Self {
        Self {
            user_id: plan.user_id.get(),
            name: &plan.name,
            membership_tier: plan.membership_tier.as_str(),
        }
    }
}

// ---------------------------------------------------------------------------
// Workout sessions
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = workout_sessions)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct WorkoutSessionRow {
    pub id: i32,
    pub session_date: NaiveDate,
    pub plan_id: Option<i32>,
}

#[derive(Debug, Clone, Insertable, AsChangeset)]
#[diesel(table_name = workout_sessions)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct WorkoutSessionValues {
    pub session_date: NaiveDate,
    pub plan_id: Option<i32>,
}

impl TryFrom<WorkoutSessionRow> for WorkoutSession {
    type Error = RepositoryError;

    fn try_from(row: WorkoutSessionRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: EntityId::from_raw(row.id),
            date: row.session_date,
            plan_id: row.plan_id.map(PlanId::from_raw),
        })
    }
}

impl From<&NewWorkoutSession> for WorkoutSessionValues {
    fn from(draft: &NewWorkoutSession) -> Self {
        Self {
            session_date: draft.date,
            plan_id: draft.plan_id.map(EntityId::get),
        }
    }
}

impl From<&WorkoutSession> for WorkoutSessionValues {
    fn from(session: &WorkoutSession) -> Self {
        Self {
            session_date: session.date,
            plan_id: session.plan_id.map(EntityId::get),
        }
    }
}

// ---------------------------------------------------------------------------
// Exercise sets
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = exercise_sets)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ExerciseSetRow {
    pub id: i32,
    pub session_id: i32,
    pub exercise_id: i32,
    pub weight: i32,
    pub reps: i32,
    pub rest_time: i32,
}

#[derive(Debug, Clone, Insertable, AsChangeset)]
#[diesel(table_name = exercise_sets)]
pub(crate) struct ExerciseSetValues {
    pub session_id: i32,
    pub exercise_id: i32,
    pub weight: i32,
    pub reps: i32,
    pub rest_time: i32,
}

impl TryFrom<ExerciseSetRow> for ExerciseSet {
    type Error = RepositoryError;

    fn try_from(row: ExerciseSetRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: EntityId::from_raw(row.id),
            session_id: EntityId::from_raw(row.session_id),
            exercise_id: EntityId::from_raw(row.exercise_id),
            weight: row.weight,
            reps: row.reps,
            rest_time: row.rest_time,
        })
    }
}

impl From<&NewExerciseSet> for ExerciseSetValues {
    fn from(draft: &NewExerciseSet) -> Self {
        Self {
            session_id: draft.session_id.get(),
            exercise_id: draft.exercise_id.get(),
            weight: draft.weight,
            reps: draft.reps,
            rest_time: draft.rest_time,
        }
    }
}

impl From<&ExerciseSet> for ExerciseSetValues {
    fn from(set: &ExerciseSet) -> Self {
        Self {
            session_id: set.session_id.get(),
            exercise_id: set.exercise_id.get(),
            weight: set.weight,
            reps: set.reps,
            rest_time: set.rest_time,
        }
    }
}

// ---------------------------------------------------------------------------
// Body tracks
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = body_tracks)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct BodyTrackRow {
    pub id: i32,
    pub user_id: i32,
    pub track_date: NaiveDate,
    pub weight: f64,
    pub height: f64,
}

#[derive(Debug, Clone, Insertable, AsChangeset)]
#[diesel(table_name = body_tracks)]
pub(crate) struct BodyTrackValues {
    pub user_id: i32,
    pub track_date: NaiveDate,
    pub weight: f64,
    pub height: f64,
}

impl TryFrom<BodyTrackRow> for BodyTrack {
    type Error = RepositoryError;

    fn try_from(row: BodyTrackRow) -> Result<Self, Self::Error> {
        validate_measurements(row.weight, row.height)
            .map_err(|err| corrupt("body_tracks", row.id, err))?;
        Ok(Self {
            id: EntityId::from_raw(row.id),
            user_id: EntityId::from_raw(row.user_id),
            date: row.track_date,
            weight: row.weight,
            height: row.height,
        })
    }
}

impl From<&NewBodyTrack> for BodyTrackValues {
    fn from(draft: &NewBodyTrack) -> Self {
        Self {
            user_id: draft.user_id.get(),
            track_date: draft.date,
            weight: draft.weight,
            height: draft.height,
        }
    }
}

impl From<&BodyTrack> for BodyTrackValues {
    fn from(track: &BodyTrack) -> Self {
        Self {
            user_id: track.user_id.get(),
            track_date: track.date,
            weight: track.weight,
            height: track.height,
        }
    }
}
